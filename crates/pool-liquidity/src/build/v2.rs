//! Balancer V2 Vault `joinPool` / `exitPool` calls and the pool specific
//! `userData` they carry.

use {
    super::{AddLiquidityBuildParams, BuildError, RemoveLiquidityBuildParams, native, user_facing},
    crate::domain::{
        AddKind,
        AddLiquidityBoundedOutput,
        RemoveKind,
        RemoveLiquidityBoundedOutput,
        TokenAmount,
        pool::PoolFamily,
    },
    alloy::{
        primitives::{Address, Bytes, U256},
        sol_types::{SolCall, SolValue},
    },
    contracts::alloy::BalancerV2Vault,
};

/// Join kinds shared by every V2 pool family.
mod join {
    pub const INIT: u8 = 0;
    pub const EXACT_TOKENS_IN_FOR_BPT_OUT: u8 = 1;
    pub const TOKEN_IN_FOR_EXACT_BPT_OUT: u8 = 2;
    pub const ALL_TOKENS_IN_FOR_EXACT_BPT_OUT: u8 = 3;
}

/// Exit kinds of weighted, stable, liquidity bootstrapping and Gyro pools.
mod exit {
    pub const EXACT_BPT_IN_FOR_ONE_TOKEN_OUT: u8 = 0;
    pub const EXACT_BPT_IN_FOR_TOKENS_OUT: u8 = 1;
    pub const BPT_IN_FOR_EXACT_TOKENS_OUT: u8 = 2;
}

/// Exit kinds of composable stable pools.
mod composable_exit {
    pub const EXACT_BPT_IN_FOR_ONE_TOKEN_OUT: u8 = 0;
    pub const BPT_IN_FOR_EXACT_TOKENS_OUT: u8 = 1;
    pub const EXACT_BPT_IN_FOR_ALL_TOKENS_OUT: u8 = 2;
}

/// Exit kind accepted by every pool in recovery mode.
const RECOVERY_MODE_EXIT: u8 = 255;

fn kind(kind: u8) -> U256 {
    U256::from(kind)
}

fn raw(amounts: &[TokenAmount]) -> Vec<U256> {
    amounts.iter().map(|amount| amount.amount).collect()
}

fn assets(amounts: &[TokenAmount], substitute_native: bool, wrapped: Address) -> Vec<Address> {
    amounts
        .iter()
        .map(|amount| {
            if substitute_native {
                native::substitute_address(amount.token.address, wrapped)
            } else {
                amount.token.address
            }
        })
        .collect()
}

pub fn join_pool(
    bounded: &AddLiquidityBoundedOutput,
    params: &AddLiquidityBuildParams,
    wrapped: Address,
) -> Result<Bytes, BuildError> {
    let query = &bounded.query;
    let share = query.share_token_index;
    let user_data = match query.kind {
        // Composable pools take protocol facing init amounts; the share
        // token slot is ignored by the pool.
        AddKind::Init => (kind(join::INIT), raw(&bounded.max_amounts_in)).abi_encode_params(),
        AddKind::Unbalanced => (
            kind(join::EXACT_TOKENS_IN_FOR_BPT_OUT),
            user_facing(&raw(&bounded.max_amounts_in), share),
            bounded.min_bpt_out.amount,
        )
            .abi_encode_params(),
        AddKind::SingleToken => (
            kind(join::TOKEN_IN_FOR_EXACT_BPT_OUT),
            bounded.min_bpt_out.amount,
            U256::from(super::single_token_index(query.token_index)?),
        )
            .abi_encode_params(),
        AddKind::Proportional => (
            kind(join::ALL_TOKENS_IN_FOR_EXACT_BPT_OUT),
            bounded.min_bpt_out.amount,
        )
            .abi_encode_params(),
    };

    let mut max_amounts_in = raw(&bounded.max_amounts_in);
    if let (AddKind::Init, Some(share)) = (query.kind, share) {
        max_amounts_in[share] = U256::MAX;
    }

    let call = BalancerV2Vault::joinPoolCall {
        poolId: query.pool_id.0,
        sender: params.sender,
        recipient: params.recipient,
        request: BalancerV2Vault::JoinPoolRequest {
            assets: assets(&query.amounts_in, params.wrap_native, wrapped),
            maxAmountsIn: max_amounts_in,
            userData: user_data.into(),
            fromInternalBalance: params.from_internal_balance,
        },
    };
    Ok(call.abi_encode().into())
}

pub fn exit_pool(
    bounded: &RemoveLiquidityBoundedOutput,
    params: &RemoveLiquidityBuildParams,
    wrapped: Address,
) -> Result<Bytes, BuildError> {
    let query = &bounded.query;
    let share = query.share_token_index;
    let composable = query.pool_type.family() == PoolFamily::ComposableStable;
    let (one_token_out, exact_tokens_out, all_tokens_out) = if composable {
        (
            composable_exit::EXACT_BPT_IN_FOR_ONE_TOKEN_OUT,
            composable_exit::BPT_IN_FOR_EXACT_TOKENS_OUT,
            composable_exit::EXACT_BPT_IN_FOR_ALL_TOKENS_OUT,
        )
    } else {
        (
            exit::EXACT_BPT_IN_FOR_ONE_TOKEN_OUT,
            exit::BPT_IN_FOR_EXACT_TOKENS_OUT,
            exit::EXACT_BPT_IN_FOR_TOKENS_OUT,
        )
    };

    let user_data = match query.kind {
        RemoveKind::Unbalanced | RemoveKind::SingleTokenExactOut => (
            kind(exact_tokens_out),
            user_facing(&raw(&bounded.min_amounts_out), share),
            bounded.max_bpt_in.amount,
        )
            .abi_encode_params(),
        RemoveKind::SingleTokenExactIn => (
            kind(one_token_out),
            bounded.max_bpt_in.amount,
            U256::from(super::single_token_index(query.token_index)?),
        )
            .abi_encode_params(),
        RemoveKind::Proportional => {
            (kind(all_tokens_out), bounded.max_bpt_in.amount).abi_encode_params()
        }
        RemoveKind::Recovery => {
            (kind(RECOVERY_MODE_EXIT), bounded.max_bpt_in.amount).abi_encode_params()
        }
    };

    let call = BalancerV2Vault::exitPoolCall {
        poolId: query.pool_id.0,
        sender: params.sender,
        recipient: params.recipient,
        request: BalancerV2Vault::ExitPoolRequest {
            assets: assets(&query.amounts_out, params.receive_native, wrapped),
            minAmountsOut: raw(&bounded.min_amounts_out),
            userData: user_data.into(),
            toInternalBalance: params.to_internal_balance,
        },
    };
    Ok(call.abi_encode().into())
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::{
            PoolId,
            PoolType,
            ProtocolVersion,
            RemoveLiquidityQueryOutput,
            Token,
            AddLiquidityQueryOutput,
        },
        alloy::primitives::B256,
    };

    const POOL: Address = Address::repeat_byte(0xbb);
    const WETH: Address = Address::repeat_byte(0xee);

    fn amount(address: Address, amount: u64) -> TokenAmount {
        TokenAmount::new(
            Token {
                address,
                decimals: 18,
                chain_id: 1,
            },
            U256::from(amount),
        )
    }

    fn composable_add(kind: AddKind, token_index: Option<usize>) -> AddLiquidityBoundedOutput {
        let amounts = vec![amount(POOL, 0), amount(WETH, 10), amount(Address::repeat_byte(1), 20)];
        AddLiquidityBoundedOutput {
            query: AddLiquidityQueryOutput {
                pool_id: PoolId(B256::repeat_byte(0x42)),
                pool_address: POOL,
                pool_type: PoolType::ComposableStable,
                protocol_version: ProtocolVersion::V2,
                chain_id: 1,
                kind,
                amounts_in: amounts.clone(),
                bpt_out: amount(POOL, 100),
                token_index,
                share_token_index: Some(0),
            },
            max_amounts_in: amounts,
            min_bpt_out: amount(POOL, 99),
        }
    }

    fn weighted_remove(
        kind: RemoveKind,
        token_index: Option<usize>,
    ) -> RemoveLiquidityBoundedOutput {
        let amounts = vec![amount(WETH, 10), amount(Address::repeat_byte(1), 20)];
        RemoveLiquidityBoundedOutput {
            query: RemoveLiquidityQueryOutput {
                pool_id: PoolId(B256::repeat_byte(0x42)),
                pool_address: POOL,
                pool_type: PoolType::Weighted,
                protocol_version: ProtocolVersion::V2,
                chain_id: 1,
                kind,
                amounts_out: amounts.clone(),
                bpt_in: amount(POOL, 100),
                token_index,
                share_token_index: None,
            },
            min_amounts_out: amounts,
            max_bpt_in: amount(POOL, 101),
        }
    }

    fn decode_join(call: &Bytes) -> BalancerV2Vault::joinPoolCall {
        BalancerV2Vault::joinPoolCall::abi_decode(call).unwrap()
    }

    fn decode_exit(call: &Bytes) -> BalancerV2Vault::exitPoolCall {
        BalancerV2Vault::exitPoolCall::abi_decode(call).unwrap()
    }

    #[test]
    fn unbalanced_join_uses_user_facing_amounts() {
        let call = join_pool(
            &composable_add(AddKind::Unbalanced, None),
            &AddLiquidityBuildParams::default(),
            WETH,
        )
        .unwrap();
        let call = decode_join(&call);
        assert_eq!(call.poolId, B256::repeat_byte(0x42));
        assert_eq!(
            call.request.assets,
            vec![POOL, WETH, Address::repeat_byte(1)]
        );
        assert_eq!(
            call.request.maxAmountsIn,
            vec![U256::ZERO, U256::from(10), U256::from(20)]
        );
        let (kind, amounts, min_bpt) =
            <(U256, Vec<U256>, U256)>::abi_decode_params(&call.request.userData).unwrap();
        assert_eq!(kind, U256::from(1));
        assert_eq!(amounts, vec![U256::from(10), U256::from(20)]);
        assert_eq!(min_bpt, U256::from(99));
    }

    #[test]
    fn composable_init_allows_share_token() {
        let call = join_pool(
            &composable_add(AddKind::Init, None),
            &AddLiquidityBuildParams {
                wrap_native: true,
                ..Default::default()
            },
            WETH,
        )
        .unwrap();
        let call = decode_join(&call);
        assert_eq!(
            call.request.maxAmountsIn,
            vec![U256::MAX, U256::from(10), U256::from(20)]
        );
        assert_eq!(
            call.request.assets,
            vec![POOL, Address::ZERO, Address::repeat_byte(1)]
        );
        let (kind, amounts) =
            <(U256, Vec<U256>)>::abi_decode_params(&call.request.userData).unwrap();
        assert_eq!(kind, U256::ZERO);
        assert_eq!(amounts, vec![U256::ZERO, U256::from(10), U256::from(20)]);
    }

    #[test]
    fn single_token_join_encodes_user_facing_index() {
        let call = join_pool(
            &composable_add(AddKind::SingleToken, Some(1)),
            &AddLiquidityBuildParams::default(),
            WETH,
        )
        .unwrap();
        let (kind, bpt_out, index) =
            <(U256, U256, U256)>::abi_decode_params(&decode_join(&call).request.userData).unwrap();
        assert_eq!(kind, U256::from(2));
        assert_eq!(bpt_out, U256::from(99));
        assert_eq!(index, U256::from(1));
    }

    #[test]
    fn exit_kinds_depend_on_pool_family() {
        let params = RemoveLiquidityBuildParams::default();
        let user_data = |bounded: &RemoveLiquidityBoundedOutput| {
            decode_exit(&exit_pool(bounded, &params, WETH).unwrap())
                .request
                .userData
        };

        let proportional = weighted_remove(RemoveKind::Proportional, None);
        let (kind, bpt_in) =
            <(U256, U256)>::abi_decode_params(&user_data(&proportional)).unwrap();
        assert_eq!((kind, bpt_in), (U256::from(1), U256::from(101)));

        let composable = RemoveLiquidityBoundedOutput {
            query: RemoveLiquidityQueryOutput {
                pool_type: PoolType::ComposableStable,
                ..proportional.query.clone()
            },
            ..proportional.clone()
        };
        let (kind, _) = <(U256, U256)>::abi_decode_params(&user_data(&composable)).unwrap();
        assert_eq!(kind, U256::from(2));

        let exact_out = weighted_remove(RemoveKind::SingleTokenExactOut, Some(0));
        let (kind, amounts, max_bpt) =
            <(U256, Vec<U256>, U256)>::abi_decode_params(&user_data(&exact_out)).unwrap();
        assert_eq!(kind, U256::from(2));
        assert_eq!(amounts, vec![U256::from(10), U256::from(20)]);
        assert_eq!(max_bpt, U256::from(101));

        let recovery = weighted_remove(RemoveKind::Recovery, None);
        let (kind, _) = <(U256, U256)>::abi_decode_params(&user_data(&recovery)).unwrap();
        assert_eq!(kind, U256::from(255));
    }

    #[test]
    fn exit_to_native() {
        let call = exit_pool(
            &weighted_remove(RemoveKind::SingleTokenExactIn, Some(1)),
            &RemoveLiquidityBuildParams {
                sender: Address::repeat_byte(2),
                recipient: Address::repeat_byte(3),
                receive_native: true,
                to_internal_balance: false,
            },
            WETH,
        )
        .unwrap();
        let call = decode_exit(&call);
        assert_eq!(call.sender, Address::repeat_byte(2));
        assert_eq!(call.recipient, Address::repeat_byte(3));
        assert_eq!(
            call.request.assets,
            vec![Address::ZERO, Address::repeat_byte(1)]
        );
        let (kind, bpt_in, index) =
            <(U256, U256, U256)>::abi_decode_params(&call.request.userData).unwrap();
        assert_eq!(kind, U256::ZERO);
        assert_eq!(bpt_in, U256::from(101));
        assert_eq!(index, U256::from(1));
    }
}
