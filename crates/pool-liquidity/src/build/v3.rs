//! Balancer V3 Router calls. The Router wraps and unwraps the native asset
//! itself when `wethIsEth` is set, so token arrays keep the wrapped token.
//! The Router only knows the user facing tokens, so share token rows are
//! dropped from every array.

use {
    super::{AddLiquidityBuildParams, BuildError, RemoveLiquidityBuildParams, user_facing},
    crate::{
        domain::{
            AddKind,
            AddLiquidityBoundedOutput,
            RemoveKind,
            RemoveLiquidityBoundedOutput,
            TokenAmount,
        },
        index,
        validation,
    },
    alloy::{
        primitives::{Bytes, U256},
        sol_types::SolCall,
    },
    contracts::alloy::BalancerV3Router,
};

fn raw(amounts: &[TokenAmount], share_token_index: Option<usize>) -> Vec<U256> {
    user_facing(amounts, share_token_index)
        .iter()
        .map(|amount| amount.amount)
        .collect()
}

/// Protocol facing row of a single token operation.
fn single(
    amounts: &[TokenAmount],
    token_index: Option<usize>,
    share_token_index: Option<usize>,
) -> Result<&TokenAmount, BuildError> {
    let user_index = super::single_token_index(token_index)?;
    let row = index::to_protocol_index(user_index, share_token_index);
    amounts.get(row).ok_or(BuildError::UnsupportedOperationKind(
        "single token index outside of the pool tokens",
    ))
}

pub fn add_liquidity(
    bounded: &AddLiquidityBoundedOutput,
    params: &AddLiquidityBuildParams,
) -> Result<Bytes, BuildError> {
    let query = &bounded.query;
    let pool = query.pool_address;
    let share = query.share_token_index;
    let weth_is_eth = params.wrap_native;
    let call = match query.kind {
        AddKind::Init => BalancerV3Router::initializeCall {
            pool,
            tokens: user_facing(&query.amounts_in, share)
                .iter()
                .map(|amount| amount.token.address)
                .collect(),
            exactAmountsIn: raw(&bounded.max_amounts_in, share),
            minBptAmountOut: bounded.min_bpt_out.amount,
            wethIsEth: weth_is_eth,
            userData: Bytes::new(),
        }
        .abi_encode(),
        AddKind::Unbalanced => BalancerV3Router::addLiquidityUnbalancedCall {
            pool,
            exactAmountsIn: raw(&bounded.max_amounts_in, share),
            minBptAmountOut: bounded.min_bpt_out.amount,
            wethIsEth: weth_is_eth,
            userData: Bytes::new(),
        }
        .abi_encode(),
        AddKind::SingleToken => {
            let max_in = single(&bounded.max_amounts_in, query.token_index, share)?;
            BalancerV3Router::addLiquiditySingleTokenExactOutCall {
                pool,
                tokenIn: max_in.token.address,
                maxAmountIn: max_in.amount,
                exactBptAmountOut: bounded.min_bpt_out.amount,
                wethIsEth: weth_is_eth,
                userData: Bytes::new(),
            }
            .abi_encode()
        }
        AddKind::Proportional => BalancerV3Router::addLiquidityProportionalCall {
            pool,
            maxAmountsIn: raw(&bounded.max_amounts_in, share),
            exactBptAmountOut: bounded.min_bpt_out.amount,
            wethIsEth: weth_is_eth,
            userData: Bytes::new(),
        }
        .abi_encode(),
    };
    Ok(call.into())
}

pub fn remove_liquidity(
    bounded: &RemoveLiquidityBoundedOutput,
    params: &RemoveLiquidityBuildParams,
) -> Result<Bytes, BuildError> {
    let query = &bounded.query;
    let pool = query.pool_address;
    let share = query.share_token_index;
    let weth_is_eth = params.receive_native;
    let call = match query.kind {
        RemoveKind::Unbalanced => {
            return Err(BuildError::UnsupportedOperationKind(
                validation::V3_UNBALANCED_REMOVE_UNSUPPORTED,
            ));
        }
        RemoveKind::Proportional => BalancerV3Router::removeLiquidityProportionalCall {
            pool,
            exactBptAmountIn: bounded.max_bpt_in.amount,
            minAmountsOut: raw(&bounded.min_amounts_out, share),
            wethIsEth: weth_is_eth,
            userData: Bytes::new(),
        }
        .abi_encode(),
        RemoveKind::SingleTokenExactIn => {
            let min_out = single(&bounded.min_amounts_out, query.token_index, share)?;
            BalancerV3Router::removeLiquiditySingleTokenExactInCall {
                pool,
                exactBptAmountIn: bounded.max_bpt_in.amount,
                tokenOut: min_out.token.address,
                minAmountOut: min_out.amount,
                wethIsEth: weth_is_eth,
                userData: Bytes::new(),
            }
            .abi_encode()
        }
        RemoveKind::SingleTokenExactOut => {
            let exact_out = single(&bounded.min_amounts_out, query.token_index, share)?;
            BalancerV3Router::removeLiquiditySingleTokenExactOutCall {
                pool,
                maxBptAmountIn: bounded.max_bpt_in.amount,
                tokenOut: exact_out.token.address,
                exactAmountOut: exact_out.amount,
                wethIsEth: weth_is_eth,
                userData: Bytes::new(),
            }
            .abi_encode()
        }
        RemoveKind::Recovery => BalancerV3Router::removeLiquidityRecoveryCall {
            pool,
            exactBptAmountIn: bounded.max_bpt_in.amount,
            minAmountsOut: raw(&bounded.min_amounts_out, share),
        }
        .abi_encode(),
    };
    Ok(call.into())
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::{
            AddLiquidityQueryOutput,
            PoolId,
            PoolType,
            ProtocolVersion,
            RemoveLiquidityQueryOutput,
            Token,
        },
        alloy::primitives::Address,
    };

    const POOL: Address = Address::repeat_byte(0xbb);

    fn amount(byte: u8, amount: u64) -> TokenAmount {
        TokenAmount::new(
            Token {
                address: Address::repeat_byte(byte),
                decimals: 18,
                chain_id: 1,
            },
            U256::from(amount),
        )
    }

    fn add(kind: AddKind, token_index: Option<usize>) -> AddLiquidityBoundedOutput {
        AddLiquidityBoundedOutput {
            query: AddLiquidityQueryOutput {
                pool_id: PoolId::from_address(POOL),
                pool_address: POOL,
                pool_type: PoolType::Weighted,
                protocol_version: ProtocolVersion::V3,
                chain_id: 1,
                kind,
                amounts_in: vec![amount(1, 10), amount(2, 0)],
                bpt_out: amount(0xbb, 100),
                token_index,
                share_token_index: None,
            },
            max_amounts_in: vec![amount(1, 11), amount(2, 0)],
            min_bpt_out: amount(0xbb, 100),
        }
    }

    fn remove(kind: RemoveKind, token_index: Option<usize>) -> RemoveLiquidityBoundedOutput {
        RemoveLiquidityBoundedOutput {
            query: RemoveLiquidityQueryOutput {
                pool_id: PoolId::from_address(POOL),
                pool_address: POOL,
                pool_type: PoolType::Stable,
                protocol_version: ProtocolVersion::V3,
                chain_id: 1,
                kind,
                amounts_out: vec![amount(1, 0), amount(2, 20)],
                bpt_in: amount(0xbb, 100),
                token_index,
                share_token_index: None,
            },
            min_amounts_out: vec![amount(1, 0), amount(2, 19)],
            max_bpt_in: amount(0xbb, 100),
        }
    }

    #[test]
    fn single_token_add() {
        let call = add_liquidity(
            &add(AddKind::SingleToken, Some(0)),
            &AddLiquidityBuildParams {
                wrap_native: true,
                ..Default::default()
            },
        )
        .unwrap();
        let call =
            BalancerV3Router::addLiquiditySingleTokenExactOutCall::abi_decode(&call).unwrap();
        assert_eq!(call.pool, POOL);
        assert_eq!(call.tokenIn, Address::repeat_byte(1));
        assert_eq!(call.maxAmountIn, U256::from(11));
        assert_eq!(call.exactBptAmountOut, U256::from(100));
        assert!(call.wethIsEth);
        assert!(call.userData.is_empty());
    }

    #[test]
    fn initialize_lists_tokens() {
        let call = add_liquidity(&add(AddKind::Init, None), &Default::default()).unwrap();
        let call = BalancerV3Router::initializeCall::abi_decode(&call).unwrap();
        assert_eq!(
            call.tokens,
            vec![Address::repeat_byte(1), Address::repeat_byte(2)]
        );
        assert_eq!(call.exactAmountsIn, vec![U256::from(11), U256::ZERO]);
        assert!(!call.wethIsEth);
    }

    #[test]
    fn removes() {
        let params = RemoveLiquidityBuildParams::default();

        let call = remove_liquidity(&remove(RemoveKind::SingleTokenExactOut, Some(1)), &params)
            .unwrap();
        let call =
            BalancerV3Router::removeLiquiditySingleTokenExactOutCall::abi_decode(&call).unwrap();
        assert_eq!(call.tokenOut, Address::repeat_byte(2));
        assert_eq!(call.exactAmountOut, U256::from(19));
        assert_eq!(call.maxBptAmountIn, U256::from(100));

        let call = remove_liquidity(&remove(RemoveKind::Recovery, None), &params).unwrap();
        let call = BalancerV3Router::removeLiquidityRecoveryCall::abi_decode(&call).unwrap();
        assert_eq!(call.minAmountsOut, vec![U256::ZERO, U256::from(19)]);

        assert_eq!(
            remove_liquidity(&remove(RemoveKind::Unbalanced, None), &params),
            Err(BuildError::UnsupportedOperationKind(
                validation::V3_UNBALANCED_REMOVE_UNSUPPORTED
            ))
        );
        assert!(matches!(
            remove_liquidity(&remove(RemoveKind::SingleTokenExactIn, None), &params),
            Err(BuildError::UnsupportedOperationKind(_))
        ));
    }

    #[test]
    fn share_token_row_is_dropped() {
        let mut bounded = add(AddKind::SingleToken, Some(0));
        bounded.query.pool_type = PoolType::ComposableStable;
        bounded.query.share_token_index = Some(0);
        bounded.query.amounts_in = vec![amount(0xbb, 0), amount(1, 10), amount(2, 0)];
        bounded.max_amounts_in = vec![amount(0xbb, 0), amount(1, 11), amount(2, 0)];

        let call = add_liquidity(&bounded, &Default::default()).unwrap();
        let call =
            BalancerV3Router::addLiquiditySingleTokenExactOutCall::abi_decode(&call).unwrap();
        assert_eq!(call.tokenIn, Address::repeat_byte(1));
        assert_eq!(call.maxAmountIn, U256::from(11));

        bounded.query.kind = AddKind::Init;
        let call = add_liquidity(&bounded, &Default::default()).unwrap();
        let call = BalancerV3Router::initializeCall::abi_decode(&call).unwrap();
        assert_eq!(
            call.tokens,
            vec![Address::repeat_byte(1), Address::repeat_byte(2)]
        );
        assert_eq!(call.exactAmountsIn, vec![U256::from(11), U256::ZERO]);

        let mut bounded = remove(RemoveKind::Proportional, None);
        bounded.query.share_token_index = Some(1);
        bounded.min_amounts_out = vec![amount(1, 5), amount(0xbb, 0), amount(2, 19)];
        let call = remove_liquidity(&bounded, &Default::default()).unwrap();
        let call = BalancerV3Router::removeLiquidityProportionalCall::abi_decode(&call).unwrap();
        assert_eq!(call.minAmountsOut, vec![U256::from(5), U256::from(19)]);
    }
}
