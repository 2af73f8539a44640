//! Checks a requested operation against the pool before any math runs.
//! Validation is local, side effect free and idempotent.

use {
    crate::domain::{
        AddLiquidityInput,
        AddLiquidityKind,
        InputAmount,
        PoolState,
        ProtocolVersion,
        RemoveLiquidityInput,
        RemoveLiquidityKind,
    },
    alloy::primitives::Address,
    itertools::Itertools,
};

pub const GYRO_ADD_UNSUPPORTED: &str =
    "Gyro pools do not implement this join kind, only Proportional is supported";
pub const GYRO_REMOVE_UNSUPPORTED: &str =
    "Gyro pools do not implement this exit kind, only Proportional is supported";
pub const V3_UNBALANCED_REMOVE_UNSUPPORTED: &str =
    "Unbalanced remove liquidity is not supported on v3 pools";

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0}")]
    UnsupportedOperationKind(&'static str),
    #[error("pool {0} does not list its own share token")]
    MissingShareToken(Address),
    #[error("token {token} is not in the pool")]
    TokenNotInPool { token: Address },
    #[error("no amounts supplied")]
    EmptyAmounts,
    #[error("token {0} supplied more than once")]
    DuplicateToken(Address),
}

pub fn validate_add(input: &AddLiquidityInput, pool: &PoolState) -> Result<(), ValidationError> {
    if pool.pool_type.is_gyro() && !matches!(input.kind, AddLiquidityKind::Proportional { .. }) {
        return Err(ValidationError::UnsupportedOperationKind(GYRO_ADD_UNSUPPORTED));
    }
    ensure_share_token(pool)?;

    match &input.kind {
        AddLiquidityKind::Init { amounts_in } | AddLiquidityKind::Unbalanced { amounts_in } => {
            ensure_amounts(amounts_in, pool)
        }
        AddLiquidityKind::SingleToken { token_in, bpt_out } => {
            ensure_share_amount(bpt_out, pool)?;
            ensure_pool_token(*token_in, pool)
        }
        AddLiquidityKind::Proportional { reference_amount } => {
            if reference_amount.address == pool.address {
                Ok(())
            } else {
                ensure_pool_token(reference_amount.address, pool)
            }
        }
    }
}

pub fn validate_remove(
    input: &RemoveLiquidityInput,
    pool: &PoolState,
) -> Result<(), ValidationError> {
    if pool.pool_type.is_gyro() && !matches!(input.kind, RemoveLiquidityKind::Proportional { .. })
    {
        return Err(ValidationError::UnsupportedOperationKind(GYRO_REMOVE_UNSUPPORTED));
    }
    if pool.protocol_version == ProtocolVersion::V3
        && matches!(input.kind, RemoveLiquidityKind::Unbalanced { .. })
    {
        return Err(ValidationError::UnsupportedOperationKind(
            V3_UNBALANCED_REMOVE_UNSUPPORTED,
        ));
    }
    ensure_share_token(pool)?;

    match &input.kind {
        RemoveLiquidityKind::Unbalanced { amounts_out } => ensure_amounts(amounts_out, pool),
        RemoveLiquidityKind::SingleTokenExactIn { bpt_in, token_out } => {
            ensure_share_amount(bpt_in, pool)?;
            ensure_pool_token(*token_out, pool)
        }
        RemoveLiquidityKind::SingleTokenExactOut { amount_out } => {
            ensure_pool_token(amount_out.address, pool)
        }
        RemoveLiquidityKind::Proportional { bpt_in } | RemoveLiquidityKind::Recovery { bpt_in } => {
            ensure_share_amount(bpt_in, pool)
        }
    }
}

fn ensure_share_token(pool: &PoolState) -> Result<(), ValidationError> {
    if pool.pool_type.has_share_token() && pool.token(pool.address).is_none() {
        return Err(ValidationError::MissingShareToken(pool.address));
    }
    Ok(())
}

/// A pool token other than the share token.
fn ensure_pool_token(token: Address, pool: &PoolState) -> Result<(), ValidationError> {
    if token == pool.address || pool.token(token).is_none() {
        return Err(ValidationError::TokenNotInPool { token });
    }
    Ok(())
}

fn ensure_share_amount(amount: &InputAmount, pool: &PoolState) -> Result<(), ValidationError> {
    if amount.address != pool.address {
        return Err(ValidationError::TokenNotInPool {
            token: amount.address,
        });
    }
    Ok(())
}

fn ensure_amounts(amounts: &[InputAmount], pool: &PoolState) -> Result<(), ValidationError> {
    if amounts.is_empty() {
        return Err(ValidationError::EmptyAmounts);
    }
    if let Some(duplicate) = amounts.iter().map(|amount| amount.address).duplicates().next() {
        return Err(ValidationError::DuplicateToken(duplicate));
    }
    amounts
        .iter()
        .try_for_each(|amount| ensure_pool_token(amount.address, pool))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            domain::{PoolId, PoolToken, PoolType, ProtocolTokenList},
            math::fixed_point::Bfp,
        },
        alloy::primitives::U256,
    };

    const POOL: Address = Address::repeat_byte(0xbb);
    const TOKEN_A: Address = Address::repeat_byte(0xa0);
    const TOKEN_B: Address = Address::repeat_byte(0xa1);

    fn pool(pool_type: PoolType, protocol_version: ProtocolVersion) -> PoolState {
        let mut addresses = vec![TOKEN_A, TOKEN_B];
        if pool_type.has_share_token() {
            addresses.insert(0, POOL);
        }
        PoolState {
            id: PoolId::from_address(POOL),
            address: POOL,
            pool_type,
            protocol_version,
            tokens: ProtocolTokenList::new(
                addresses
                    .into_iter()
                    .enumerate()
                    .map(|(index, address)| PoolToken {
                        address,
                        decimals: 18,
                        index,
                        balance: U256::from(1_000u64),
                        weight: None,
                        price_rate: Bfp::one(),
                    })
                    .collect(),
            ),
            total_shares: U256::from(1_000u64),
            swap_fee: Bfp::zero(),
            amplification: None,
        }
    }

    fn amount(address: Address) -> InputAmount {
        InputAmount::new(address, 18, U256::from(1u64))
    }

    fn add(kind: AddLiquidityKind) -> AddLiquidityInput {
        AddLiquidityInput {
            chain_id: 1,
            rpc_url: "http://localhost:8545".parse().unwrap(),
            kind,
        }
    }

    fn remove(kind: RemoveLiquidityKind) -> RemoveLiquidityInput {
        RemoveLiquidityInput {
            chain_id: 1,
            rpc_url: "http://localhost:8545".parse().unwrap(),
            kind,
        }
    }

    #[test]
    fn gyro_pools_only_support_proportional() {
        for pool_type in [PoolType::Gyro2, PoolType::Gyro3, PoolType::GyroE] {
            let pool = pool(pool_type, ProtocolVersion::V2);
            let err = validate_add(
                &add(AddLiquidityKind::Unbalanced {
                    amounts_in: vec![amount(TOKEN_A)],
                }),
                &pool,
            )
            .unwrap_err();
            assert_eq!(err.to_string(), GYRO_ADD_UNSUPPORTED);

            let err = validate_remove(
                &remove(RemoveLiquidityKind::SingleTokenExactIn {
                    bpt_in: amount(POOL),
                    token_out: TOKEN_A,
                }),
                &pool,
            )
            .unwrap_err();
            assert_eq!(err.to_string(), GYRO_REMOVE_UNSUPPORTED);

            validate_add(
                &add(AddLiquidityKind::Proportional {
                    reference_amount: amount(POOL),
                }),
                &pool,
            )
            .unwrap();
            validate_remove(
                &remove(RemoveLiquidityKind::Proportional {
                    bpt_in: amount(POOL),
                }),
                &pool,
            )
            .unwrap();
        }
    }

    #[test]
    fn v3_pools_reject_unbalanced_remove() {
        let input = remove(RemoveLiquidityKind::Unbalanced {
            amounts_out: vec![amount(TOKEN_A)],
        });
        assert_eq!(
            validate_remove(&input, &pool(PoolType::Weighted, ProtocolVersion::V3)),
            Err(ValidationError::UnsupportedOperationKind(
                V3_UNBALANCED_REMOVE_UNSUPPORTED
            ))
        );
        validate_remove(&input, &pool(PoolType::Weighted, ProtocolVersion::V2)).unwrap();
    }

    #[test]
    fn composable_pool_needs_share_token() {
        let mut pool = pool(PoolType::ComposableStable, ProtocolVersion::V2);
        let input = add(AddLiquidityKind::Unbalanced {
            amounts_in: vec![amount(TOKEN_A)],
        });
        validate_add(&input, &pool).unwrap();

        pool.tokens = ProtocolTokenList::new(pool.tokens.iter().skip(1).cloned().collect());
        assert_eq!(
            validate_add(&input, &pool),
            Err(ValidationError::MissingShareToken(POOL))
        );
    }

    #[test]
    fn token_membership() {
        let pool = pool(PoolType::ComposableStable, ProtocolVersion::V2);
        let stranger = Address::repeat_byte(0x99);
        assert_eq!(
            validate_add(
                &add(AddLiquidityKind::Unbalanced {
                    amounts_in: vec![amount(stranger)],
                }),
                &pool
            ),
            Err(ValidationError::TokenNotInPool { token: stranger })
        );
        // The share token is never an amount row.
        assert_eq!(
            validate_add(
                &add(AddLiquidityKind::Unbalanced {
                    amounts_in: vec![amount(POOL)],
                }),
                &pool
            ),
            Err(ValidationError::TokenNotInPool { token: POOL })
        );
        // BPT amounts must reference the pool.
        assert_eq!(
            validate_remove(
                &remove(RemoveLiquidityKind::Proportional {
                    bpt_in: amount(TOKEN_A),
                }),
                &pool
            ),
            Err(ValidationError::TokenNotInPool { token: TOKEN_A })
        );
        assert_eq!(
            validate_add(
                &add(AddLiquidityKind::SingleToken {
                    token_in: stranger,
                    bpt_out: amount(POOL),
                }),
                &pool
            ),
            Err(ValidationError::TokenNotInPool { token: stranger })
        );
    }

    #[test]
    fn amount_shape() {
        let pool = pool(PoolType::Weighted, ProtocolVersion::V2);
        assert_eq!(
            validate_add(&add(AddLiquidityKind::Init { amounts_in: vec![] }), &pool),
            Err(ValidationError::EmptyAmounts)
        );
        assert_eq!(
            validate_remove(
                &remove(RemoveLiquidityKind::Unbalanced {
                    amounts_out: vec![amount(TOKEN_B), amount(TOKEN_B)],
                }),
                &pool
            ),
            Err(ValidationError::DuplicateToken(TOKEN_B))
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let pool = pool(PoolType::Stable, ProtocolVersion::V2);
        let inputs = [
            add(AddLiquidityKind::Unbalanced {
                amounts_in: vec![amount(TOKEN_A)],
            }),
            add(AddLiquidityKind::Unbalanced {
                amounts_in: vec![amount(Address::ZERO)],
            }),
        ];
        for input in &inputs {
            assert_eq!(validate_add(input, &pool), validate_add(input, &pool));
        }
    }
}
