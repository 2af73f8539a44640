//! Encodes bounded liquidity operations into calls against the Balancer V2
//! Vault or the V3 Router.

mod native;
mod v2;
mod v3;

use {
    crate::{
        domain::{
            AddLiquidityBoundedOutput,
            AddLiquidityBuildOutput,
            ProtocolVersion,
            RemoveLiquidityBoundedOutput,
            RemoveLiquidityBuildOutput,
        },
        index,
    },
    alloy::primitives::{Address, Bytes, U256},
    chain::Chain,
    tracing::debug,
};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("pool does not contain the wrapped native token {0}")]
    NativeAssetNotInPool(Address),
    #[error("no {contract} address known for chain {chain_id}")]
    MissingContract {
        contract: &'static str,
        chain_id: u64,
    },
    #[error("{0}")]
    UnsupportedOperationKind(&'static str),
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AddLiquidityBuildParams {
    pub sender: Address,
    pub recipient: Address,
    /// Pay the wrapped native token's share in the chain's native asset.
    pub wrap_native: bool,
    /// V2 only.
    pub from_internal_balance: bool,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RemoveLiquidityBuildParams {
    pub sender: Address,
    pub recipient: Address,
    /// Receive the wrapped native token's share as the native asset.
    pub receive_native: bool,
    /// V2 only.
    pub to_internal_balance: bool,
}

/// Addresses the built calls are sent to on a chain.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Contracts {
    pub chain_id: u64,
    pub balancer_v2_vault: Option<Address>,
    pub balancer_v3_router: Option<Address>,
    pub wrapped_native_token: Address,
}

impl Contracts {
    /// Canonical deployments of a chain.
    pub fn for_chain(chain: Chain) -> Self {
        Self {
            chain_id: chain.id(),
            balancer_v2_vault: contracts::deployments::balancer_v2_vault(chain),
            balancer_v3_router: contracts::deployments::balancer_v3_router(chain),
            wrapped_native_token: contracts::deployments::wrapped_native_token(chain),
        }
    }

    fn target(&self, version: ProtocolVersion) -> Result<Address, BuildError> {
        let (contract, address) = match version {
            ProtocolVersion::V2 => ("Balancer V2 Vault", self.balancer_v2_vault),
            ProtocolVersion::V3 => ("Balancer V3 Router", self.balancer_v3_router),
        };
        address.ok_or(BuildError::MissingContract {
            contract,
            chain_id: self.chain_id,
        })
    }
}

pub fn build_add(
    bounded: &AddLiquidityBoundedOutput,
    params: &AddLiquidityBuildParams,
    contracts: &Contracts,
) -> Result<AddLiquidityBuildOutput, BuildError> {
    let query = &bounded.query;
    let wrapped = contracts.wrapped_native_token;
    if params.wrap_native {
        native::ensure_in_pool(&query.amounts_in, wrapped)?;
    }

    let to = contracts.target(query.protocol_version)?;
    let call: Bytes = match query.protocol_version {
        ProtocolVersion::V2 => v2::join_pool(bounded, params, wrapped)?,
        ProtocolVersion::V3 => v3::add_liquidity(bounded, params)?,
    };

    let (max_amounts_in, value) = if params.wrap_native {
        (
            native::substitute(&bounded.max_amounts_in, wrapped),
            native::value(&bounded.max_amounts_in, wrapped),
        )
    } else {
        (bounded.max_amounts_in.clone(), U256::ZERO)
    };
    debug!(
        %to,
        %value,
        kind = %query.kind,
        version = %query.protocol_version,
        "built add liquidity call"
    );
    Ok(AddLiquidityBuildOutput {
        to,
        call,
        value,
        max_amounts_in,
        min_bpt_out: bounded.min_bpt_out,
    })
}

pub fn build_remove(
    bounded: &RemoveLiquidityBoundedOutput,
    params: &RemoveLiquidityBuildParams,
    contracts: &Contracts,
) -> Result<RemoveLiquidityBuildOutput, BuildError> {
    let query = &bounded.query;
    let wrapped = contracts.wrapped_native_token;
    if params.receive_native {
        native::ensure_in_pool(&query.amounts_out, wrapped)?;
    }

    let to = contracts.target(query.protocol_version)?;
    let call: Bytes = match query.protocol_version {
        ProtocolVersion::V2 => v2::exit_pool(bounded, params, wrapped)?,
        ProtocolVersion::V3 => v3::remove_liquidity(bounded, params)?,
    };

    let min_amounts_out = if params.receive_native {
        native::substitute(&bounded.min_amounts_out, wrapped)
    } else {
        bounded.min_amounts_out.clone()
    };
    debug!(
        %to,
        kind = %query.kind,
        version = %query.protocol_version,
        "built remove liquidity call"
    );
    Ok(RemoveLiquidityBuildOutput {
        to,
        call,
        value: U256::ZERO,
        min_amounts_out,
        max_bpt_in: bounded.max_bpt_in,
    })
}

/// Drops the share token row of a protocol facing amount list.
fn user_facing<T: Copy>(amounts: &[T], share_token_index: Option<usize>) -> Vec<T> {
    amounts
        .iter()
        .enumerate()
        .filter(|(i, _)| index::to_user_facing_index(*i, share_token_index).is_some())
        .map(|(_, amount)| *amount)
        .collect()
}

/// The user facing token index of a single token operation.
fn single_token_index(token_index: Option<usize>) -> Result<usize, BuildError> {
    token_index.ok_or(BuildError::UnsupportedOperationKind(
        "single token operation without a token index",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_deployments() {
        let mainnet = Contracts::for_chain(Chain::Mainnet);
        assert_eq!(
            mainnet.target(ProtocolVersion::V2).unwrap(),
            contracts::deployments::BALANCER_V2_VAULT
        );
        assert!(mainnet.target(ProtocolVersion::V3).is_ok());

        let polygon = Contracts::for_chain(Chain::Polygon);
        assert_eq!(
            polygon.target(ProtocolVersion::V3),
            Err(BuildError::MissingContract {
                contract: "Balancer V3 Router",
                chain_id: 137
            })
        );
    }

    #[test]
    fn drops_share_token_row() {
        assert_eq!(user_facing(&[7, 8, 9], Some(0)), vec![8, 9]);
        assert_eq!(user_facing(&[7, 8, 9], Some(1)), vec![7, 9]);
        assert_eq!(user_facing(&[7, 8, 9], None), vec![7, 8, 9]);
    }
}
