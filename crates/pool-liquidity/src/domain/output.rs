//! Values produced by the query, slippage and build stages.

use {
    super::{
        eth::TokenAmount,
        operation::{AddKind, RemoveKind},
        pool::{PoolId, PoolType, ProtocolVersion},
    },
    alloy::primitives::{Address, Bytes, U256},
};

/// Expected result of adding liquidity. `amounts_in` is protocol facing and
/// carries a zero row for the share token when the pool lists it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddLiquidityQueryOutput {
    pub pool_id: PoolId,
    pub pool_address: Address,
    pub pool_type: PoolType,
    pub protocol_version: ProtocolVersion,
    pub chain_id: u64,
    pub kind: AddKind,
    pub amounts_in: Vec<TokenAmount>,
    pub bpt_out: TokenAmount,
    /// User facing index of the token of a single token operation.
    pub token_index: Option<usize>,
    /// Protocol facing index of the share token.
    pub share_token_index: Option<usize>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoveLiquidityQueryOutput {
    pub pool_id: PoolId,
    pub pool_address: Address,
    pub pool_type: PoolType,
    pub protocol_version: ProtocolVersion,
    pub chain_id: u64,
    pub kind: RemoveKind,
    pub amounts_out: Vec<TokenAmount>,
    pub bpt_in: TokenAmount,
    pub token_index: Option<usize>,
    pub share_token_index: Option<usize>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddLiquidityBoundedOutput {
    pub query: AddLiquidityQueryOutput,
    pub max_amounts_in: Vec<TokenAmount>,
    pub min_bpt_out: TokenAmount,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoveLiquidityBoundedOutput {
    pub query: RemoveLiquidityQueryOutput,
    pub min_amounts_out: Vec<TokenAmount>,
    pub max_bpt_in: TokenAmount,
}

/// An encoded call ready to be sent to `to` with `value` attached.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddLiquidityBuildOutput {
    pub to: Address,
    pub call: Bytes,
    pub value: U256,
    pub max_amounts_in: Vec<TokenAmount>,
    pub min_bpt_out: TokenAmount,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoveLiquidityBuildOutput {
    pub to: Address,
    pub call: Bytes,
    pub value: U256,
    pub min_amounts_out: Vec<TokenAmount>,
    pub max_bpt_in: TokenAmount,
}
