//! Caller supplied liquidity operations. Inputs are consumed once and never
//! mutated.

use {
    super::eth::InputAmount,
    alloy::primitives::Address,
    url::Url,
};

#[derive(Clone, Debug)]
pub struct AddLiquidityInput {
    pub chain_id: u64,
    /// Node the caller submits the built call to.
    pub rpc_url: Url,
    pub kind: AddLiquidityKind,
}

#[derive(Clone, Debug, Eq, PartialEq, strum::EnumDiscriminants)]
#[strum_discriminants(name(AddKind), derive(strum::Display, Hash))]
pub enum AddLiquidityKind {
    /// Seeds an empty pool.
    Init { amounts_in: Vec<InputAmount> },
    /// Exact amounts of any subset of tokens in, BPT out computed.
    Unbalanced { amounts_in: Vec<InputAmount> },
    /// Exact BPT out paid with a single token.
    SingleToken {
        token_in: Address,
        bpt_out: InputAmount,
    },
    /// All tokens in the pool's balance ratio. The reference is either the
    /// exact BPT out or an exact amount of one pool token.
    Proportional { reference_amount: InputAmount },
}

#[derive(Clone, Debug)]
pub struct RemoveLiquidityInput {
    pub chain_id: u64,
    pub rpc_url: Url,
    pub kind: RemoveLiquidityKind,
}

#[derive(Clone, Debug, Eq, PartialEq, strum::EnumDiscriminants)]
#[strum_discriminants(name(RemoveKind), derive(strum::Display, Hash))]
pub enum RemoveLiquidityKind {
    /// Exact amounts of any subset of tokens out, BPT in computed.
    Unbalanced { amounts_out: Vec<InputAmount> },
    /// Exact BPT in paid out in a single token.
    SingleTokenExactIn {
        bpt_in: InputAmount,
        token_out: Address,
    },
    /// Exact amount of a single token out, BPT in computed.
    SingleTokenExactOut { amount_out: InputAmount },
    Proportional { bpt_in: InputAmount },
    /// Proportional exit of a pool in recovery mode, no pool math and no
    /// fees.
    Recovery { bpt_in: InputAmount },
}

impl AddKind {
    /// Whether the caller fixes token amounts (as opposed to the share
    /// amount).
    pub fn is_exact_in(&self) -> bool {
        matches!(self, Self::Init | Self::Unbalanced)
    }
}

impl RemoveKind {
    /// Whether the caller fixes token amounts (as opposed to the share
    /// amount).
    pub fn is_exact_out(&self) -> bool {
        matches!(self, Self::Unbalanced | Self::SingleTokenExactOut)
    }
}
