//! Computes the expected token and share amounts of a liquidity operation
//! by reproducing the pool contracts' math off-chain.
//!
//! Each `(pool family, protocol version)` pair maps to a [`LiquidityMath`]
//! handler. Handlers work in the user facing index space (the share token
//! of composable pools excluded); results are mapped back to the protocol
//! facing token order with a zero row for the share token.

mod scaling;
pub mod v2;
pub mod v3;

use {
    crate::{
        domain::{
            AddKind,
            AddLiquidityInput,
            AddLiquidityKind,
            AddLiquidityQueryOutput,
            InputAmount,
            PoolState,
            ProtocolVersion,
            RemoveKind,
            RemoveLiquidityInput,
            RemoveLiquidityKind,
            RemoveLiquidityQueryOutput,
            TokenAmount,
            UserFacingTokenList,
            pool::PoolFamily,
        },
        index,
        math,
    },
    alloy::primitives::{Address, U256},
    tracing::debug,
};

/// BPT locked forever when a pool is initialised, on V2 and V3 alike.
pub const MINIMUM_TOTAL_SUPPLY: U256 = U256::from_limbs([1_000_000, 0, 0, 0]);

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invariant computation failed: {0}")]
    InvariantComputation(#[from] math::Error),
    #[error("invalid pool state: {0}")]
    InvalidPoolState(#[from] index::InvalidPoolState),
    #[error("token {0} is not in the pool")]
    TokenNotInPool(Address),
}

/// Pool specific liquidity math. Amounts are raw token amounts indexed by
/// user facing token position; share amounts are raw BPT.
pub trait LiquidityMath {
    /// BPT minted to the caller when seeding an empty pool.
    fn init(&self, amounts_in: &[U256]) -> Result<U256, math::Error>;

    fn add_unbalanced(&self, amounts_in: &[U256]) -> Result<U256, math::Error>;

    /// Amount of a single token required to mint exactly `bpt_out`.
    fn add_single_token(&self, token_index: usize, bpt_out: U256) -> Result<U256, math::Error>;

    fn add_proportional(&self, bpt_out: U256) -> Result<Vec<U256>, math::Error>;

    fn remove_unbalanced(&self, amounts_out: &[U256]) -> Result<U256, math::Error>;

    fn remove_single_token_exact_in(
        &self,
        token_index: usize,
        bpt_in: U256,
    ) -> Result<U256, math::Error>;

    /// BPT burnt to receive exactly `amount_out` of a single token.
    fn remove_single_token_exact_out(
        &self,
        token_index: usize,
        amount_out: U256,
    ) -> Result<U256, math::Error>;

    fn remove_proportional(&self, bpt_in: U256) -> Result<Vec<U256>, math::Error>;

    fn remove_recovery(&self, bpt_in: U256) -> Result<Vec<U256>, math::Error>;
}

fn handler(
    pool: &PoolState,
    tokens: &UserFacingTokenList,
) -> Result<Box<dyn LiquidityMath>, QueryError> {
    let handler: Box<dyn LiquidityMath> = match (pool.pool_type.family(), pool.protocol_version) {
        (PoolFamily::Weighted, ProtocolVersion::V2) => Box::new(v2::Weighted::new(pool, tokens)?),
        (PoolFamily::Stable | PoolFamily::ComposableStable, ProtocolVersion::V2) => {
            Box::new(v2::Stable::new(pool, tokens)?)
        }
        (PoolFamily::Gyro, ProtocolVersion::V2) => Box::new(v2::Gyro::new(pool, tokens)?),
        (PoolFamily::Weighted, ProtocolVersion::V3) => {
            Box::new(v3::Pool::weighted(pool, tokens)?)
        }
        (PoolFamily::Stable | PoolFamily::ComposableStable, ProtocolVersion::V3) => {
            Box::new(v3::Pool::stable(pool, tokens)?)
        }
        (PoolFamily::Gyro, ProtocolVersion::V3) => Box::new(v3::Gyro::new(pool, tokens)),
    };
    Ok(handler)
}

/// Pool state split into the two index spaces.
struct Context<'a> {
    pool: &'a PoolState,
    chain_id: u64,
    user_tokens: UserFacingTokenList,
    share_token_index: Option<usize>,
}

impl<'a> Context<'a> {
    fn new(pool: &'a PoolState, chain_id: u64) -> Self {
        Self {
            pool,
            chain_id,
            user_tokens: index::user_facing_tokens(pool),
            share_token_index: index::share_token_index(pool),
        }
    }

    fn user_index(&self, token: Address) -> Result<usize, QueryError> {
        self.user_tokens
            .iter()
            .position(|t| t.address == token)
            .ok_or(QueryError::TokenNotInPool(token))
    }

    /// Zero filled user facing amounts with the supplied rows set.
    fn user_amounts(&self, amounts: &[InputAmount]) -> Result<Vec<U256>, QueryError> {
        let mut result = vec![U256::ZERO; self.user_tokens.len()];
        for amount in amounts {
            result[self.user_index(amount.address)?] = amount.raw_amount;
        }
        Ok(result)
    }

    /// Invariant based operations need every token funded.
    fn require_balances(&self) -> Result<(), QueryError> {
        match self.user_tokens.iter().position(|token| token.balance.is_zero()) {
            Some(index) => Err(math::Error::ZeroBalance(index).into()),
            None => Ok(()),
        }
    }

    fn single(&self, index: usize, amount: U256) -> Vec<U256> {
        let mut result = vec![U256::ZERO; self.user_tokens.len()];
        result[index] = amount;
        result
    }

    /// Maps user facing amounts onto the protocol token order.
    fn protocol_amounts(&self, amounts: &[U256]) -> Vec<TokenAmount> {
        self.pool
            .tokens
            .iter()
            .enumerate()
            .map(|(protocol_index, token)| {
                let amount = index::to_user_facing_index(protocol_index, self.share_token_index)
                    .and_then(|user_index| amounts.get(user_index).copied())
                    .unwrap_or_default();
                TokenAmount::new(token.token(self.chain_id), amount)
            })
            .collect()
    }

    fn bpt(&self, amount: U256) -> TokenAmount {
        TokenAmount::new(self.pool.share_token(self.chain_id), amount)
    }

    /// Exact BPT of a proportional add. A pool token reference fixes the
    /// BPT by that token's share of the pool balance, rounding down.
    fn proportional_bpt(&self, reference: &InputAmount) -> Result<U256, QueryError> {
        if reference.address == self.pool.address {
            return Ok(reference.raw_amount);
        }
        let index = self.user_index(reference.address)?;
        let balance = self.user_tokens[index].balance;
        Ok(math::div_down(
            math::mul(reference.raw_amount, self.pool.total_shares)?,
            balance,
        )?)
    }
}

/// Expected amounts of adding liquidity to `pool`.
pub fn query_add(
    input: &AddLiquidityInput,
    pool: &PoolState,
) -> Result<AddLiquidityQueryOutput, QueryError> {
    let context = Context::new(pool, input.chain_id);
    let math = handler(pool, &context.user_tokens)?;

    let (amounts, bpt_out, token_index) = match &input.kind {
        AddLiquidityKind::Init { amounts_in } => {
            let amounts = context.user_amounts(amounts_in)?;
            let bpt_out = math.init(&amounts)?;
            (amounts, bpt_out, None)
        }
        AddLiquidityKind::Unbalanced { amounts_in } => {
            context.require_balances()?;
            let amounts = context.user_amounts(amounts_in)?;
            let bpt_out = math.add_unbalanced(&amounts)?;
            (amounts, bpt_out, None)
        }
        AddLiquidityKind::SingleToken { token_in, bpt_out } => {
            context.require_balances()?;
            let index = context.user_index(*token_in)?;
            let amount = math.add_single_token(index, bpt_out.raw_amount)?;
            (context.single(index, amount), bpt_out.raw_amount, Some(index))
        }
        AddLiquidityKind::Proportional { reference_amount } => {
            let bpt_out = context.proportional_bpt(reference_amount)?;
            (math.add_proportional(bpt_out)?, bpt_out, None)
        }
    };

    let output = AddLiquidityQueryOutput {
        pool_id: pool.id,
        pool_address: pool.address,
        pool_type: pool.pool_type,
        protocol_version: pool.protocol_version,
        chain_id: input.chain_id,
        kind: AddKind::from(&input.kind),
        amounts_in: context.protocol_amounts(&amounts),
        bpt_out: context.bpt(bpt_out),
        token_index,
        share_token_index: context.share_token_index,
    };
    debug!(
        pool = %pool.address,
        kind = %output.kind,
        bpt_out = %output.bpt_out.amount,
        amounts_in = ?output.amounts_in.iter().map(|a| a.amount).collect::<Vec<_>>(),
        "queried add liquidity"
    );
    Ok(output)
}

/// Expected amounts of removing liquidity from `pool`.
pub fn query_remove(
    input: &RemoveLiquidityInput,
    pool: &PoolState,
) -> Result<RemoveLiquidityQueryOutput, QueryError> {
    let context = Context::new(pool, input.chain_id);
    let math = handler(pool, &context.user_tokens)?;

    let (amounts, bpt_in, token_index) = match &input.kind {
        RemoveLiquidityKind::Unbalanced { amounts_out } => {
            context.require_balances()?;
            let amounts = context.user_amounts(amounts_out)?;
            let bpt_in = math.remove_unbalanced(&amounts)?;
            (amounts, bpt_in, None)
        }
        RemoveLiquidityKind::SingleTokenExactIn { bpt_in, token_out } => {
            context.require_balances()?;
            let index = context.user_index(*token_out)?;
            let amount = math.remove_single_token_exact_in(index, bpt_in.raw_amount)?;
            (context.single(index, amount), bpt_in.raw_amount, Some(index))
        }
        RemoveLiquidityKind::SingleTokenExactOut { amount_out } => {
            context.require_balances()?;
            let index = context.user_index(amount_out.address)?;
            let bpt_in = math.remove_single_token_exact_out(index, amount_out.raw_amount)?;
            (context.single(index, amount_out.raw_amount), bpt_in, Some(index))
        }
        RemoveLiquidityKind::Proportional { bpt_in } => (
            math.remove_proportional(bpt_in.raw_amount)?,
            bpt_in.raw_amount,
            None,
        ),
        RemoveLiquidityKind::Recovery { bpt_in } => (
            math.remove_recovery(bpt_in.raw_amount)?,
            bpt_in.raw_amount,
            None,
        ),
    };

    let output = RemoveLiquidityQueryOutput {
        pool_id: pool.id,
        pool_address: pool.address,
        pool_type: pool.pool_type,
        protocol_version: pool.protocol_version,
        chain_id: input.chain_id,
        kind: RemoveKind::from(&input.kind),
        amounts_out: context.protocol_amounts(&amounts),
        bpt_in: context.bpt(bpt_in),
        token_index,
        share_token_index: context.share_token_index,
    };
    debug!(
        pool = %pool.address,
        kind = %output.kind,
        bpt_in = %output.bpt_in.amount,
        amounts_out = ?output.amounts_out.iter().map(|a| a.amount).collect::<Vec<_>>(),
        "queried remove liquidity"
    );
    Ok(output)
}
