//! Liquidity math of V3 pools. The Vault runs `BasePoolMath` on live
//! balances scaled to 18 decimals with rates applied; proportional and
//! recovery operations use raw balances.

use {
    super::{LiquidityMath, MINIMUM_TOTAL_SUPPLY, QueryError, scaling},
    crate::{
        domain::{PoolState, UserFacingTokenList},
        index::InvalidPoolState,
        math::{
            Error,
            Rounding,
            base_pool::{self, PoolInvariant, StableInvariant, WeightedInvariant},
            fixed_point::Bfp,
            stable,
        },
    },
    alloy::primitives::U256,
};

#[derive(Clone, Debug)]
struct Reserves {
    raw: Vec<U256>,
    live_scaled18: Vec<U256>,
    scaling_factors: Vec<U256>,
    rates: Vec<Bfp>,
}

impl Reserves {
    fn new(tokens: &UserFacingTokenList) -> Result<Self, Error> {
        let scaling_factors = tokens
            .iter()
            .map(scaling::v3_scaling_factor)
            .collect::<Result<Vec<_>, _>>()?;
        let rates = tokens.iter().map(|token| token.price_rate).collect::<Vec<_>>();
        let live_scaled18 = tokens
            .iter()
            .zip(scaling_factors.iter().zip(&rates))
            .map(|(token, (factor, rate))| {
                scaling::to_scaled18_apply_rate_round_down(token.balance, *factor, *rate)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            raw: tokens.iter().map(|token| token.balance).collect(),
            live_scaled18,
            scaling_factors,
            rates,
        })
    }

    fn scaling(&self, index: usize) -> Result<(U256, Bfp), Error> {
        Ok((
            *self.scaling_factors.get(index).ok_or(Error::InvalidToken(index))?,
            *self.rates.get(index).ok_or(Error::InvalidToken(index))?,
        ))
    }

    fn scale_exact_amounts_in(&self, amounts: &[U256]) -> Result<Vec<U256>, Error> {
        amounts
            .iter()
            .enumerate()
            .map(|(index, amount)| {
                let (factor, rate) = self.scaling(index)?;
                scaling::to_scaled18_apply_rate_round_down(*amount, factor, rate)
            })
            .collect()
    }
}

/// A V3 pool whose invariant is known: weighted or stable.
#[derive(Clone, Debug)]
pub struct Pool<I> {
    reserves: Reserves,
    invariant: I,
    total_supply: U256,
    swap_fee: Bfp,
}

impl Pool<WeightedInvariant> {
    pub fn weighted(pool: &PoolState, tokens: &UserFacingTokenList) -> Result<Self, QueryError> {
        let normalized_weights = tokens
            .iter()
            .map(|token| {
                token
                    .weight
                    .ok_or(InvalidPoolState::MissingWeight(token.address))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(pool, tokens, WeightedInvariant { normalized_weights })
    }
}

impl Pool<StableInvariant> {
    pub fn stable(pool: &PoolState, tokens: &UserFacingTokenList) -> Result<Self, QueryError> {
        let amplification = pool
            .amplification
            .as_ref()
            .and_then(|amp| amp.with_base(stable::AMP_PRECISION))
            .ok_or(InvalidPoolState::MissingAmplification)?;
        Self::new(pool, tokens, StableInvariant { amplification })
    }
}

impl<I: PoolInvariant> Pool<I> {
    fn new(
        pool: &PoolState,
        tokens: &UserFacingTokenList,
        invariant: I,
    ) -> Result<Self, QueryError> {
        Ok(Self {
            reserves: Reserves::new(tokens)?,
            invariant,
            total_supply: pool.total_shares,
            swap_fee: pool.swap_fee,
        })
    }
}

impl<I: PoolInvariant> LiquidityMath for Pool<I> {
    fn init(&self, amounts_in: &[U256]) -> Result<U256, Error> {
        let amounts = self.reserves.scale_exact_amounts_in(amounts_in)?;
        let invariant = self.invariant.compute_invariant(&amounts, Rounding::RoundDown)?;
        crate::math::sub(invariant, MINIMUM_TOTAL_SUPPLY)
    }

    fn add_unbalanced(&self, amounts_in: &[U256]) -> Result<U256, Error> {
        base_pool::compute_add_liquidity_unbalanced(
            &self.reserves.live_scaled18,
            &self.reserves.scale_exact_amounts_in(amounts_in)?,
            self.total_supply,
            self.swap_fee,
            &self.invariant,
        )
    }

    fn add_single_token(&self, token_index: usize, bpt_out: U256) -> Result<U256, Error> {
        let (factor, rate) = self.reserves.scaling(token_index)?;
        let amount = base_pool::compute_add_liquidity_single_token_exact_out(
            &self.reserves.live_scaled18,
            token_index,
            bpt_out,
            self.total_supply,
            self.swap_fee,
            &self.invariant,
        )?;
        scaling::to_raw_undo_rate_round_up(amount, factor, rate)
    }

    fn add_proportional(&self, bpt_out: U256) -> Result<Vec<U256>, Error> {
        base_pool::compute_proportional_amounts_in(&self.reserves.raw, self.total_supply, bpt_out)
    }

    fn remove_unbalanced(&self, _: &[U256]) -> Result<U256, Error> {
        Err(Error::UnhandledExitKind)
    }

    fn remove_single_token_exact_in(
        &self,
        token_index: usize,
        bpt_in: U256,
    ) -> Result<U256, Error> {
        let (factor, rate) = self.reserves.scaling(token_index)?;
        let amount = base_pool::compute_remove_liquidity_single_token_exact_in(
            &self.reserves.live_scaled18,
            token_index,
            bpt_in,
            self.total_supply,
            self.swap_fee,
            &self.invariant,
        )?;
        scaling::to_raw_undo_rate_round_down(amount, factor, rate)
    }

    fn remove_single_token_exact_out(
        &self,
        token_index: usize,
        amount_out: U256,
    ) -> Result<U256, Error> {
        let (factor, rate) = self.reserves.scaling(token_index)?;
        base_pool::compute_remove_liquidity_single_token_exact_out(
            &self.reserves.live_scaled18,
            token_index,
            scaling::to_scaled18_apply_rate_round_up(amount_out, factor, rate)?,
            self.total_supply,
            self.swap_fee,
            &self.invariant,
        )
    }

    fn remove_proportional(&self, bpt_in: U256) -> Result<Vec<U256>, Error> {
        base_pool::compute_proportional_amounts_out(&self.reserves.raw, self.total_supply, bpt_in)
    }

    fn remove_recovery(&self, bpt_in: U256) -> Result<Vec<U256>, Error> {
        base_pool::compute_proportional_amounts_out(&self.reserves.raw, self.total_supply, bpt_in)
    }
}

/// Gyro pools on V3, proportional operations only.
#[derive(Clone, Debug)]
pub struct Gyro {
    balances: Vec<U256>,
    total_supply: U256,
}

impl Gyro {
    pub fn new(pool: &PoolState, tokens: &UserFacingTokenList) -> Self {
        Self {
            balances: tokens.iter().map(|token| token.balance).collect(),
            total_supply: pool.total_shares,
        }
    }
}

impl LiquidityMath for Gyro {
    fn init(&self, _: &[U256]) -> Result<U256, Error> {
        Err(Error::UnhandledJoinKind)
    }

    fn add_unbalanced(&self, _: &[U256]) -> Result<U256, Error> {
        Err(Error::UnhandledJoinKind)
    }

    fn add_single_token(&self, _: usize, _: U256) -> Result<U256, Error> {
        Err(Error::UnhandledJoinKind)
    }

    fn add_proportional(&self, bpt_out: U256) -> Result<Vec<U256>, Error> {
        base_pool::compute_proportional_amounts_in(&self.balances, self.total_supply, bpt_out)
    }

    fn remove_unbalanced(&self, _: &[U256]) -> Result<U256, Error> {
        Err(Error::UnhandledExitKind)
    }

    fn remove_single_token_exact_in(&self, _: usize, _: U256) -> Result<U256, Error> {
        Err(Error::UnhandledExitKind)
    }

    fn remove_single_token_exact_out(&self, _: usize, _: U256) -> Result<U256, Error> {
        Err(Error::UnhandledExitKind)
    }

    fn remove_proportional(&self, bpt_in: U256) -> Result<Vec<U256>, Error> {
        base_pool::compute_proportional_amounts_out(&self.balances, self.total_supply, bpt_in)
    }

    fn remove_recovery(&self, _: U256) -> Result<Vec<U256>, Error> {
        Err(Error::UnhandledExitKind)
    }
}
