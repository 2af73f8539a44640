//! Liquidity math of V2 pools. Balances and amounts are upscaled before the
//! pool math runs. Computed amounts in are downscaled rounding up, computed
//! amounts out rounding down.

use {
    super::{LiquidityMath, MINIMUM_TOTAL_SUPPLY, QueryError, scaling},
    crate::{
        domain::{PoolState, UserFacingTokenList},
        index::InvalidPoolState,
        math::{Error, Rounding, fixed_point::Bfp, stable, weighted},
    },
    alloy::primitives::U256,
};

/// Token balances of a V2 pool in both representations.
#[derive(Clone, Debug)]
struct Reserves {
    raw: Vec<U256>,
    upscaled: Vec<Bfp>,
    scaling_factors: Vec<Bfp>,
}

impl Reserves {
    fn new(tokens: &UserFacingTokenList) -> Result<Self, Error> {
        let scaling_factors = tokens
            .iter()
            .map(scaling::v2_scaling_factor)
            .collect::<Result<Vec<_>, _>>()?;
        let upscaled = tokens
            .iter()
            .zip(&scaling_factors)
            .map(|(token, factor)| scaling::upscale(token.balance, *factor))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            raw: tokens.iter().map(|token| token.balance).collect(),
            upscaled,
            scaling_factors,
        })
    }

    fn balance(&self, index: usize) -> Result<Bfp, Error> {
        self.upscaled.get(index).copied().ok_or(Error::InvalidToken(index))
    }

    fn factor(&self, index: usize) -> Result<Bfp, Error> {
        self.scaling_factors
            .get(index)
            .copied()
            .ok_or(Error::InvalidToken(index))
    }

    fn upscale(&self, amounts: &[U256]) -> Result<Vec<Bfp>, Error> {
        amounts
            .iter()
            .zip(&self.scaling_factors)
            .map(|(amount, factor)| scaling::upscale(*amount, *factor))
            .collect()
    }

    /// Single token amounts in and out with every other row zero.
    fn single(&self, index: usize, amount: U256) -> Result<Vec<U256>, Error> {
        if index >= self.raw.len() {
            return Err(Error::InvalidToken(index));
        }
        let mut amounts = vec![U256::ZERO; self.raw.len()];
        amounts[index] = amount;
        Ok(amounts)
    }

    /// `ALL_TOKENS_IN_FOR_EXACT_BPT_OUT`.
    fn proportional_in(&self, total_supply: Bfp, bpt_out: U256) -> Result<Vec<U256>, Error> {
        let ratio = Bfp::from_wei(bpt_out).div_up(total_supply)?;
        self.upscaled
            .iter()
            .zip(&self.scaling_factors)
            .map(|(balance, factor)| scaling::downscale_up(balance.mul_up(ratio)?, *factor))
            .collect()
    }

    /// `EXACT_BPT_IN_FOR_TOKENS_OUT`.
    fn proportional_out(&self, total_supply: Bfp, bpt_in: U256) -> Result<Vec<U256>, Error> {
        let ratio = Bfp::from_wei(bpt_in).div_down(total_supply)?;
        self.upscaled
            .iter()
            .zip(&self.scaling_factors)
            .map(|(balance, factor)| scaling::downscale_down(balance.mul_down(ratio)?, *factor))
            .collect()
    }

    /// Recovery mode exits operate on raw balances.
    fn recovery_out(&self, total_supply: Bfp, bpt_in: U256) -> Result<Vec<U256>, Error> {
        let ratio = Bfp::from_wei(bpt_in).div_down(total_supply)?;
        self.raw
            .iter()
            .map(|balance| Ok(Bfp::from_wei(*balance).mul_down(ratio)?.as_uint256()))
            .collect()
    }
}

fn without_minimum_supply(bpt: U256) -> Result<U256, Error> {
    crate::math::sub(bpt, MINIMUM_TOTAL_SUPPLY)
}

/// Weighted and liquidity bootstrapping pools.
#[derive(Clone, Debug)]
pub struct Weighted {
    reserves: Reserves,
    weights: Vec<Bfp>,
    total_supply: Bfp,
    swap_fee: Bfp,
}

impl Weighted {
    pub fn new(pool: &PoolState, tokens: &UserFacingTokenList) -> Result<Self, QueryError> {
        let weights = tokens
            .iter()
            .map(|token| {
                token
                    .weight
                    .ok_or(InvalidPoolState::MissingWeight(token.address))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            reserves: Reserves::new(tokens)?,
            weights,
            total_supply: Bfp::from_wei(pool.total_shares),
            swap_fee: pool.swap_fee,
        })
    }

    fn weight(&self, index: usize) -> Result<Bfp, Error> {
        self.weights.get(index).copied().ok_or(Error::InvalidToken(index))
    }
}

impl LiquidityMath for Weighted {
    fn init(&self, amounts_in: &[U256]) -> Result<U256, Error> {
        let amounts = self.reserves.upscale(amounts_in)?;
        let invariant =
            weighted::calculate_invariant(&self.weights, &amounts, Rounding::RoundDown)?;
        let bpt = crate::math::mul(invariant.as_uint256(), U256::from(amounts.len()))?;
        without_minimum_supply(bpt)
    }

    fn add_unbalanced(&self, amounts_in: &[U256]) -> Result<U256, Error> {
        Ok(weighted::calc_bpt_out_given_exact_tokens_in(
            &self.reserves.upscaled,
            &self.weights,
            &self.reserves.upscale(amounts_in)?,
            self.total_supply,
            self.swap_fee,
        )?
        .as_uint256())
    }

    fn add_single_token(&self, token_index: usize, bpt_out: U256) -> Result<U256, Error> {
        let amount = weighted::calc_token_in_given_exact_bpt_out(
            self.reserves.balance(token_index)?,
            self.weight(token_index)?,
            Bfp::from_wei(bpt_out),
            self.total_supply,
            self.swap_fee,
        )?;
        scaling::downscale_up(amount, self.reserves.factor(token_index)?)
    }

    fn add_proportional(&self, bpt_out: U256) -> Result<Vec<U256>, Error> {
        self.reserves.proportional_in(self.total_supply, bpt_out)
    }

    fn remove_unbalanced(&self, amounts_out: &[U256]) -> Result<U256, Error> {
        Ok(weighted::calc_bpt_in_given_exact_tokens_out(
            &self.reserves.upscaled,
            &self.weights,
            &self.reserves.upscale(amounts_out)?,
            self.total_supply,
            self.swap_fee,
        )?
        .as_uint256())
    }

    fn remove_single_token_exact_in(
        &self,
        token_index: usize,
        bpt_in: U256,
    ) -> Result<U256, Error> {
        let amount = weighted::calc_token_out_given_exact_bpt_in(
            self.reserves.balance(token_index)?,
            self.weight(token_index)?,
            Bfp::from_wei(bpt_in),
            self.total_supply,
            self.swap_fee,
        )?;
        scaling::downscale_down(amount, self.reserves.factor(token_index)?)
    }

    fn remove_single_token_exact_out(
        &self,
        token_index: usize,
        amount_out: U256,
    ) -> Result<U256, Error> {
        self.remove_unbalanced(&self.reserves.single(token_index, amount_out)?)
    }

    fn remove_proportional(&self, bpt_in: U256) -> Result<Vec<U256>, Error> {
        self.reserves.proportional_out(self.total_supply, bpt_in)
    }

    fn remove_recovery(&self, bpt_in: U256) -> Result<Vec<U256>, Error> {
        self.reserves.recovery_out(self.total_supply, bpt_in)
    }
}

/// Stable pools and composable stable pools. For the latter the share token
/// is excluded from the balances and the supply is the virtual supply.
#[derive(Clone, Debug)]
pub struct Stable {
    reserves: Reserves,
    /// Amplification times [`stable::AMP_PRECISION`].
    amplification: U256,
    total_supply: Bfp,
    swap_fee: Bfp,
}

impl Stable {
    pub fn new(pool: &PoolState, tokens: &UserFacingTokenList) -> Result<Self, QueryError> {
        let amplification = pool
            .amplification
            .as_ref()
            .and_then(|amp| amp.with_base(stable::AMP_PRECISION))
            .ok_or(InvalidPoolState::MissingAmplification)?;
        Ok(Self {
            reserves: Reserves::new(tokens)?,
            amplification,
            total_supply: Bfp::from_wei(pool.total_shares),
            swap_fee: pool.swap_fee,
        })
    }

    fn balances(&self) -> Vec<U256> {
        self.reserves
            .upscaled
            .iter()
            .map(|balance| balance.as_uint256())
            .collect()
    }

    fn current_invariant(&self) -> Result<U256, Error> {
        stable::calculate_invariant(self.amplification, &self.balances())
    }
}

impl LiquidityMath for Stable {
    fn init(&self, amounts_in: &[U256]) -> Result<U256, Error> {
        let amounts = self
            .reserves
            .upscale(amounts_in)?
            .into_iter()
            .map(Bfp::as_uint256)
            .collect::<Vec<_>>();
        let invariant = stable::calculate_invariant(self.amplification, &amounts)?;
        without_minimum_supply(invariant)
    }

    fn add_unbalanced(&self, amounts_in: &[U256]) -> Result<U256, Error> {
        Ok(stable::calc_bpt_out_given_exact_tokens_in(
            self.amplification,
            &self.reserves.upscaled,
            &self.reserves.upscale(amounts_in)?,
            self.total_supply,
            self.current_invariant()?,
            self.swap_fee,
        )?
        .as_uint256())
    }

    fn add_single_token(&self, token_index: usize, bpt_out: U256) -> Result<U256, Error> {
        let factor = self.reserves.factor(token_index)?;
        let amount = stable::calc_token_in_given_exact_bpt_out(
            self.amplification,
            &self.reserves.upscaled,
            token_index,
            Bfp::from_wei(bpt_out),
            self.total_supply,
            self.current_invariant()?,
            self.swap_fee,
        )?;
        scaling::downscale_up(amount, factor)
    }

    fn add_proportional(&self, bpt_out: U256) -> Result<Vec<U256>, Error> {
        self.reserves.proportional_in(self.total_supply, bpt_out)
    }

    fn remove_unbalanced(&self, amounts_out: &[U256]) -> Result<U256, Error> {
        Ok(stable::calc_bpt_in_given_exact_tokens_out(
            self.amplification,
            &self.reserves.upscaled,
            &self.reserves.upscale(amounts_out)?,
            self.total_supply,
            self.current_invariant()?,
            self.swap_fee,
        )?
        .as_uint256())
    }

    fn remove_single_token_exact_in(
        &self,
        token_index: usize,
        bpt_in: U256,
    ) -> Result<U256, Error> {
        let factor = self.reserves.factor(token_index)?;
        let amount = stable::calc_token_out_given_exact_bpt_in(
            self.amplification,
            &self.reserves.upscaled,
            token_index,
            Bfp::from_wei(bpt_in),
            self.total_supply,
            self.current_invariant()?,
            self.swap_fee,
        )?;
        scaling::downscale_down(amount, factor)
    }

    fn remove_single_token_exact_out(
        &self,
        token_index: usize,
        amount_out: U256,
    ) -> Result<U256, Error> {
        self.remove_unbalanced(&self.reserves.single(token_index, amount_out)?)
    }

    fn remove_proportional(&self, bpt_in: U256) -> Result<Vec<U256>, Error> {
        self.reserves.proportional_out(self.total_supply, bpt_in)
    }

    fn remove_recovery(&self, bpt_in: U256) -> Result<Vec<U256>, Error> {
        self.reserves.recovery_out(self.total_supply, bpt_in)
    }
}

/// Gyro pools only support proportional operations, which need no pool
/// specific math.
#[derive(Clone, Debug)]
pub struct Gyro {
    reserves: Reserves,
    total_supply: Bfp,
}

impl Gyro {
    pub fn new(pool: &PoolState, tokens: &UserFacingTokenList) -> Result<Self, QueryError> {
        Ok(Self {
            reserves: Reserves::new(tokens)?,
            total_supply: Bfp::from_wei(pool.total_shares),
        })
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
        self.reserves.proportional_in(self.total_supply, bpt_out)
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
        self.reserves.proportional_out(self.total_supply, bpt_in)
    }

    fn remove_recovery(&self, _: U256) -> Result<Vec<U256>, Error> {
        Err(Error::UnhandledExitKind)
    }
}
