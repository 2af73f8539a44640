//! Turns expected amounts into the worst case amounts a caller accepts.
//!
//! Minimums round down and maximums round up so that a bound is never
//! tighter than the exact rational result.

use {
    crate::domain::{
        AddLiquidityBoundedOutput,
        AddLiquidityQueryOutput,
        RemoveLiquidityBoundedOutput,
        RemoveLiquidityQueryOutput,
        TokenAmount,
    },
    alloy::primitives::U256,
    bigdecimal::BigDecimal,
    num::{BigRational, One, Signed, Zero},
    std::{fmt, str::FromStr},
    tracing::debug,
};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SlippageError {
    #[error("slippage {0} is outside of [0%, 100%]")]
    OutOfRange(String),
    #[error("invalid slippage percentage {0:?}")]
    Parse(String),
    #[error("bounded amount does not fit 256 bits")]
    Overflow,
}

/// A relative slippage tolerance, stored as an exact fraction in `[0, 1]`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Slippage(BigRational);

impl Slippage {
    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    /// Creates a tolerance from a percentage, `1` meaning 1%.
    pub fn from_percent(percent: &BigDecimal) -> Result<Self, SlippageError> {
        let percent = number::conversions::big_decimal_to_big_rational(percent);
        Self::from_fraction(percent / hundred())
    }

    /// Creates a tolerance from basis points, `100` meaning 1%.
    pub fn from_bps(bps: u32) -> Result<Self, SlippageError> {
        Self::from_fraction(BigRational::new(bps.into(), 10_000.into()))
    }

    fn from_fraction(fraction: BigRational) -> Result<Self, SlippageError> {
        if fraction.is_negative() || fraction > BigRational::one() {
            return Err(SlippageError::OutOfRange(format!(
                "{}%",
                number::conversions::big_rational_to_big_decimal(&(fraction * hundred()))
            )));
        }
        Ok(Self(fraction))
    }

    pub fn as_fraction(&self) -> &BigRational {
        &self.0
    }

    /// `floor(amount * (1 - slippage))`
    pub fn min(&self, amount: U256) -> Result<U256, SlippageError> {
        let factor = BigRational::one() - &self.0;
        number::conversions::big_rational_floor_to_u256(&(scaled(amount) * factor))
            .map_err(|_| SlippageError::Overflow)
    }

    /// `ceil(amount * (1 + slippage))`
    pub fn max(&self, amount: U256) -> Result<U256, SlippageError> {
        let factor = BigRational::one() + &self.0;
        number::conversions::big_rational_ceil_to_u256(&(scaled(amount) * factor))
            .map_err(|_| SlippageError::Overflow)
    }

    fn min_amount(&self, amount: &TokenAmount) -> Result<TokenAmount, SlippageError> {
        Ok(TokenAmount::new(amount.token, self.min(amount.amount)?))
    }

    fn max_amount(&self, amount: &TokenAmount) -> Result<TokenAmount, SlippageError> {
        Ok(TokenAmount::new(amount.token, self.max(amount.amount)?))
    }
}

fn hundred() -> BigRational {
    BigRational::from_integer(100.into())
}

fn scaled(amount: U256) -> BigRational {
    number::conversions::u256_to_big_rational(&amount)
}

impl FromStr for Slippage {
    type Err = SlippageError;

    /// Parses a percentage such as `"0.5"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let percent = BigDecimal::from_str(s.trim()).map_err(|_| SlippageError::Parse(s.into()))?;
        Self::from_percent(&percent)
    }
}

impl fmt::Display for Slippage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let percent = number::conversions::big_rational_to_big_decimal(&(&self.0 * hundred()));
        write!(f, "{percent}%")
    }
}

/// Bounds an add liquidity query. Exact token adds bound the minted BPT,
/// exact BPT adds bound every token amount in.
pub fn apply_add(
    query: AddLiquidityQueryOutput,
    slippage: &Slippage,
) -> Result<AddLiquidityBoundedOutput, SlippageError> {
    let (max_amounts_in, min_bpt_out) = if query.kind.is_exact_in() {
        (query.amounts_in.clone(), slippage.min_amount(&query.bpt_out)?)
    } else {
        (
            query
                .amounts_in
                .iter()
                .map(|amount| slippage.max_amount(amount))
                .collect::<Result<_, _>>()?,
            query.bpt_out,
        )
    };
    debug!(
        %slippage,
        min_bpt_out = %min_bpt_out.amount,
        max_amounts_in = ?max_amounts_in.iter().map(|a| a.amount).collect::<Vec<_>>(),
        "bounded add liquidity"
    );
    Ok(AddLiquidityBoundedOutput {
        query,
        max_amounts_in,
        min_bpt_out,
    })
}

/// Bounds a remove liquidity query. Exact token removes bound the burnt
/// BPT, exact BPT removes bound every token amount out.
pub fn apply_remove(
    query: RemoveLiquidityQueryOutput,
    slippage: &Slippage,
) -> Result<RemoveLiquidityBoundedOutput, SlippageError> {
    let (min_amounts_out, max_bpt_in) = if query.kind.is_exact_out() {
        (query.amounts_out.clone(), slippage.max_amount(&query.bpt_in)?)
    } else {
        (
            query
                .amounts_out
                .iter()
                .map(|amount| slippage.min_amount(amount))
                .collect::<Result<_, _>>()?,
            query.bpt_in,
        )
    };
    debug!(
        %slippage,
        max_bpt_in = %max_bpt_in.amount,
        min_amounts_out = ?min_amounts_out.iter().map(|a| a.amount).collect::<Vec<_>>(),
        "bounded remove liquidity"
    );
    Ok(RemoveLiquidityBoundedOutput {
        query,
        min_amounts_out,
        max_bpt_in,
    })
}
