//! Fixed point math reproducing the arithmetic of the Balancer pool
//! contracts bit for bit, rounding direction included.

use alloy::primitives::U256;

pub mod base_pool;
pub mod fixed_point;
pub mod log_exp;
pub mod stable;
pub mod weighted;

/// Errors mirroring the reverts of the Balancer contracts. Where the
/// contracts use a `BAL#` code the message carries it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("BAL#000 addition overflow")]
    AddOverflow,
    #[error("BAL#001 subtraction overflow")]
    SubOverflow,
    #[error("BAL#003 multiplication overflow")]
    MulOverflow,
    #[error("BAL#004 division by zero")]
    ZeroDivision,
    #[error("BAL#005 internal division error")]
    DivInternal,
    #[error("BAL#006 x out of bounds")]
    XOutOfBounds,
    #[error("BAL#007 y out of bounds")]
    YOutOfBounds,
    #[error("BAL#008 product out of bounds")]
    ProductOutOfBounds,
    #[error("BAL#009 invalid exponent")]
    InvalidExponent,
    #[error("BAL#306 min BPT in for token out")]
    MinBptInForTokenOut,
    #[error("BAL#307 max out BPT for token in")]
    MaxOutBptForTokenIn,
    #[error("BAL#310 unhandled join kind")]
    UnhandledJoinKind,
    #[error("BAL#311 zero invariant")]
    ZeroInvariant,
    #[error("BAL#321 stable invariant didn't converge")]
    StableInvariantDidntConverge,
    #[error("BAL#322 stable get balance didn't converge")]
    StableGetBalanceDidntConverge,
    #[error("unhandled exit kind")]
    UnhandledExitKind,
    #[error("invariant ratio {0} above the pool maximum")]
    InvariantRatioAboveMax(U256),
    #[error("invariant ratio {0} below the pool minimum")]
    InvariantRatioBelowMin(U256),
    #[error("token index {0} out of range")]
    InvalidToken(usize),
    #[error("token index {0} has a zero balance")]
    ZeroBalance(usize),
}

/// Rounding direction requested from invariant computations.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Rounding {
    RoundDown,
    RoundUp,
}

// Integer (non fixed point) helpers matching `Math.sol`.

pub(crate) fn add(a: U256, b: U256) -> Result<U256, Error> {
    a.checked_add(b).ok_or(Error::AddOverflow)
}

pub(crate) fn sub(a: U256, b: U256) -> Result<U256, Error> {
    a.checked_sub(b).ok_or(Error::SubOverflow)
}

pub(crate) fn mul(a: U256, b: U256) -> Result<U256, Error> {
    a.checked_mul(b).ok_or(Error::MulOverflow)
}

pub(crate) fn div_down(a: U256, b: U256) -> Result<U256, Error> {
    a.checked_div(b).ok_or(Error::ZeroDivision)
}

pub(crate) fn div_up(a: U256, b: U256) -> Result<U256, Error> {
    if b.is_zero() {
        return Err(Error::ZeroDivision);
    }
    if a.is_zero() {
        return Ok(U256::ZERO);
    }
    Ok(U256::from(1) + (a - U256::from(1)) / b)
}

/// `ceil(a * b / c)` with the product checked for overflow.
pub(crate) fn mul_div_up(a: U256, b: U256, c: U256) -> Result<U256, Error> {
    div_up(mul(a, b)?, c)
}
