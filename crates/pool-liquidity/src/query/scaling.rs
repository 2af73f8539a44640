//! Conversions between raw token amounts and the 18 decimal, rate adjusted
//! amounts the pool math operates on.

use {
    crate::{
        domain::PoolToken,
        math::{Error, fixed_point::Bfp},
    },
    alloy::primitives::U256,
};

fn decimals_difference(token: &PoolToken) -> Result<u8, Error> {
    18_u8.checked_sub(token.decimals).ok_or(Error::SubOverflow)
}

/// V2 scaling factor `10^(18 - decimals) * rate` as a fixed point number.
pub fn v2_scaling_factor(token: &PoolToken) -> Result<Bfp, Error> {
    Bfp::exp10(decimals_difference(token)?)?.mul_down(token.price_rate)
}

/// V2 `_upscale`, rounds down.
pub fn upscale(amount: U256, scaling_factor: Bfp) -> Result<Bfp, Error> {
    Bfp::from_wei(amount).mul_down(scaling_factor)
}

/// V2 `_downscaleUp`, used for amounts the pool receives.
pub fn downscale_up(amount: Bfp, scaling_factor: Bfp) -> Result<U256, Error> {
    Ok(amount.div_up(scaling_factor)?.as_uint256())
}

/// V2 `_downscaleDown`, used for amounts the pool pays out.
pub fn downscale_down(amount: Bfp, scaling_factor: Bfp) -> Result<U256, Error> {
    Ok(amount.div_down(scaling_factor)?.as_uint256())
}

/// V3 integer scaling factor `10^(18 - decimals)`.
pub fn v3_scaling_factor(token: &PoolToken) -> Result<U256, Error> {
    U256::from(10)
        .checked_pow(U256::from(decimals_difference(token)?))
        .ok_or(Error::MulOverflow)
}

pub fn to_scaled18_apply_rate_round_down(
    amount: U256,
    scaling_factor: U256,
    rate: Bfp,
) -> Result<U256, Error> {
    Ok(Bfp::from_wei(crate::math::mul(amount, scaling_factor)?)
        .mul_down(rate)?
        .as_uint256())
}

pub fn to_scaled18_apply_rate_round_up(
    amount: U256,
    scaling_factor: U256,
    rate: Bfp,
) -> Result<U256, Error> {
    Ok(Bfp::from_wei(crate::math::mul(amount, scaling_factor)?)
        .mul_up(rate)?
        .as_uint256())
}

pub fn to_raw_undo_rate_round_down(
    amount: U256,
    scaling_factor: U256,
    rate: Bfp,
) -> Result<U256, Error> {
    let divisor = Bfp::from_wei(crate::math::mul(scaling_factor, rate.as_uint256())?);
    Ok(Bfp::from_wei(amount).div_down(divisor)?.as_uint256())
}

pub fn to_raw_undo_rate_round_up(
    amount: U256,
    scaling_factor: U256,
    rate: Bfp,
) -> Result<U256, Error> {
    let divisor = Bfp::from_wei(crate::math::mul(scaling_factor, rate.as_uint256())?);
    Ok(Bfp::from_wei(amount).div_up(divisor)?.as_uint256())
}
