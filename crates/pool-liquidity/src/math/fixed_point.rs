//! Fixed point numbers with exactly 18 decimals as used by the Balancer
//! `FixedPoint` library. All operations are checked and round in the
//! direction their name says.

use {
    super::{Error, log_exp},
    alloy::primitives::U256,
    anyhow::{Context, Result},
    bigdecimal::BigDecimal,
    number::conversions::{big_int_to_u256, u256_to_big_int},
    std::{
        fmt::{self, Debug, Display, Formatter},
        str::FromStr,
    },
};

const ONE_18: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);
const TWO_18: U256 = U256::from_limbs([2_000_000_000_000_000_000, 0, 0, 0]);
const FOUR_18: U256 = U256::from_limbs([4_000_000_000_000_000_000, 0, 0, 0]);
/// Maximum relative error of `LogExpMath.pow`, 1e-14 in fixed point.
const MAX_POW_RELATIVE_ERROR: U256 = U256::from_limbs([10_000, 0, 0, 0]);

/// Balancer fixed point number. The wrapped integer is the value multiplied
/// by 1e18.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Bfp(U256);

impl Bfp {
    pub const fn zero() -> Self {
        Self(U256::ZERO)
    }

    pub const fn one() -> Self {
        Self(ONE_18)
    }

    /// `10^exp` as a fixed point number.
    pub fn exp10(exp: u8) -> Result<Self, Error> {
        let factor = U256::from(10)
            .checked_pow(U256::from(exp))
            .ok_or(Error::MulOverflow)?;
        Ok(Self(ONE_18.checked_mul(factor).ok_or(Error::MulOverflow)?))
    }

    pub const fn from_wei(num: U256) -> Self {
        Self(num)
    }

    pub const fn as_uint256(self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn add(self, other: Self) -> Result<Self, Error> {
        Ok(Self(super::add(self.0, other.0)?))
    }

    pub fn sub(self, other: Self) -> Result<Self, Error> {
        Ok(Self(super::sub(self.0, other.0)?))
    }

    pub fn mul_down(self, other: Self) -> Result<Self, Error> {
        Ok(Self(super::mul(self.0, other.0)? / ONE_18))
    }

    pub fn mul_up(self, other: Self) -> Result<Self, Error> {
        let product = super::mul(self.0, other.0)?;
        if product.is_zero() {
            return Ok(Self::zero());
        }
        Ok(Self(U256::from(1) + (product - U256::from(1)) / ONE_18))
    }

    pub fn div_down(self, other: Self) -> Result<Self, Error> {
        if other.is_zero() {
            return Err(Error::ZeroDivision);
        }
        let scaled = self.0.checked_mul(ONE_18).ok_or(Error::DivInternal)?;
        Ok(Self(scaled / other.0))
    }

    pub fn div_up(self, other: Self) -> Result<Self, Error> {
        if other.is_zero() {
            return Err(Error::ZeroDivision);
        }
        if self.is_zero() {
            return Ok(Self::zero());
        }
        let scaled = self.0.checked_mul(ONE_18).ok_or(Error::DivInternal)?;
        Ok(Self(U256::from(1) + (scaled - U256::from(1)) / other.0))
    }

    /// `1 - self`, saturating at zero.
    pub fn complement(self) -> Self {
        Self(ONE_18.saturating_sub(self.0))
    }

    pub fn pow_down(self, exp: Self) -> Result<Self, Error> {
        if exp.0 == ONE_18 {
            Ok(self)
        } else if exp.0 == TWO_18 {
            self.mul_down(self)
        } else if exp.0 == FOUR_18 {
            let square = self.mul_down(self)?;
            square.mul_down(square)
        } else {
            let raw = Self(log_exp::pow(self.0, exp.0)?);
            let max_error = raw.max_pow_error()?;
            if raw < max_error {
                Ok(Self::zero())
            } else {
                raw.sub(max_error)
            }
        }
    }

    pub fn pow_up(self, exp: Self) -> Result<Self, Error> {
        if exp.0 == ONE_18 {
            Ok(self)
        } else if exp.0 == TWO_18 {
            self.mul_up(self)
        } else if exp.0 == FOUR_18 {
            let square = self.mul_up(self)?;
            square.mul_up(square)
        } else {
            let raw = Self(log_exp::pow(self.0, exp.0)?);
            raw.add(raw.max_pow_error()?)
        }
    }

    fn max_pow_error(self) -> Result<Self, Error> {
        self.mul_up(Self(MAX_POW_RELATIVE_ERROR))?
            .add(Self(U256::from(1)))
    }

    fn to_decimal(self) -> BigDecimal {
        BigDecimal::new(u256_to_big_int(&self.0), 18)
    }
}

impl FromStr for Bfp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let decimal = BigDecimal::from_str(s).context("invalid fixed point number")?;
        let (int, exponent) = decimal.with_scale(18).as_bigint_and_exponent();
        debug_assert_eq!(exponent, 18);
        Ok(Self(big_int_to_u256(&int)?))
    }
}

impl Display for Bfp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&self.to_decimal().normalized(), f)
    }
}

impl Debug for Bfp {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bfp(s: &str) -> Bfp {
        s.parse().unwrap()
    }

    #[test]
    fn parsing() {
        assert_eq!(bfp("1"), Bfp::one());
        assert_eq!(bfp("0.5").as_uint256(), U256::from(500_000_000_000_000_000u64));
        assert_eq!(bfp("0.000000000000000001").as_uint256(), U256::from(1));
        assert!("-1".parse::<Bfp>().is_err());
        assert!("one".parse::<Bfp>().is_err());
    }

    #[test]
    fn display() {
        assert_eq!(bfp("0.25").to_string(), "0.25");
        assert_eq!(Bfp::exp10(2).unwrap().to_string(), "100");
    }

    #[test]
    fn multiplication_rounding() {
        let third = Bfp::one().div_down(bfp("3")).unwrap();
        assert_eq!(third.as_uint256(), U256::from(333_333_333_333_333_333u64));
        let third_up = Bfp::one().div_up(bfp("3")).unwrap();
        assert_eq!(third_up.as_uint256(), U256::from(333_333_333_333_333_334u64));

        let tiny = Bfp::from_wei(U256::from(1));
        assert_eq!(tiny.mul_down(tiny).unwrap(), Bfp::zero());
        assert_eq!(tiny.mul_up(tiny).unwrap(), tiny);
        assert_eq!(Bfp::zero().mul_up(tiny).unwrap(), Bfp::zero());
    }

    #[test]
    fn division_errors() {
        assert_eq!(Bfp::one().div_down(Bfp::zero()), Err(Error::ZeroDivision));
        assert_eq!(Bfp::one().div_up(Bfp::zero()), Err(Error::ZeroDivision));
        assert_eq!(
            Bfp::from_wei(U256::MAX).div_down(Bfp::one()),
            Err(Error::DivInternal)
        );
    }

    #[test]
    fn complement() {
        assert_eq!(bfp("0.3").complement(), bfp("0.7"));
        assert_eq!(bfp("2").complement(), Bfp::zero());
    }

    #[test]
    fn checked_add_sub() {
        assert_eq!(Bfp::zero().sub(Bfp::one()), Err(Error::SubOverflow));
        assert_eq!(
            Bfp::from_wei(U256::MAX).add(Bfp::one()),
            Err(Error::AddOverflow)
        );
    }

    #[test]
    fn pow_special_cases() {
        let x = bfp("1.5");
        assert_eq!(x.pow_down(bfp("1")).unwrap(), x);
        assert_eq!(x.pow_down(bfp("2")).unwrap(), bfp("2.25"));
        assert_eq!(x.pow_up(bfp("4")).unwrap(), bfp("5.0625"));
    }

    #[test]
    fn pow_brackets_exact_result() {
        // 4^0.5 = 2
        let down = bfp("4").pow_down(bfp("0.5")).unwrap();
        let up = bfp("4").pow_up(bfp("0.5")).unwrap();
        assert!(down <= bfp("2"));
        assert!(up >= bfp("2"));
        assert!(up.sub(down).unwrap() < bfp("0.000000000001"));
    }
}
