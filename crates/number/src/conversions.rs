use {
    alloy::primitives::U256,
    anyhow::{Result, ensure},
    bigdecimal::BigDecimal,
    num::{BigInt, BigRational, BigUint, Signed, bigint::Sign},
};

pub fn u256_to_big_uint(input: &U256) -> BigUint {
    BigUint::from_bytes_be(&input.to_be_bytes::<32>())
}

pub fn u256_to_big_int(input: &U256) -> BigInt {
    BigInt::from_biguint(Sign::Plus, u256_to_big_uint(input))
}

pub fn u256_to_big_rational(input: &U256) -> BigRational {
    BigRational::new(u256_to_big_int(input), 1.into())
}

pub fn big_uint_to_u256(input: &BigUint) -> Result<U256> {
    let bytes = input.to_bytes_be();
    ensure!(bytes.len() <= 32, "too large");
    Ok(U256::from_be_slice(&bytes))
}

pub fn big_int_to_u256(input: &BigInt) -> Result<U256> {
    ensure!(!input.is_negative(), "negative");
    big_uint_to_u256(input.magnitude())
}

/// Converts a non-negative decimal without a fractional part into a `U256`.
pub fn big_decimal_to_u256(input: &BigDecimal) -> Result<U256> {
    ensure!(input.is_integer(), "not an integer");
    let (int, exp) = input.as_bigint_and_exponent();
    let scaled = if exp <= 0 {
        int * BigInt::from(10u8).pow(u32::try_from(-exp)?)
    } else {
        int / BigInt::from(10u8).pow(u32::try_from(exp)?)
    };
    big_int_to_u256(&scaled)
}

pub fn u256_to_big_decimal(input: &U256) -> BigDecimal {
    BigDecimal::new(u256_to_big_int(input), 0)
}

/// Converts a `BigDecimal` value to an exact `BigRational`.
pub fn big_decimal_to_big_rational(input: &BigDecimal) -> BigRational {
    let (int, exp) = input.as_bigint_and_exponent();
    let factor = BigInt::from(10u8).pow(u32::try_from(exp.unsigned_abs()).unwrap_or(u32::MAX));
    if exp >= 0 {
        BigRational::new(int, factor)
    } else {
        BigRational::new(int * factor, 1.into())
    }
}

/// Decimal expansion of a rational, exact for terminating fractions.
pub fn big_rational_to_big_decimal(input: &BigRational) -> BigDecimal {
    let numer = BigDecimal::from(input.numer().clone());
    let denom = BigDecimal::from(input.denom().clone());
    (numer / denom).normalized()
}

/// Floors a non-negative rational into a `U256`.
pub fn big_rational_floor_to_u256(input: &BigRational) -> Result<U256> {
    ensure!(!input.is_negative(), "negative");
    big_int_to_u256(&input.floor().to_integer())
}

/// Ceils a non-negative rational into a `U256`.
pub fn big_rational_ceil_to_u256(input: &BigRational) -> Result<U256> {
    ensure!(!input.is_negative(), "negative");
    big_int_to_u256(&input.ceil().to_integer())
}
