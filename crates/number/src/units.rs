//! Conversions between raw token amounts (base units) and their human
//! readable decimal representation.

use {
    crate::conversions::{big_int_to_u256, u256_to_big_int},
    alloy::primitives::U256,
    anyhow::{Result, ensure},
    bigdecimal::BigDecimal,
    num::{BigInt, Signed},
};

/// Returns the human readable amount for `raw` base units of a token with
/// the specified number of decimals.
pub fn from_raw(raw: &U256, decimals: u8) -> BigDecimal {
    BigDecimal::new(u256_to_big_int(raw), i64::from(decimals))
}

/// Converts a human readable amount into base units, truncating any
/// precision the token cannot represent.
pub fn to_raw_truncating(amount: &BigDecimal, decimals: u8) -> Result<U256> {
    ensure!(!amount.is_negative(), "negative token amount {amount}");
    let (int, exponent) = amount.as_bigint_and_exponent();
    let shift = i64::from(decimals) - exponent;
    let raw = if shift >= 0 {
        int * BigInt::from(10u8).pow(u32::try_from(shift)?)
    } else {
        int / BigInt::from(10u8).pow(u32::try_from(-shift)?)
    };
    big_int_to_u256(&raw)
}

#[cfg(test)]
mod tests {
    use {super::*, std::str::FromStr};

    #[test]
    fn human_amounts_round_trip() {
        let raw = U256::from(1_500_000_000_000_000_000u128);
        let human = from_raw(&raw, 18);
        assert_eq!(human, BigDecimal::from_str("1.5").unwrap());
        assert_eq!(to_raw_truncating(&human, 18).unwrap(), raw);
    }

    #[test]
    fn truncates_excess_precision() {
        let human = BigDecimal::from_str("1.2345678").unwrap();
        assert_eq!(to_raw_truncating(&human, 6).unwrap(), U256::from(1_234_567u64));
    }

    #[test]
    fn rejects_negative_amounts() {
        let human = BigDecimal::from_str("-1").unwrap();
        assert!(to_raw_truncating(&human, 18).is_err());
    }
}
