//! Port of Balancer's `LogExpMath` library. Arguments and results are 18
//! decimal fixed point numbers, intermediate values use 20 and 36 decimals.
//! Signed integer semantics (truncating division) are reproduced with
//! `BigInt`.

use {
    super::Error,
    alloy::primitives::U256,
    num::{BigInt, Zero},
    number::conversions::{big_int_to_u256, u256_to_big_int},
    std::sync::LazyLock,
};

fn int(s: &str) -> BigInt {
    s.parse().expect("valid integer literal")
}

static ONE_18: LazyLock<BigInt> = LazyLock::new(|| BigInt::from(10).pow(18));
static ONE_20: LazyLock<BigInt> = LazyLock::new(|| BigInt::from(10).pow(20));
static ONE_36: LazyLock<BigInt> = LazyLock::new(|| BigInt::from(10).pow(36));

static MAX_NATURAL_EXPONENT: LazyLock<BigInt> = LazyLock::new(|| &*ONE_18 * 130);
static MIN_NATURAL_EXPONENT: LazyLock<BigInt> = LazyLock::new(|| &*ONE_18 * -41);

static LN_36_LOWER_BOUND: LazyLock<BigInt> =
    LazyLock::new(|| &*ONE_18 - BigInt::from(10).pow(17));
static LN_36_UPPER_BOUND: LazyLock<BigInt> =
    LazyLock::new(|| &*ONE_18 + BigInt::from(10).pow(17));

static MILD_EXPONENT_BOUND: LazyLock<BigInt> =
    LazyLock::new(|| BigInt::from(2).pow(254) / &*ONE_20);

// 18 decimal constants, the `a` values carry no decimals.
static X0: LazyLock<BigInt> = LazyLock::new(|| int("128000000000000000000")); // 2^7
static A0: LazyLock<BigInt> =
    LazyLock::new(|| int("38877084059945950922200000000000000000000000000000000000")); // e^(x0)
static X1: LazyLock<BigInt> = LazyLock::new(|| int("64000000000000000000")); // 2^6
static A1: LazyLock<BigInt> = LazyLock::new(|| int("6235149080811616882910000000")); // e^(x1)

// 20 decimal constants.
static X2: LazyLock<BigInt> = LazyLock::new(|| int("3200000000000000000000")); // 2^5
static A2: LazyLock<BigInt> = LazyLock::new(|| int("7896296018268069516100000000000000")); // e^(x2)
static X3: LazyLock<BigInt> = LazyLock::new(|| int("1600000000000000000000")); // 2^4
static A3: LazyLock<BigInt> = LazyLock::new(|| int("888611052050787263676000000")); // e^(x3)
static X4: LazyLock<BigInt> = LazyLock::new(|| int("800000000000000000000")); // 2^3
static A4: LazyLock<BigInt> = LazyLock::new(|| int("298095798704172827474000")); // e^(x4)
static X5: LazyLock<BigInt> = LazyLock::new(|| int("400000000000000000000")); // 2^2
static A5: LazyLock<BigInt> = LazyLock::new(|| int("5459815003314423907810")); // e^(x5)
static X6: LazyLock<BigInt> = LazyLock::new(|| int("200000000000000000000")); // 2^1
static A6: LazyLock<BigInt> = LazyLock::new(|| int("738905609893065022723")); // e^(x6)
static X7: LazyLock<BigInt> = LazyLock::new(|| int("100000000000000000000")); // 2^0
static A7: LazyLock<BigInt> = LazyLock::new(|| int("271828182845904523536")); // e^(x7)
static X8: LazyLock<BigInt> = LazyLock::new(|| int("50000000000000000000")); // 2^-1
static A8: LazyLock<BigInt> = LazyLock::new(|| int("164872127070012814685")); // e^(x8)
static X9: LazyLock<BigInt> = LazyLock::new(|| int("25000000000000000000")); // 2^-2
static A9: LazyLock<BigInt> = LazyLock::new(|| int("128402541668774148407")); // e^(x9)
static X10: LazyLock<BigInt> = LazyLock::new(|| int("12500000000000000000")); // 2^-3
static A10: LazyLock<BigInt> = LazyLock::new(|| int("113314845306682631683")); // e^(x10)
static X11: LazyLock<BigInt> = LazyLock::new(|| int("6250000000000000000")); // 2^-4
static A11: LazyLock<BigInt> = LazyLock::new(|| int("106449445891785942956")); // e^(x11)

/// `x^y` for 18 decimal fixed point `x` and `y`.
pub fn pow(x: U256, y: U256) -> Result<U256, Error> {
    if y.is_zero() {
        return Ok(U256::from(1_000_000_000_000_000_000u64));
    }
    if x.is_zero() {
        return Ok(U256::ZERO);
    }
    if x.bit(255) {
        return Err(Error::XOutOfBounds);
    }
    let x = u256_to_big_int(&x);
    let y = u256_to_big_int(&y);
    if y >= *MILD_EXPONENT_BOUND {
        return Err(Error::YOutOfBounds);
    }

    let logx_times_y = if *LN_36_LOWER_BOUND < x && x < *LN_36_UPPER_BOUND {
        let ln_36_x = ln_36(x);
        // Split to keep the precision of the 36 decimal logarithm without
        // overflowing.
        (&ln_36_x / &*ONE_18) * &y + ((&ln_36_x % &*ONE_18) * &y) / &*ONE_18
    } else {
        ln_unchecked(x) * &y
    };
    let logx_times_y = logx_times_y / &*ONE_18;

    if logx_times_y < *MIN_NATURAL_EXPONENT || logx_times_y > *MAX_NATURAL_EXPONENT {
        return Err(Error::ProductOutOfBounds);
    }
    big_int_to_u256(&exp(logx_times_y)?).map_err(|_| Error::ProductOutOfBounds)
}

/// Natural exponentiation `e^x` for a signed 18 decimal fixed point `x`.
pub fn exp(x: BigInt) -> Result<BigInt, Error> {
    if x < *MIN_NATURAL_EXPONENT || x > *MAX_NATURAL_EXPONENT {
        return Err(Error::InvalidExponent);
    }
    if x < BigInt::zero() {
        return Ok((&*ONE_18 * &*ONE_18) / exp(-x)?);
    }

    let mut x = x;
    let first_an = if x >= *X0 {
        x -= &*X0;
        A0.clone()
    } else if x >= *X1 {
        x -= &*X1;
        A1.clone()
    } else {
        BigInt::from(1)
    };

    x *= 100;

    let mut product = ONE_20.clone();
    for (xn, an) in [
        (&*X2, &*A2),
        (&*X3, &*A3),
        (&*X4, &*A4),
        (&*X5, &*A5),
        (&*X6, &*A6),
        (&*X7, &*A7),
        (&*X8, &*A8),
        (&*X9, &*A9),
    ] {
        if x >= *xn {
            x -= xn;
            product = (product * an) / &*ONE_20;
        }
    }

    // Taylor series up to the twelfth term.
    let mut series_sum = ONE_20.clone();
    let mut term = x.clone();
    series_sum += &term;
    for i in 2..=12 {
        term = ((term * &x) / &*ONE_20) / i;
        series_sum += &term;
    }

    Ok((((product * series_sum) / &*ONE_20) * first_an) / 100)
}

/// Natural logarithm of a strictly positive 18 decimal fixed point `a`.
pub fn ln(a: BigInt) -> Result<BigInt, Error> {
    if a <= BigInt::zero() {
        return Err(Error::XOutOfBounds);
    }
    if *LN_36_LOWER_BOUND < a && a < *LN_36_UPPER_BOUND {
        Ok(ln_36(a) / &*ONE_18)
    } else {
        Ok(ln_unchecked(a))
    }
}

fn ln_unchecked(a: BigInt) -> BigInt {
    if a < *ONE_18 {
        // ln(a) = -ln(1/a), keeps the argument above one.
        return -ln_unchecked((&*ONE_18 * &*ONE_18) / a);
    }

    let mut a = a;
    let mut sum = BigInt::zero();
    if a >= &*A0 * &*ONE_18 {
        a /= &*A0;
        sum += &*X0;
    }
    if a >= &*A1 * &*ONE_18 {
        a /= &*A1;
        sum += &*X1;
    }

    sum *= 100;
    a *= 100;

    for (xn, an) in [
        (&*X2, &*A2),
        (&*X3, &*A3),
        (&*X4, &*A4),
        (&*X5, &*A5),
        (&*X6, &*A6),
        (&*X7, &*A7),
        (&*X8, &*A8),
        (&*X9, &*A9),
        (&*X10, &*A10),
        (&*X11, &*A11),
    ] {
        if a >= *an {
            a = (a * &*ONE_20) / an;
            sum += xn;
        }
    }

    // ln(a) = 2 * artanh(z) with z = (a - 1) / (a + 1).
    let z = ((&a - &*ONE_20) * &*ONE_20) / (&a + &*ONE_20);
    let z_squared = (&z * &z) / &*ONE_20;
    let mut num = z.clone();
    let mut series_sum = num.clone();
    for denominator in [3, 5, 7, 9, 11] {
        num = (num * &z_squared) / &*ONE_20;
        series_sum += &num / denominator;
    }
    series_sum *= 2;

    (sum + series_sum) / 100
}

/// High precision logarithm for arguments close to one. Returns 36
/// decimals.
fn ln_36(x: BigInt) -> BigInt {
    let x = x * &*ONE_18;
    let z = ((&x - &*ONE_36) * &*ONE_36) / (&x + &*ONE_36);
    let z_squared = (&z * &z) / &*ONE_36;
    let mut num = z.clone();
    let mut series_sum = num.clone();
    for denominator in [3, 5, 7, 9, 11, 13, 15] {
        num = (num * &z_squared) / &*ONE_36;
        series_sum += &num / denominator;
    }
    series_sum * 2
}
