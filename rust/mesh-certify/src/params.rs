//! Exact rational constants that define the trigonometric sum.

use num_bigint::BigInt;
use num_rational::BigRational;

/// K0 = 7137/2000
pub const K0: (i64, i64) = (7137, 2000);

/// α0 = 198074929/50000000
pub const ALPHA0: (i64, i64) = (198_074_929, 50_000_000);

/// Default target bound 1.709176398 = 1709176398 / 10^9.
pub const TARGET_BOUND: (i64, i64) = (1_709_176_398, 1_000_000_000);

/// The two exact constants of the problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactParameters {
    pub k0: BigRational,
    pub alpha0: BigRational,
}

fn ratio((num, den): (i64, i64)) -> BigRational {
    BigRational::new(BigInt::from(num), BigInt::from(den))
}

/// Build K0 and α0 from their fixed fractions. Every worker calls this
/// itself instead of receiving the values.
pub fn exact_parameters() -> ExactParameters {
    ExactParameters {
        k0: ratio(K0),
        alpha0: ratio(ALPHA0),
    }
}

pub fn default_target() -> BigRational {
    ratio(TARGET_BOUND)
}
