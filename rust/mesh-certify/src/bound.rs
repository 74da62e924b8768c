//! Scalar upper bounds and fixed-significant-digit decimal formatting.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// A non-negative dyadic number `ulps · 2^-bits`, guaranteed to be at least
/// the magnitude it bounds. Ordering is exact across precisions.
#[derive(Debug, Clone)]
pub struct UpperBound {
    ulps: BigUint,
    bits: u32,
}

impl UpperBound {
    /// Bound of `ulps · 2^-bits`.
    pub fn from_ulps(ulps: BigUint, bits: u32) -> Self {
        Self { ulps, bits }
    }

    /// Numerator over `2^bits`.
    pub fn ulps(&self) -> &BigUint {
        &self.ulps
    }

    /// Binary precision the bound was produced at.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Exact value as a rational.
    pub fn to_rational(&self) -> BigRational {
        BigRational::new(BigInt::from(self.ulps.clone()), BigInt::one() << self.bits)
    }

    /// Nearest `f64`, for logging and tests.
    pub fn to_f64(&self) -> f64 {
        let shift = (self.ulps.bits() as u32).saturating_sub(64).min(self.bits);
        let head = (&self.ulps >> shift).to_f64().unwrap_or(f64::INFINITY);
        head * 2f64.powi(shift as i32 - self.bits as i32)
    }

    /// `true` when this bound proves `|x| <= target`.
    pub fn certifies(&self, target: &BigRational) -> bool {
        self.to_rational() <= *target
    }

    /// Decimal rendering with `digits` significant digits.
    pub fn to_decimal(&self, digits: usize) -> String {
        format_significant(&self.to_rational(), digits)
    }
}

impl Ord for UpperBound {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.bits == other.bits {
            return self.ulps.cmp(&other.ulps);
        }
        let bits = self.bits.max(other.bits);
        let a = &self.ulps << (bits - self.bits);
        let b = &other.ulps << (bits - other.bits);
        a.cmp(&b)
    }
}

impl PartialOrd for UpperBound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for UpperBound {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for UpperBound {}

impl fmt::Display for UpperBound {
    /// `{}` prints 25 significant digits, `{:.N}` prints N.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = f.precision().unwrap_or(25);
        f.write_str(&self.to_decimal(digits))
    }
}

fn pow10(exp: i64) -> BigRational {
    let p = num_traits::pow(BigInt::from(10), exp.unsigned_abs() as usize);
    if exp >= 0 {
        BigRational::from_integer(p)
    } else {
        BigRational::new(BigInt::one(), p)
    }
}

/// Round `value` to `digits` significant decimal digits (half away from zero).
///
/// Positional notation for decimal exponents in `[-5, digits)`, otherwise
/// scientific, e.g. `1.709159249919439752526620`, `0.00001234`, `3.12e-51`.
pub fn format_significant(value: &BigRational, digits: usize) -> String {
    let digits = digits.max(1);
    if value.is_zero() {
        return "0".to_string();
    }
    let negative = value.is_negative();
    let v = value.abs();

    // floor(log10 v), estimated from bit lengths then corrected
    let bit_gap = v.numer().bits() as i64 - v.denom().bits() as i64;
    let mut exp10 = (bit_gap as f64 * std::f64::consts::LOG10_2).floor() as i64;
    while pow10(exp10) > v {
        exp10 -= 1;
    }
    while pow10(exp10 + 1) <= v {
        exp10 += 1;
    }

    let half = BigRational::new(BigInt::one(), BigInt::from(2));
    let scaled = &v * pow10(digits as i64 - 1 - exp10);
    let mut mantissa = (scaled + half).floor().to_integer();
    let limit = num_traits::pow(BigInt::from(10), digits);
    if mantissa >= limit {
        mantissa /= 10;
        exp10 += 1;
    }
    let s = mantissa.to_string();

    let body = if (-5..digits as i64).contains(&exp10) {
        if exp10 >= 0 {
            let (int, frac) = s.split_at(exp10 as usize + 1);
            if frac.is_empty() {
                int.to_string()
            } else {
                format!("{}.{}", int, frac)
            }
        } else {
            format!("0.{}{}", "0".repeat((-exp10 - 1) as usize), s)
        }
    } else {
        let (lead, rest) = s.split_at(1);
        if rest.is_empty() {
            format!("{}e{}", lead, exp10)
        } else {
            format!("{}.{}e{}", lead, rest, exp10)
        }
    };

    if negative {
        format!("-{}", body)
    } else {
        body
    }
}
