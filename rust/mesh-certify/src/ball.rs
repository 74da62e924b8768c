//! Real ball arithmetic on fixed-point big integers.
//!
//! A `Ball` at precision `p` bits stands for the closed interval
//! `[(mid - rad) / 2^p, (mid + rad) / 2^p]`. Centers are `BigInt`, radii are
//! `BigUint`, both counted in units of `2^-p` ("ulps"). Every operation that
//! has to round its center adds the rounding error to the radius, so the
//! result always contains the exact result of the operation applied to any
//! points of the operands.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};

use crate::error::ArithmeticError;

/// `ceil(x / 2^k)`.
pub(crate) fn ceil_shr(x: &BigUint, k: u32) -> BigUint {
    let q = x >> k;
    if (&q << k) == *x {
        q
    } else {
        q + 1u32
    }
}

/// True when `x` is not a multiple of `2^k`.
fn has_low_bits(x: &BigInt, k: u32) -> bool {
    match x.trailing_zeros() {
        Some(tz) => tz < k as u64,
        None => false,
    }
}

/// A real enclosure: center and radius in units of `2^-bits`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ball {
    mid: BigInt,
    rad: BigUint,
    bits: u32,
}

impl Ball {
    pub(crate) fn from_parts(mid: BigInt, rad: BigUint, bits: u32) -> Self {
        Self { mid, rad, bits }
    }

    /// Exact zero.
    pub fn zero(bits: u32) -> Self {
        Self::from_parts(BigInt::zero(), BigUint::zero(), bits)
    }

    /// Exact one.
    pub fn one(bits: u32) -> Self {
        Self::from_int(1, bits)
    }

    /// Exact ball for an integer.
    pub fn from_int<T: Into<BigInt>>(n: T, bits: u32) -> Self {
        Self::from_parts(n.into() << bits, BigUint::zero(), bits)
    }

    /// Ball for an exact rational. The center is rounded down and the radius
    /// is one ulp when the rational is not a multiple of `2^-bits`.
    pub fn from_rational(q: &BigRational, bits: u32) -> Self {
        let scaled = q.numer() << bits;
        let (mid, rem) = scaled.div_mod_floor(q.denom());
        let rad = if rem.is_zero() { BigUint::zero() } else { BigUint::one() };
        Self::from_parts(mid, rad, bits)
    }

    /// Binary precision `p`; one ulp is `2^-p`.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Center in ulps.
    pub fn mid_ulps(&self) -> &BigInt {
        &self.mid
    }

    /// Radius in ulps.
    pub fn rad_ulps(&self) -> &BigUint {
        &self.rad
    }

    /// Zero radius.
    pub fn is_exact(&self) -> bool {
        self.rad.is_zero()
    }

    /// Exactly zero, radius included.
    pub fn is_zero(&self) -> bool {
        self.mid.is_zero() && self.rad.is_zero()
    }

    /// Upper bound of `|x|` over the ball, in ulps.
    pub fn mag_upper_ulps(&self) -> BigUint {
        self.mid.magnitude() + &self.rad
    }

    /// Lower endpoint in ulps.
    pub(crate) fn lower_ulps(&self) -> BigInt {
        &self.mid - BigInt::from(self.rad.clone())
    }

    /// Upper endpoint in ulps.
    pub(crate) fn upper_ulps(&self) -> BigInt {
        &self.mid + BigInt::from(self.rad.clone())
    }

    fn scale(&self) -> BigInt {
        BigInt::one() << self.bits
    }

    /// Center as an exact rational.
    pub fn midpoint(&self) -> BigRational {
        BigRational::new(self.mid.clone(), self.scale())
    }

    /// Radius as an exact rational.
    pub fn radius(&self) -> BigRational {
        BigRational::new(BigInt::from(self.rad.clone()), self.scale())
    }

    /// Lower endpoint as an exact rational.
    pub fn lower(&self) -> BigRational {
        BigRational::new(self.lower_ulps(), self.scale())
    }

    /// Upper endpoint as an exact rational.
    pub fn upper(&self) -> BigRational {
        BigRational::new(self.upper_ulps(), self.scale())
    }

    /// True when `x` lies in the closed interval.
    pub fn contains(&self, x: &BigRational) -> bool {
        self.lower() <= *x && *x <= self.upper()
    }

    /// True when zero lies in the closed interval.
    pub fn contains_zero(&self) -> bool {
        *self.mid.magnitude() <= self.rad
    }

    /// True when the two balls share at least one point.
    pub fn overlaps(&self, other: &Ball) -> bool {
        debug_assert_eq!(self.bits, other.bits);
        self.lower_ulps() <= other.upper_ulps() && other.lower_ulps() <= self.upper_ulps()
    }

    /// Approximate center as `f64`, for diagnostics only.
    pub fn to_f64(&self) -> f64 {
        let shift = (self.mid.bits() as u32).saturating_sub(64).min(self.bits);
        let head = (&self.mid >> shift).to_f64().unwrap_or(f64::NAN);
        head * 2f64.powi(shift as i32 - self.bits as i32)
    }

    /// Widen the radius by `ulps`.
    pub(crate) fn add_error(&mut self, ulps: &BigUint) {
        self.rad += ulps;
    }

    /// Same ball expressed at a different precision.
    pub fn with_bits(&self, bits: u32) -> Ball {
        if bits >= self.bits {
            let shift = bits - self.bits;
            return Self::from_parts(&self.mid << shift, &self.rad << shift, bits);
        }
        let shift = self.bits - bits;
        let rounding = u32::from(has_low_bits(&self.mid, shift));
        Self::from_parts(&self.mid >> shift, ceil_shr(&self.rad, shift) + rounding, bits)
    }

    /// Multiplication by an exact integer. No rounding happens.
    pub fn mul_int<T: Into<BigInt>>(&self, k: T) -> Ball {
        let k = k.into();
        Self::from_parts(&self.mid * &k, &self.rad * k.magnitude(), self.bits)
    }

    /// Division by a positive integer.
    pub fn div_int(&self, k: u64) -> Ball {
        assert!(k > 0, "division of a ball by zero");
        let (mid, rem) = self.mid.div_mod_floor(&BigInt::from(k));
        let rounding = u32::from(!rem.is_zero());
        let rad = self.rad.div_ceil(&BigUint::from(k)) + rounding;
        Self::from_parts(mid, rad, self.bits)
    }

    /// Division by another ball. Fails when the divisor contains zero.
    pub fn checked_div(&self, divisor: &Ball) -> Result<Ball, ArithmeticError> {
        debug_assert_eq!(self.bits, divisor.bits);
        if divisor.contains_zero() {
            return Err(ArithmeticError::DivisorContainsZero);
        }
        let bits = self.bits;
        let (mid, rem) = (&self.mid << bits).div_mod_floor(&divisor.mid);
        let rounding = u32::from(!rem.is_zero());

        // |x/y - m1/m2| <= (|m1| r2 + |m2| r1) / (|m2| (|m2| - r2))
        let m1 = self.mid.magnitude();
        let m2 = divisor.mid.magnitude();
        let num = (m1 * &divisor.rad + m2 * &self.rad) << bits;
        let den = m2 * (m2 - &divisor.rad);
        let rad = num.div_ceil(&den) + rounding;
        Ok(Self::from_parts(mid, rad, bits))
    }

    /// `x·x`.
    pub fn square(&self) -> Ball {
        self * self
    }

    /// Integer power by square-and-multiply.
    pub fn pow(&self, exp: u32) -> Ball {
        let mut result = Ball::one(self.bits);
        let mut base = self.clone();
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                result = &result * &base;
            }
            e >>= 1;
            if e > 0 {
                base = base.square();
            }
        }
        result
    }

    /// Smallest ball at this precision containing both operands.
    pub fn hull(&self, other: &Ball) -> Ball {
        debug_assert_eq!(self.bits, other.bits);
        let lo = self.lower_ulps().min(other.lower_ulps());
        let hi = self.upper_ulps().max(other.upper_ulps());
        let mid = (&lo + &hi).div_floor(&BigInt::from(2));
        let rad = (&hi - &mid).magnitude().clone();
        Self::from_parts(mid, rad, self.bits)
    }

    /// Intersect with [-1, 1] when that is tighter. Used for sin and cos.
    pub(crate) fn clamp_unit(self) -> Ball {
        let one = BigUint::one() << self.bits;
        if self.rad > one {
            Self::from_parts(BigInt::zero(), one, self.bits)
        } else {
            self
        }
    }
}

impl<'a> Add<&'a Ball> for &'a Ball {
    type Output = Ball;

    fn add(self, other: &'a Ball) -> Ball {
        debug_assert_eq!(self.bits, other.bits);
        Ball::from_parts(&self.mid + &other.mid, &self.rad + &other.rad, self.bits)
    }
}

impl<'a> Sub<&'a Ball> for &'a Ball {
    type Output = Ball;

    fn sub(self, other: &'a Ball) -> Ball {
        debug_assert_eq!(self.bits, other.bits);
        Ball::from_parts(&self.mid - &other.mid, &self.rad + &other.rad, self.bits)
    }
}

impl<'a> Mul<&'a Ball> for &'a Ball {
    type Output = Ball;

    fn mul(self, other: &'a Ball) -> Ball {
        debug_assert_eq!(self.bits, other.bits);
        let bits = self.bits;
        let prod = &self.mid * &other.mid;
        let rounding = u32::from(has_low_bits(&prod, bits));
        let a = self.mid.magnitude();
        let b = other.mid.magnitude();
        let err = a * &other.rad + b * &self.rad + &self.rad * &other.rad;
        Ball::from_parts(prod >> bits, ceil_shr(&err, bits) + rounding, bits)
    }
}

impl Neg for &Ball {
    type Output = Ball;

    fn neg(self) -> Ball {
        Ball::from_parts(-&self.mid, self.rad.clone(), self.bits)
    }
}

impl Neg for Ball {
    type Output = Ball;

    fn neg(self) -> Ball {
        Ball::from_parts(-self.mid, self.rad, self.bits)
    }
}

impl fmt::Display for Ball {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rad = Ball::from_parts(BigInt::from_biguint(Sign::Plus, self.rad.clone()), BigUint::zero(), self.bits);
        write!(f, "[{:e} +/- {:.3e}]", self.to_f64(), rad.to_f64())
    }
}
