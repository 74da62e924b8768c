//! Elementary functions on balls: π, exp, sin and cos.
//!
//! Every series is summed on fixed-point integers at `bits + GUARD_BITS`
//! with a counted bound on rounding and truncation error, then rounded back
//! to the working precision. Error from the argument's own radius is added
//! separately via a Lipschitz bound (sin, cos) or monotonicity (exp).

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::ball::Ball;
use crate::complex::ComplexBall;
use crate::precision::Precision;

/// Guard bits for series evaluation.
const GUARD_BITS: u32 = 32;

/// `atan(1/k)` at `w` bits, with an error bound in ulps.
///
/// Every partial power is at most 2 ulps low, every term at most 3, and the
/// alternating tail after the last nonzero power is below 3 ulps.
fn atan_inv(k: u32, w: u32) -> (BigInt, BigUint) {
    let k = BigInt::from(k);
    let k2 = &k * &k;
    let mut power = (BigInt::one() << w) / &k;
    let mut sum = BigInt::zero();
    let mut n: u64 = 0;
    while !power.is_zero() {
        let term = &power / BigInt::from(2 * n + 1);
        if n.is_even() {
            sum += term;
        } else {
            sum -= term;
        }
        power /= &k2;
        n += 1;
    }
    (sum, BigUint::from(3 * n + 3))
}

/// π at `bits` via Machin's formula `π = 16·atan(1/5) − 4·atan(1/239)`.
pub fn pi_ball(bits: u32) -> Ball {
    let w = bits + GUARD_BITS;
    let (a5, e5) = atan_inv(5, w);
    let (a239, e239) = atan_inv(239, w);
    let mid = a5 * 16 - a239 * 4;
    let rad = e5 * 16u32 + e239 * 4u32;
    Ball::from_parts(mid, rad, w).with_bits(bits)
}

/// `(sin r, cos r)` for a point `r` given in ulps at `w` bits, `|r| < 1`.
/// Returns the two fixed-point sums and a common error bound in ulps.
fn sin_cos_series(r: &BigInt, w: u32) -> (BigInt, BigInt, BigUint) {
    let one = BigInt::one() << w;
    let r_abs = r.abs();
    let r2 = (&r_abs * &r_abs) >> w;

    // cos: t_0 = 1, t_k = t_{k-1} r² / ((2k-1)(2k))
    let mut cos_sum = BigInt::zero();
    let mut term = one.clone();
    let mut k: u64 = 0;
    while !term.is_zero() {
        if k.is_even() {
            cos_sum += &term;
        } else {
            cos_sum -= &term;
        }
        k += 1;
        term = ((&term * &r2) >> w) / BigInt::from((2 * k - 1) * (2 * k));
    }
    let cos_steps = k;

    // sin: s_0 = |r|, s_k = s_{k-1} r² / ((2k)(2k+1))
    let mut sin_sum = BigInt::zero();
    let mut term = r_abs;
    let mut k: u64 = 0;
    while !term.is_zero() {
        if k.is_even() {
            sin_sum += &term;
        } else {
            sin_sum -= &term;
        }
        k += 1;
        term = ((&term * &r2) >> w) / BigInt::from((2 * k) * (2 * k + 1));
    }
    if r.is_negative() {
        sin_sum = -sin_sum;
    }

    let steps = cos_steps.max(k);
    (sin_sum, cos_sum, BigUint::from(6 * steps + 8))
}

/// `exp(r)` for a point `r` given in ulps at `w` bits, `|r| < 1/2`.
fn exp_series(r: &BigInt, w: u32) -> (BigInt, BigUint) {
    let mut sum = BigInt::zero();
    let mut term = BigInt::one() << w;
    let mut k: u64 = 0;
    while !term.is_zero() {
        sum += &term;
        k += 1;
        // shift on the magnitude so every truncation goes the same way
        let prod = &term * r;
        let shifted = if prod.is_negative() {
            -((-prod) >> w)
        } else {
            prod >> w
        };
        term = shifted / BigInt::from(k);
    }
    (sum, BigUint::from(4 * k + 10))
}

/// Precision-bound evaluator for elementary functions.
///
/// Caches π and its multiples for argument reduction. One context is built
/// per unit of work and never shared between workers.
#[derive(Debug, Clone)]
pub struct EnclosureContext {
    precision: Precision,
    pi: Ball,
    half_pi: Ball,
    two_pi: Ball,
}

impl EnclosureContext {
    /// Context for `precision`; computes π once at extra guard bits.
    pub fn new(precision: Precision) -> Self {
        let bits = precision.bits();
        let pi_wide = pi_ball(bits + GUARD_BITS);
        Self {
            precision,
            pi: pi_wide.with_bits(bits),
            half_pi: pi_wide.div_int(2).with_bits(bits),
            two_pi: pi_wide.mul_int(2).with_bits(bits),
        }
    }

    /// Working precision in bits.
    pub fn bits(&self) -> u32 {
        self.precision.bits()
    }

    /// Cached enclosure of π.
    pub fn pi(&self) -> &Ball {
        &self.pi
    }

    /// Cached enclosure of 2π.
    pub fn two_pi(&self) -> &Ball {
        &self.two_pi
    }

    /// Promote an exact rational into a ball at the working precision.
    pub fn ball(&self, q: &BigRational) -> Ball {
        Ball::from_rational(q, self.bits())
    }

    /// Exact ball for an integer.
    pub fn int<T: Into<BigInt>>(&self, n: T) -> Ball {
        Ball::from_int(n, self.bits())
    }

    /// Enclosures of `sin x` and `cos x`.
    pub fn sin_cos(&self, x: &Ball) -> (Ball, Ball) {
        let bits = self.bits();
        debug_assert_eq!(x.bits(), bits);

        // nearest multiple of π/2
        let two = BigInt::from(2);
        let hp = self.half_pi.mid_ulps();
        let k: BigInt = (x.mid_ulps() * &two + hp).div_floor(&(hp * &two));
        let reduced = x - &self.half_pi.mul_int(k.clone());
        let quadrant = k.mod_floor(&BigInt::from(4)).to_u8().unwrap_or(0);

        let w = bits + GUARD_BITS;
        let r = reduced.mid_ulps() << GUARD_BITS;
        let (s, c, err) = sin_cos_series(&r, w);
        let mut sin_r = Ball::from_parts(s, err.clone(), w).with_bits(bits);
        let mut cos_r = Ball::from_parts(c, err, w).with_bits(bits);

        // both functions are 1-Lipschitz
        sin_r.add_error(reduced.rad_ulps());
        cos_r.add_error(reduced.rad_ulps());

        let (sin_x, cos_x) = match quadrant {
            0 => (sin_r, cos_r),
            1 => (cos_r, -sin_r),
            2 => (-sin_r, -cos_r),
            _ => (-cos_r, sin_r),
        };
        (sin_x.clamp_unit(), cos_x.clamp_unit())
    }

    /// Enclosure of `cos x`.
    pub fn cos(&self, x: &Ball) -> Ball {
        self.sin_cos(x).1
    }

    /// Enclosure of `exp x`, the hull of exp at both endpoints.
    pub fn exp(&self, x: &Ball) -> Ball {
        if x.is_exact() {
            return self.exp_point(x.mid_ulps());
        }
        let lo = self.exp_point(&x.lower_ulps());
        let hi = self.exp_point(&x.upper_ulps());
        lo.hull(&hi)
    }

    /// `exp(m / 2^bits)` for an exact fixed-point value.
    fn exp_point(&self, m: &BigInt) -> Ball {
        let bits = self.bits();
        if m.is_zero() {
            return Ball::one(bits);
        }
        // halve s times so that |r| < 1/2, then square back
        let s = (m.bits() + 1).saturating_sub(bits as u64) as u32;
        let w = bits + GUARD_BITS + s;
        let r = m << GUARD_BITS;
        let (sum, err) = exp_series(&r, w);
        let mut e = Ball::from_parts(sum, err, w);
        for _ in 0..s {
            e = e.square();
        }
        e.with_bits(bits)
    }

    /// Complex exponential `exp(re) · (cos im + i sin im)`.
    pub fn cexp(&self, z: &ComplexBall) -> ComplexBall {
        let (sin_im, cos_im) = self.sin_cos(z.im());
        let unit = ComplexBall::new(cos_im, sin_im);
        if z.re().is_zero() {
            return unit;
        }
        unit.scale(&self.exp(z.re()))
    }
}
