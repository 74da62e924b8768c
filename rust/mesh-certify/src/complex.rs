//! Complex enclosures as rectangles of two real balls.

use std::ops::Add;

use num_rational::BigRational;

use crate::ball::Ball;
use crate::bound::UpperBound;
use crate::error::ArithmeticError;

/// A complex enclosure `re + i·im` with independent real and imaginary balls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexBall {
    re: Ball,
    im: Ball,
}

impl ComplexBall {
    /// Rectangle from two balls at the same precision.
    pub fn new(re: Ball, im: Ball) -> Self {
        debug_assert_eq!(re.bits(), im.bits());
        Self { re, im }
    }

    /// Exact zero at `bits`.
    pub fn zero(bits: u32) -> Self {
        Self::new(Ball::zero(bits), Ball::zero(bits))
    }

    /// Purely imaginary `i·im`.
    pub fn imaginary(im: Ball) -> Self {
        let bits = im.bits();
        Self::new(Ball::zero(bits), im)
    }

    /// Real part.
    pub fn re(&self) -> &Ball {
        &self.re
    }

    /// Imaginary part.
    pub fn im(&self) -> &Ball {
        &self.im
    }

    /// Binary precision of both parts.
    pub fn bits(&self) -> u32 {
        self.re.bits()
    }

    /// Multiply by a real ball: `(a + bi)·s = as + bs·i`.
    pub fn scale(&self, s: &Ball) -> ComplexBall {
        ComplexBall::new(&self.re * s, &self.im * s)
    }

    /// Multiply by an exact integer. No rounding happens.
    pub fn mul_int(&self, k: i64) -> ComplexBall {
        ComplexBall::new(self.re.mul_int(k), self.im.mul_int(k))
    }

    /// Divide by a real ball. Fails when the divisor contains zero.
    pub fn checked_div_real(&self, d: &Ball) -> Result<ComplexBall, ArithmeticError> {
        Ok(ComplexBall::new(self.re.checked_div(d)?, self.im.checked_div(d)?))
    }

    /// True when the rectangle contains `re + i·im`.
    pub fn contains(&self, re: &BigRational, im: &BigRational) -> bool {
        self.re.contains(re) && self.im.contains(im)
    }

    /// Rigorous upper bound of `|z|` over the rectangle:
    /// `ceil(sqrt(max|re|² + max|im|²))` in ulps.
    pub fn abs_upper(&self) -> UpperBound {
        let a = self.re.mag_upper_ulps();
        let b = self.im.mag_upper_ulps();
        let norm_sq = &a * &a + &b * &b;
        let mut root = norm_sq.sqrt();
        if &root * &root < norm_sq {
            root += 1u32;
        }
        UpperBound::from_ulps(root, self.bits())
    }
}

impl<'a> Add<&'a ComplexBall> for &'a ComplexBall {
    type Output = ComplexBall;

    fn add(self, other: &'a ComplexBall) -> ComplexBall {
        ComplexBall::new(&self.re + &other.re, &self.im + &other.im)
    }
}

/// Sum of a slice of complex balls; exact zero for an empty slice.
pub fn csum(values: &[ComplexBall], bits: u32) -> ComplexBall {
    values
        .iter()
        .fold(ComplexBall::zero(bits), |acc, v| &acc + v)
}
