//! Coefficients c_n = exp(i·α0·T(n)) / K0^T(n) of the trigonometric sum.

use crate::ball::Ball;
use crate::complex::ComplexBall;
use crate::elementary::EnclosureContext;
use crate::error::ArithmeticError;
use crate::params::ExactParameters;

/// Highest coefficient index; the sum has `NMAX + 1` terms.
pub const NMAX: usize = 5;

/// Triangular number T(n) = n(n+1)/2.
pub fn triangular(n: u32) -> u32 {
    n * (n + 1) / 2
}

/// Ordered coefficient enclosures, index n = 0..=nmax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coefficients(Vec<ComplexBall>);

impl Coefficients {
    pub fn as_slice(&self) -> &[ComplexBall] {
        &self.0
    }

    /// Number of terms, `nmax + 1`.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComplexBall> {
        self.0.iter()
    }
}

/// Build c_0..=c_nmax under the context's precision.
///
/// The phase is the complex exponential of the purely imaginary ball
/// `i·α0·T(n)`; the denominator is the ball power K0^T(n).
pub fn build_coefficients(
    ctx: &EnclosureContext,
    params: &ExactParameters,
    nmax: usize,
) -> Result<Coefficients, ArithmeticError> {
    let k0 = ctx.ball(&params.k0);
    let alpha0 = ctx.ball(&params.alpha0);

    let coeffs = (0..=nmax as u32)
        .map(|n| {
            let t = triangular(n);
            let phase = ctx.cexp(&ComplexBall::imaginary(alpha0.mul_int(t)));
            let denom: Ball = k0.pow(t);
            phase.checked_div_real(&denom)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Coefficients(coeffs))
}
