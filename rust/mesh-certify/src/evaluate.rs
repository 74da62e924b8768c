//! Pointwise evaluation of P(θ) = 2 · Σ c_n · cos((2n+1)θ).

use crate::ball::Ball;
use crate::bound::UpperBound;
use crate::coeffs::Coefficients;
use crate::complex::{csum, ComplexBall};
use crate::elementary::EnclosureContext;

/// Enclosures of cos(θ), cos(3θ), ..., cos((2·count-1)θ).
///
/// One sin/cos evaluation, then cos((m+2)θ) = 2·cos(2θ)·cos(mθ) − cos((m−2)θ).
pub fn odd_cosines(ctx: &EnclosureContext, theta: &Ball, count: usize) -> Vec<Ball> {
    let mut out = Vec::with_capacity(count);
    if count == 0 {
        return out;
    }
    let c1 = ctx.cos(theta);
    let two_c2 = &(&c1 * &c1).mul_int(4) - &ctx.int(2);

    // cos(-θ) = cos(θ)
    let mut prev = c1.clone();
    let mut cur = c1;
    out.push(cur.clone());
    for _ in 1..count {
        let next = &(&two_c2 * &cur) - &prev;
        prev = cur;
        cur = next;
        out.push(cur.clone());
    }
    out
}

/// Enclosure of P(θ) for every θ in the ball `theta`.
pub fn evaluate(ctx: &EnclosureContext, theta: &Ball, coeffs: &Coefficients) -> ComplexBall {
    let cosines = odd_cosines(ctx, theta, coeffs.len());
    let terms: Vec<ComplexBall> = coeffs
        .iter()
        .zip(cosines.iter())
        .map(|(c, cos)| c.scale(cos))
        .collect();
    csum(&terms, ctx.bits()).mul_int(2)
}

/// Rigorous upper bound of |P(θ)| over the ball `theta`.
pub fn upper_bound(ctx: &EnclosureContext, theta: &Ball, coeffs: &Coefficients) -> UpperBound {
    evaluate(ctx, theta, coeffs).abs_upper()
}
