//! # Mesh Certify
//!
//! Certified upper bound for the maximum of
//!
//! ```text
//! |P(θ)|,  P(θ) = 2 · Σ_{n=0}^{5} c_n · cos((2n+1)θ),  c_n = exp(i·α0·T(n)) / K0^T(n)
//! ```
//!
//! over the uniform mesh θ_j = 2πj/M, where T(n) = n(n+1)/2 and K0, α0 are
//! exact rationals. All arithmetic is done on balls (center plus guaranteed
//! radius) so the reported value is provably at least every |P(θ_j)|.
//!
//! The search is exhaustive; it can be split across worker threads without
//! changing the result.

pub mod ball;
pub mod bound;
pub mod coeffs;
pub mod complex;
pub mod config;
pub mod elementary;
pub mod error;
pub mod evaluate;
pub mod parallel;
pub mod params;
pub mod precision;
pub mod report;
pub mod scan;

use std::time::Instant;

use log::info;

pub use ball::Ball;
pub use bound::UpperBound;
pub use complex::ComplexBall;
pub use config::RunConfig;
pub use elementary::EnclosureContext;
pub use error::{ArithmeticError, CertError, ConfigError, Result};
pub use parallel::{compute_mesh_max, MeshMaximum};
pub use precision::Precision;
pub use report::Certificate;

/// Validate `config`, scan the whole mesh and compare against the target.
pub fn certify_mesh(config: &RunConfig) -> Result<Certificate> {
    config.validate()?;
    let target = config.target()?;
    let precision = Precision::from_dps(config.dps);

    info!(
        "certifying M = {} at {} digits ({} bits) with {} worker(s)",
        config.mesh_size,
        precision.dps(),
        precision.bits(),
        config.workers
    );
    let start = Instant::now();
    let maximum = compute_mesh_max(config.mesh_size, precision, config.workers)?;
    let elapsed = start.elapsed();
    info!(
        "mesh scanned in {:.2}s, max upper bound {} at j = {}",
        elapsed.as_secs_f64(),
        maximum.max_upper.to_decimal(12),
        maximum.argmax
    );

    Ok(Certificate::new(
        config.mesh_size,
        config.dps,
        config.workers,
        &maximum,
        target,
        config.digits,
        elapsed,
    ))
}
