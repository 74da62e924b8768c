//! Error types for configuration, ball arithmetic and the mesh search.

use std::path::PathBuf;

/// Rejected run configuration. Raised before any worker is spawned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value}")]
    NonPositive { name: &'static str, value: i128 },

    #[error("dps = {dps} exceeds the supported maximum of {max}")]
    PrecisionTooLarge { dps: u32, max: u32 },

    #[error("bound denominator must be nonzero")]
    ZeroDenominator,

    #[error("invalid value '{value}' for {flag}")]
    Parse { flag: String, value: String },

    #[error("unknown argument '{0}'")]
    UnknownFlag(String),

    #[error("missing value for {0}")]
    MissingValue(String),
}

/// Failure inside enclosure arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArithmeticError {
    #[error("division by a ball that contains zero")]
    DivisorContainsZero,
}

/// Top-level error for a certification run.
#[derive(Debug, thiserror::Error)]
pub enum CertError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    #[error("empty chunk [{start}, {end})")]
    EmptyChunk { start: u64, end: u64 },

    #[error("chunk [{start}, {end}) exceeds mesh size {mesh_size}")]
    ChunkOutOfRange { start: u64, end: u64, mesh_size: u64 },

    #[error("no chunk produced a result")]
    NoChunks,

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = CertError> = std::result::Result<T, E>;
