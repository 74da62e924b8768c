//! Exhaustive scan of one contiguous range of mesh indices.

use log::debug;

use crate::ball::Ball;
use crate::bound::UpperBound;
use crate::coeffs::{build_coefficients, NMAX};
use crate::elementary::EnclosureContext;
use crate::error::{CertError, Result};
use crate::evaluate::upper_bound;
use crate::params::exact_parameters;
use crate::precision::Precision;

/// Half-open index range [start, end) of a mesh with `mesh_size` points.
///
/// Always non-empty and inside the mesh; the only way to build one is
/// [`ChunkTask::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkTask {
    start: u64,
    end: u64,
    mesh_size: u64,
    precision: Precision,
}

impl ChunkTask {
    /// Validate `[start, end)` against the mesh. Fails on an empty range or
    /// one that runs past `mesh_size`.
    pub fn new(start: u64, end: u64, mesh_size: u64, precision: Precision) -> Result<Self> {
        if start >= end {
            return Err(CertError::EmptyChunk { start, end });
        }
        if end > mesh_size {
            return Err(CertError::ChunkOutOfRange {
                start,
                end,
                mesh_size,
            });
        }
        Ok(Self {
            start,
            end,
            mesh_size,
            precision,
        })
    }

    /// First index of the chunk.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// One past the last index.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of indices in the chunk, at least 1.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }
}

/// Largest upper bound found in a chunk and the first index attaining it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkResult {
    pub max_upper: UpperBound,
    pub argmax: u64,
}

/// Angular step 2π/M.
pub fn mesh_step(ctx: &EnclosureContext, mesh_size: u64) -> Ball {
    ctx.two_pi().div_int(mesh_size)
}

/// Scan every index of `task`.
///
/// Builds its own precision context, parameters and coefficients, so a task
/// depends on nothing but its own fields. Ties keep the earliest index.
pub fn scan_chunk(task: &ChunkTask) -> Result<ChunkResult> {
    debug!(
        "scanning [{}, {}) of M = {} at {} digits on {} arithmetic thread(s)",
        task.start,
        task.end,
        task.mesh_size,
        task.precision.dps(),
        Precision::ARITHMETIC_THREADS
    );

    let ctx = EnclosureContext::new(task.precision);
    let params = exact_parameters();
    let coeffs = build_coefficients(&ctx, &params, NMAX)?;
    let step = mesh_step(&ctx, task.mesh_size);

    let mut best: Option<ChunkResult> = None;
    for j in task.start..task.end {
        let theta = step.mul_int(j);
        let u = upper_bound(&ctx, &theta, &coeffs);
        let replace = match &best {
            Some(b) => u > b.max_upper,
            None => true,
        };
        if replace {
            best = Some(ChunkResult {
                max_upper: u,
                argmax: j,
            });
        }
    }

    let result = best.ok_or(CertError::EmptyChunk {
        start: task.start,
        end: task.end,
    })?;
    debug!(
        "chunk [{}, {}) max {} at j = {}",
        task.start,
        task.end,
        result.max_upper.to_decimal(12),
        result.argmax
    );
    Ok(result)
}
