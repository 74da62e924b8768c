//! Fork-join decomposition of the mesh search.
//!
//! The mesh is cut into at most `workers` contiguous chunks. Each chunk runs
//! on its own thread of a dedicated rayon pool with nothing shared between
//! chunks; the per-chunk maxima are reduced in ascending chunk order.

use log::{info, warn};
use rayon::prelude::*;

use crate::bound::UpperBound;
use crate::error::{CertError, ConfigError, Result};
use crate::precision::Precision;
use crate::scan::{scan_chunk, ChunkResult, ChunkTask};

/// Global maximum over the whole mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshMaximum {
    pub max_upper: UpperBound,
    pub argmax: u64,
    /// Number of chunks the mesh was split into.
    pub chunks: usize,
}

/// Split [0, mesh_size) into chunks of `ceil(M / W)` indices. Only the
/// non-empty chunks are produced, so there are at most `min(M, W)` of them
/// whatever the size of `workers`.
pub fn partition(mesh_size: u64, precision: Precision, workers: usize) -> Result<Vec<ChunkTask>> {
    if mesh_size == 0 {
        return Err(ConfigError::NonPositive { name: "M", value: 0 }.into());
    }
    let workers = u64::try_from(workers.max(1)).unwrap_or(u64::MAX);
    let step = mesh_size.div_ceil(workers);
    // ceil(M / step) <= min(M, W) chunks are non-empty
    let count = mesh_size.div_ceil(step);

    let mut tasks = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
    for k in 0..count {
        let start = k * step;
        let end = mesh_size.min(start.saturating_add(step));
        tasks.push(ChunkTask::new(start, end, mesh_size, precision)?);
    }
    Ok(tasks)
}

/// Strict `>` in iteration order: on equal bounds the earlier result wins.
pub fn reduce<I>(results: I) -> Option<ChunkResult>
where
    I: IntoIterator<Item = ChunkResult>,
{
    results.into_iter().fold(None, |best, r| match best {
        Some(b) if r.max_upper <= b.max_upper => Some(b),
        _ => Some(r),
    })
}

/// Maximum upper bound of |P| over the mesh of `mesh_size` points.
///
/// `workers <= 1` scans the whole mesh on the calling thread.
pub fn compute_mesh_max(mesh_size: u64, precision: Precision, workers: usize) -> Result<MeshMaximum> {
    if workers <= 1 {
        let task = ChunkTask::new(0, mesh_size, mesh_size, precision).map_err(|e| match e {
            CertError::EmptyChunk { .. } => ConfigError::NonPositive { name: "M", value: 0 }.into(),
            other => other,
        })?;
        let r = scan_chunk(&task)?;
        return Ok(MeshMaximum {
            max_upper: r.max_upper,
            argmax: r.argmax,
            chunks: 1,
        });
    }

    let tasks = partition(mesh_size, precision, workers)?;
    let cpus = num_cpus::get();
    if workers > cpus {
        warn!(
            "{} workers requested on {} logical CPUs; expect contention",
            workers, cpus
        );
    }
    info!(
        "dispatching {} chunk(s) of up to {} indices to {} worker thread(s)",
        tasks.len(),
        tasks.first().map_or(0, ChunkTask::len),
        tasks.len()
    );

    // never more threads than chunks
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(tasks.len())
        .thread_name(|i| format!("mesh-worker-{}", i))
        .build()?;

    // one task per split; collect keeps chunk order
    let results: Vec<ChunkResult> = pool.install(|| {
        tasks
            .par_iter()
            .with_max_len(1)
            .map(scan_chunk)
            .collect::<Result<Vec<_>>>()
    })?;

    let chunks = results.len();
    let best = reduce(results).ok_or(CertError::NoChunks)?;
    Ok(MeshMaximum {
        max_upper: best.max_upper,
        argmax: best.argmax,
        chunks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn p() -> Precision {
        Precision::from_dps(20)
    }

    fn ranges(tasks: &[ChunkTask]) -> Vec<(u64, u64)> {
        tasks.iter().map(|t| (t.start(), t.end())).collect()
    }

    #[test]
    fn test_partition_even_split() {
        let tasks = partition(12, p(), 4).unwrap();
        assert_eq!(ranges(&tasks), vec![(0, 3), (3, 6), (6, 9), (9, 12)]);
    }

    #[test]
    fn test_partition_ceil_chunk() {
        // ceil(10/4) = 3 -> last chunk short
        let tasks = partition(10, p(), 4).unwrap();
        assert_eq!(ranges(&tasks), vec![(0, 3), (3, 6), (6, 9), (9, 10)]);
    }

    #[test]
    fn test_partition_drops_empty_chunks() {
        // ceil(5/4) = 2 -> [0,2) [2,4) [4,5) and an empty fourth
        let tasks = partition(5, p(), 4).unwrap();
        assert_eq!(ranges(&tasks), vec![(0, 2), (2, 4), (4, 5)]);

        let tasks = partition(3, p(), 16).unwrap();
        assert_eq!(ranges(&tasks), vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_partition_covers_mesh_exactly() {
        for m in 1..40u64 {
            for w in 1..12usize {
                let tasks = partition(m, p(), w).unwrap();
                assert!(tasks.len() <= w.min(m as usize));
                let mut next = 0;
                for t in &tasks {
                    assert_eq!(t.start(), next);
                    next = t.end();
                }
                assert_eq!(next, m);
            }
        }
    }

    #[test]
    fn test_partition_rejects_empty_mesh() {
        assert!(partition(0, p(), 4).is_err());
        assert!(compute_mesh_max(0, p(), 1).is_err());
    }

    fn cr(ulps: u32, argmax: u64) -> ChunkResult {
        ChunkResult {
            max_upper: UpperBound::from_ulps(BigUint::from(ulps), 8),
            argmax,
        }
    }

    #[test]
    fn test_reduce_first_found_wins_ties() {
        let best = reduce(vec![cr(5, 0), cr(9, 10), cr(9, 20), cr(3, 30)]).unwrap();
        assert_eq!(best.argmax, 10);
        assert!(reduce(Vec::new()).is_none());
    }

    #[test]
    fn test_parallel_matches_serial() {
        let serial = compute_mesh_max(24, p(), 1).unwrap();
        for workers in [2, 3, 5, 24, 40] {
            let parallel = compute_mesh_max(24, p(), workers).unwrap();
            assert_eq!(parallel.max_upper, serial.max_upper, "workers = {}", workers);
            assert_eq!(parallel.argmax, serial.argmax, "workers = {}", workers);
        }
    }

    #[test]
    fn test_partition_with_huge_worker_count() {
        let tasks = partition(8, p(), usize::MAX).unwrap();
        assert_eq!(ranges(&tasks), (0..8).map(|j| (j, j + 1)).collect::<Vec<_>>());

        let tasks = partition(u64::MAX, p(), 3).unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[2].end(), u64::MAX);
    }

    #[test]
    fn test_huge_worker_count_runs_one_thread_per_chunk() {
        let serial = compute_mesh_max(8, p(), 1).unwrap();
        let m = compute_mesh_max(8, p(), usize::MAX).unwrap();
        assert_eq!(m.chunks, 8);
        assert_eq!(m.max_upper, serial.max_upper);
        assert_eq!(m.argmax, serial.argmax);
    }

    #[test]
    fn test_more_workers_than_points() {
        let m = compute_mesh_max(3, p(), 8).unwrap();
        assert_eq!(m.chunks, 3);
        assert!(m.argmax < 3);
    }
}
