//! Comparison against the target bound and the human / JSON report.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use num_rational::BigRational;
use serde::Serialize;

use crate::bound::{format_significant, UpperBound};
use crate::error::{CertError, Result};
use crate::parallel::MeshMaximum;

/// Outcome of a certification run.
#[derive(Debug, Clone)]
pub struct Certificate {
    pub mesh_size: u64,
    pub dps: u32,
    pub workers: usize,
    pub max_upper: UpperBound,
    pub argmax: u64,
    pub target: BigRational,
    /// `max_upper <= target`, decided exactly.
    pub certified: bool,
    pub digits: usize,
    pub elapsed: Duration,
}

/// Serializable form of a [`Certificate`].
#[derive(Debug, Serialize)]
pub struct CertificateRecord {
    pub mesh_size: u64,
    pub dps: u32,
    pub workers: usize,
    pub mesh_max_upper: String,
    /// Exact dyadic value as `ulps/2^bits`.
    pub mesh_max_upper_exact: String,
    pub argmax: u64,
    pub target_bound: String,
    pub target_bound_exact: String,
    pub certified: bool,
    pub wall_seconds: f64,
    pub evaluations_per_second: f64,
}

impl Certificate {
    pub fn new(
        mesh_size: u64,
        dps: u32,
        workers: usize,
        maximum: &MeshMaximum,
        target: BigRational,
        digits: usize,
        elapsed: Duration,
    ) -> Self {
        let certified = maximum.max_upper.certifies(&target);
        Self {
            mesh_size,
            dps,
            workers,
            max_upper: maximum.max_upper.clone(),
            argmax: maximum.argmax,
            target,
            certified,
            digits,
            elapsed,
        }
    }

    pub fn evaluations_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.mesh_size as f64 / secs
        } else {
            0.0
        }
    }

    pub fn record(&self) -> CertificateRecord {
        CertificateRecord {
            mesh_size: self.mesh_size,
            dps: self.dps,
            workers: self.workers,
            mesh_max_upper: self.max_upper.to_decimal(self.digits),
            mesh_max_upper_exact: format!("{}/2^{}", self.max_upper.ulps(), self.max_upper.bits()),
            argmax: self.argmax,
            target_bound: format_significant(&self.target, self.digits),
            target_bound_exact: self.target.to_string(),
            certified: self.certified,
            wall_seconds: self.elapsed.as_secs_f64(),
            evaluations_per_second: self.evaluations_per_second(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.record())?)
    }

    /// Write the JSON record, creating parent directories as needed.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let io_err = |source| CertError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, json).map_err(io_err)
    }
}

impl fmt::Display for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Ball-certified mesh bound ===")?;
        writeln!(
            f,
            "M = {}, dps = {}, workers = {}",
            self.mesh_size, self.dps, self.workers
        )?;
        writeln!(
            f,
            "mesh_max_upper = {} (attained at j = {} )",
            self.max_upper.to_decimal(self.digits),
            self.argmax
        )?;
        writeln!(
            f,
            "Target bound   = {}",
            format_significant(&self.target, self.digits)
        )?;
        write!(f, "Certified mesh_max_upper <= bound : {}", self.certified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::{BigInt, BigUint};

    fn maximum(ulps: u64, bits: u32, argmax: u64) -> MeshMaximum {
        MeshMaximum {
            max_upper: UpperBound::from_ulps(BigUint::from(ulps), bits),
            argmax,
            chunks: 1,
        }
    }

    fn target() -> BigRational {
        BigRational::new(BigInt::from(1_709_176_398), BigInt::from(1_000_000_000))
    }

    #[test]
    fn test_pass_and_fail() {
        // 7/4 > 1.709..., 27/16 < 1.709...
        let fail = Certificate::new(8, 30, 1, &maximum(7, 2, 3), target(), 25, Duration::from_secs(1));
        assert!(!fail.certified);
        let pass = Certificate::new(8, 30, 1, &maximum(27, 4, 3), target(), 25, Duration::from_secs(1));
        assert!(pass.certified);
    }

    #[test]
    fn test_equal_bound_certifies() {
        let exact = Certificate::new(8, 30, 1, &maximum(3, 2, 0), BigRational::new(BigInt::from(3), BigInt::from(4)), 10, Duration::ZERO);
        assert!(exact.certified);
    }

    #[test]
    fn test_report_format() {
        let cert = Certificate::new(8, 30, 2, &maximum(27, 4, 5), target(), 10, Duration::from_secs(2));
        let text = cert.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "=== Ball-certified mesh bound ===");
        assert_eq!(lines[1], "M = 8, dps = 30, workers = 2");
        assert_eq!(lines[2], "mesh_max_upper = 1.687500000 (attained at j = 5 )");
        assert_eq!(lines[3], "Target bound   = 1.709176398");
        assert_eq!(lines[4], "Certified mesh_max_upper <= bound : true");
    }

    #[test]
    fn test_json_record() {
        let cert = Certificate::new(8, 30, 1, &maximum(27, 4, 5), target(), 10, Duration::from_secs(2));
        let value: serde_json::Value = serde_json::from_str(&cert.to_json().unwrap()).unwrap();
        assert_eq!(value["mesh_size"], 8);
        assert_eq!(value["argmax"], 5);
        assert_eq!(value["certified"], true);
        assert_eq!(value["mesh_max_upper_exact"], "27/2^4");
        assert_eq!(value["target_bound_exact"], "854588199/500000000");
        assert_eq!(value["evaluations_per_second"], 4.0);
    }

    #[test]
    fn test_write_json_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cert.json");
        let cert = Certificate::new(8, 30, 1, &maximum(27, 4, 5), target(), 10, Duration::from_secs(2));
        cert.write_json(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"certified\": true"));
    }
}
