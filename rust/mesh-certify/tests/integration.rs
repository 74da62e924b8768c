//! Integration tests for the mesh certification crate.

use num_bigint::BigInt;
use num_rational::BigRational;

use mesh_certify::coeffs::{build_coefficients, NMAX};
use mesh_certify::config::{parse_args, Command, RunConfig};
use mesh_certify::evaluate::upper_bound;
use mesh_certify::params::{default_target, exact_parameters};
use mesh_certify::parallel::{compute_mesh_max, partition};
use mesh_certify::scan::{mesh_step, scan_chunk, ChunkTask};
use mesh_certify::{certify_mesh, CertError, ConfigError, EnclosureContext, Precision};

/// |P(0)| = |P(π)| to 30 digits; the mesh maximum for small even M.
const P0_ABS: &str = "1.709159249919439752526619996927";

fn config(mesh_size: u64, dps: u32, workers: usize) -> RunConfig {
    RunConfig {
        mesh_size,
        dps,
        workers,
        ..RunConfig::default()
    }
}

// ============================================================
// End-to-end certification
// ============================================================

#[test]
fn test_small_mesh_end_to_end() {
    let cert = certify_mesh(&config(8, 30, 1)).unwrap();
    let bound = cert.max_upper.to_f64();
    assert!(bound.is_finite() && bound > 0.0);
    assert!(cert.argmax < 8);
    // maximum at θ = 0 or its mirror θ = π
    assert!(cert.argmax == 0 || cert.argmax == 4, "argmax = {}", cert.argmax);
    assert!(cert.max_upper.to_decimal(25).starts_with(&P0_ABS[..24]));
    assert!(cert.certified);
}

#[test]
fn test_single_point_mesh() {
    let m = compute_mesh_max(1, Precision::from_dps(30), 1).unwrap();
    assert_eq!(m.argmax, 0);
    assert_eq!(m.chunks, 1);

    let ctx = EnclosureContext::new(Precision::from_dps(30));
    let coeffs = build_coefficients(&ctx, &exact_parameters(), NMAX).unwrap();
    let direct = upper_bound(&ctx, &ctx.int(0), &coeffs);
    assert_eq!(m.max_upper, direct);

    // many workers on a one-point mesh still scans exactly j = 0
    let m4 = compute_mesh_max(1, Precision::from_dps(30), 4).unwrap();
    assert_eq!(m4.chunks, 1);
    assert_eq!(m4.argmax, 0);
    assert_eq!(m4.max_upper, direct);
}

#[test]
fn test_workers_do_not_change_result() {
    let precision = Precision::from_dps(25);
    for &m in &[7u64, 16, 45] {
        let serial = compute_mesh_max(m, precision, 1).unwrap();
        for workers in [2usize, 4, 7, 64] {
            let par = compute_mesh_max(m, precision, workers).unwrap();
            assert_eq!(par.max_upper, serial.max_upper, "M = {}, W = {}", m, workers);
            assert_eq!(par.argmax, serial.argmax, "M = {}, W = {}", m, workers);
        }
    }
}

#[test]
fn test_workers_exceeding_mesh() {
    let tasks = partition(5, Precision::from_dps(20), 50).unwrap();
    assert!(tasks.len() <= 5);
    assert!(tasks.iter().all(|t| t.len() >= 1));
    let m = compute_mesh_max(5, Precision::from_dps(20), 50).unwrap();
    assert!(m.argmax < 5);
}

#[test]
fn test_cli_huge_worker_count_does_not_crash() {
    let huge = usize::MAX.to_string();
    let args: Vec<String> = ["--M", "8", "--dps", "20", "--workers", huge.as_str()]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let cfg = match parse_args(&args).unwrap() {
        Command::Run(c) => c,
        Command::Help => panic!("unexpected help"),
    };
    let cert = certify_mesh(&cfg).unwrap();
    let serial = compute_mesh_max(8, Precision::from_dps(20), 1).unwrap();
    assert_eq!(cert.max_upper, serial.max_upper);
    assert_eq!(cert.argmax, serial.argmax);
    assert!(cert.certified);
}

#[test]
fn test_chunks_cover_global_max() {
    // the global max is the max of the chunk maxima
    let precision = Precision::from_dps(20);
    let tasks = partition(30, precision, 4).unwrap();
    let chunk_max = tasks
        .iter()
        .map(|t| scan_chunk(t).unwrap().max_upper)
        .max()
        .unwrap();
    let global = compute_mesh_max(30, precision, 4).unwrap();
    assert_eq!(global.max_upper, chunk_max);
}

#[test]
fn test_higher_precision_tightens_mesh_bound() {
    let low = compute_mesh_max(12, Precision::from_dps(20), 1).unwrap();
    let high = compute_mesh_max(12, Precision::from_dps(60), 1).unwrap();
    assert!(high.max_upper <= low.max_upper);
    assert!((low.max_upper.to_f64() - high.max_upper.to_f64()).abs() < 1e-15);
}

#[test]
fn test_failed_certification_is_reported_not_raised() {
    let cfg = RunConfig {
        bound_num: BigInt::from(17),
        bound_den: BigInt::from(10),
        ..config(8, 20, 2)
    };
    let cert = certify_mesh(&cfg).unwrap();
    assert!(!cert.certified);
    assert!(cert.to_string().ends_with("Certified mesh_max_upper <= bound : false"));
}

#[test]
fn test_low_precision_still_reports() {
    // very wide balls: the bound is loose but still a bound
    let cert = certify_mesh(&config(8, 2, 1)).unwrap();
    assert!(cert.max_upper.to_f64() >= 1.709);
}

// ============================================================
// Configuration
// ============================================================

#[test]
fn test_invalid_config_rejected_before_work() {
    let err = certify_mesh(&config(0, 30, 1)).unwrap_err();
    assert!(matches!(err, CertError::Config(ConfigError::NonPositive { name: "M", .. })));
    let err = certify_mesh(&config(8, 0, 1)).unwrap_err();
    assert!(matches!(err, CertError::Config(ConfigError::NonPositive { name: "dps", .. })));
    let err = certify_mesh(&config(8, 30, 0)).unwrap_err();
    assert!(matches!(err, CertError::Config(ConfigError::NonPositive { name: "workers", .. })));
}

#[test]
fn test_cli_round_trip_to_certificate() {
    let args: Vec<String> = ["--M", "8", "--dps=30", "--workers", "2"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let cfg = match parse_args(&args).unwrap() {
        Command::Run(c) => c,
        Command::Help => panic!("unexpected help"),
    };
    let cert = certify_mesh(&cfg).unwrap();
    assert_eq!(cert.target, default_target());
    let text = cert.to_string();
    assert!(text.contains("M = 8, dps = 30, workers = 2"));
    assert!(text.contains("Target bound   = 1.709176398000000000000000"));
}

// ============================================================
// Mesh geometry
// ============================================================

#[test]
fn test_mesh_angles_enclose_exact_multiples() {
    let ctx = EnclosureContext::new(Precision::from_dps(30));
    let step = mesh_step(&ctx, 8);
    // θ_2 = π/2 and θ_4 = π
    let half_pi = ctx.pi().div_int(2);
    assert!(step.mul_int(2).overlaps(&half_pi));
    assert!(step.mul_int(4).overlaps(ctx.pi()));
}

#[test]
fn test_chunk_task_is_self_contained() {
    let p = Precision::from_dps(20);
    let task = ChunkTask::new(2, 6, 8, p).unwrap();
    let a = scan_chunk(&task).unwrap();
    let b = scan_chunk(&task).unwrap();
    assert_eq!(a, b);
}

// ============================================================
// Full certification (slow)
// ============================================================

#[test]
#[ignore = "scans 2,000,000 points at 90 digits; run with --ignored --release"]
fn test_reference_certification() {
    let cfg = config(2_000_000, 90, num_cpus::get());
    let cert = certify_mesh(&cfg).unwrap();
    assert!(cert.certified, "{}", cert);
    assert!(cert.max_upper.to_rational() <= BigRational::new(BigInt::from(1_709_176_398), BigInt::from(1_000_000_000)));
}
