//! mesh-certify CLI: ball-certified mesh bound for the trigonometric sum.
//!
//! Usage:
//!   mesh-certify [--M=2000000] [--dps=90] [--workers=1]
//!                [--bound_num=1709176398] [--bound_den=1000000000]
//!                [--digits=25] [--json=<path>] [--strict]
//!
//! Logging goes through env_logger, e.g. `RUST_LOG=debug` for per-chunk lines.

use mesh_certify::config::{self, Command, RunConfig, USAGE};
use mesh_certify::{certify_mesh, Result};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match config::parse_args(&args) {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            println!("{}", USAGE);
            return;
        }
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    };

    match run(&config) {
        Ok(true) => {}
        Ok(false) if config.strict => std::process::exit(2),
        Ok(false) => {}
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run the certification and print the report. Returns whether the bound holds.
fn run(config: &RunConfig) -> Result<bool> {
    let cert = certify_mesh(config)?;
    println!("{}", cert);
    println!();
    println!("Wall time:   {:.2}s", cert.elapsed.as_secs_f64());
    println!("Throughput:  {:.0} evaluations/s", cert.evaluations_per_second());

    if let Some(path) = &config.json_path {
        cert.write_json(path)?;
        println!("Certificate saved to {}", path.display());
    }
    Ok(cert.certified)
}
