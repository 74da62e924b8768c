//! Run configuration and command-line parsing.
//!
//! Flags:
//!   --M <int>           mesh resolution (default 2000000)
//!   --dps <int>         working precision in decimal digits (default 90, at most 10^6)
//!   --workers <int>     parallel workers (default 1)
//!   --bound_num <int>   target bound numerator (default 1709176398)
//!   --bound_den <int>   target bound denominator (default 10^9)
//!   --digits <int>      significant digits in the report (default 25)
//!   --json <path>       also write the certificate as JSON
//!   --strict            exit with status 2 when the bound is not certified
//!
//! Every flag also accepts the `--flag=value` form.

use std::path::PathBuf;
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use crate::error::ConfigError;
use crate::params::TARGET_BOUND;
use crate::precision::Precision;

pub const DEFAULT_MESH_SIZE: u64 = 2_000_000;
pub const DEFAULT_DPS: u32 = 90;
pub const DEFAULT_WORKERS: usize = 1;
pub const DEFAULT_DIGITS: usize = 25;

pub const USAGE: &str = "\
Usage: mesh-certify [--M <int>] [--dps <int>] [--workers <int>]
                    [--bound_num <int>] [--bound_den <int>]
                    [--digits <int>] [--json <path>] [--strict]";

/// Everything one certification run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub mesh_size: u64,
    pub dps: u32,
    pub workers: usize,
    pub bound_num: BigInt,
    pub bound_den: BigInt,
    pub digits: usize,
    pub json_path: Option<PathBuf>,
    pub strict: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mesh_size: DEFAULT_MESH_SIZE,
            dps: DEFAULT_DPS,
            workers: DEFAULT_WORKERS,
            bound_num: BigInt::from(TARGET_BOUND.0),
            bound_den: BigInt::from(TARGET_BOUND.1),
            digits: DEFAULT_DIGITS,
            json_path: None,
            strict: false,
        }
    }
}

impl RunConfig {
    /// Reject non-positive sizes, an oversized precision and a zero denominator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive: [(&'static str, u64); 4] = [
            ("M", self.mesh_size),
            ("dps", self.dps as u64),
            ("workers", self.workers as u64),
            ("digits", self.digits as u64),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::NonPositive { name, value: 0 });
            }
        }
        if self.dps > Precision::MAX_DPS {
            return Err(ConfigError::PrecisionTooLarge {
                dps: self.dps,
                max: Precision::MAX_DPS,
            });
        }
        if self.bound_den.is_zero() {
            return Err(ConfigError::ZeroDenominator);
        }
        Ok(())
    }

    /// Exact target bound `bound_num / bound_den`.
    pub fn target(&self) -> Result<BigRational, ConfigError> {
        if self.bound_den.is_zero() {
            return Err(ConfigError::ZeroDenominator);
        }
        Ok(BigRational::new(self.bound_num.clone(), self.bound_den.clone()))
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(RunConfig),
    Help,
}

fn parse_positive<T: TryFrom<i128>>(flag: &str, name: &'static str, value: &str) -> Result<T, ConfigError> {
    let n: i128 = value.trim().parse().map_err(|_| ConfigError::Parse {
        flag: flag.to_string(),
        value: value.to_string(),
    })?;
    if n <= 0 {
        return Err(ConfigError::NonPositive { name, value: n });
    }
    T::try_from(n).map_err(|_| ConfigError::Parse {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

fn parse_bigint(flag: &str, value: &str) -> Result<BigInt, ConfigError> {
    BigInt::from_str(value.trim()).map_err(|_| ConfigError::Parse {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

/// Parse arguments (without the program name) into a validated command.
pub fn parse_args(args: &[String]) -> Result<Command, ConfigError> {
    let mut config = RunConfig::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) => (f, Some(v.to_string())),
            None => (arg.as_str(), None),
        };

        match flag {
            "--help" | "-h" => return Ok(Command::Help),
            "--strict" => {
                config.strict = true;
                continue;
            }
            "--M" | "--dps" | "--workers" | "--bound_num" | "--bound_den" | "--digits" | "--json" => {}
            _ => return Err(ConfigError::UnknownFlag(arg.clone())),
        }

        let value = match inline {
            Some(v) => v,
            None => iter
                .next()
                .cloned()
                .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))?,
        };

        match flag {
            "--M" => config.mesh_size = parse_positive(flag, "M", &value)?,
            "--dps" => config.dps = parse_positive(flag, "dps", &value)?,
            "--workers" => config.workers = parse_positive(flag, "workers", &value)?,
            "--digits" => config.digits = parse_positive(flag, "digits", &value)?,
            "--bound_num" => config.bound_num = parse_bigint(flag, &value)?,
            "--bound_den" => config.bound_den = parse_bigint(flag, &value)?,
            "--json" => config.json_path = Some(PathBuf::from(value)),
            _ => unreachable!("flag list checked above"),
        }
    }

    config.validate()?;
    Ok(Command::Run(config))
}
