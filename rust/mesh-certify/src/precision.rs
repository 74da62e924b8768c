//! Working precision shared by every ball created within one unit of work.
//!
//! A `Precision` is a plain value. Each chunk task builds its own and every
//! enclosure it creates is tagged with the binary precision derived from it,
//! so balls from different tasks are never mixed by accident.

/// Extra bits on top of `ceil(dps * log2(10))`.
const EXTRA_BITS: u32 = 4;

/// log2(10) scaled by 10^9, rounded up.
const LOG2_10_E9: u64 = 3_321_928_095;

/// Working precision in decimal digits and its binary equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    dps: u32,
    bits: u32,
}

impl Precision {
    /// Number of arithmetic threads used inside one worker. Parallelism lives
    /// in the orchestrator only.
    pub const ARITHMETIC_THREADS: usize = 1;

    /// Largest accepted decimal precision.
    pub const MAX_DPS: u32 = 1_000_000;

    /// Precision of `dps` significant decimal digits. Zero is clamped to one
    /// digit and anything above [`Precision::MAX_DPS`] to that limit.
    pub fn from_dps(dps: u32) -> Self {
        let dps = dps.clamp(1, Self::MAX_DPS);
        let bits = (dps as u64 * LOG2_10_E9).div_ceil(1_000_000_000) as u32 + EXTRA_BITS;
        Self { dps, bits }
    }

    /// Decimal digits.
    pub fn dps(&self) -> u32 {
        self.dps
    }

    /// Binary precision in bits.
    pub fn bits(&self) -> u32 {
        self.bits
    }
}
