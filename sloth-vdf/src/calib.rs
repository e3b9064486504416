#![forbid(unsafe_code)]

//! Runtime calibration of the round count.
//!
//! Forward rounds cost one modular exponentiation each, and CPUs differ widely,
//! so a fixed round count gives very different delays across machines. This
//! module times a small sample of forward rounds and picks the number of rounds
//! expected to take `target_ms` for one block on the current hardware.
//!
//! Algorithm (simple heuristic):
//! 1. Encode one zero block for `SAMPLE_ROUNDS` rounds.
//! 2. Compute `σ`, nanoseconds per round.
//! 3. `rounds = (target_ms * 1_000_000) / σ`.
//! 4. Clamp into `[MIN_ROUNDS, MAX_ROUNDS]`.

use std::time::{Duration, Instant};

use sloth_core::SlothResult;
use tracing::debug;

use crate::handle::EngineHandle;

/// Minimum / maximum calibrated round counts.
pub const MIN_ROUNDS: u64 = 1;
pub const MAX_ROUNDS: u64 = 10_000_000;

const SAMPLE_ROUNDS: u64 = 64;

/// Pick a round count whose single-block encode takes about `target_ms`.
pub fn calibrate_rounds(handle: &EngineHandle, target_ms: u64) -> SlothResult<u64> {
    // The zero block is always inside the field.
    let block = vec![0u8; handle.block_size()];

    let start = Instant::now();
    handle.encode(SAMPLE_ROUNDS, &block)?;
    let elapsed = start.elapsed();

    let ns_per_round = (elapsed.as_nanos() / u128::from(SAMPLE_ROUNDS)).max(1);
    let target_ns = u128::from(target_ms) * 1_000_000;
    let rounds = u64::try_from(target_ns / ns_per_round).unwrap_or(MAX_ROUNDS);
    let rounds = rounds.clamp(MIN_ROUNDS, MAX_ROUNDS);
    debug!(ns_per_round = ns_per_round as u64, target_ms, rounds, "calibrated rounds");
    Ok(rounds)
}

/// Wall-clock cost of encoding versus decoding the same buffer.
#[derive(Debug, Clone, Copy)]
pub struct AsymmetryReport {
    pub rounds: u64,
    pub iterations: u32,
    pub encode: Duration,
    pub decode: Duration,
}

impl AsymmetryReport {
    /// `encode / decode`; infinite when decoding was too fast to measure.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        let decode = self.decode.as_secs_f64();
        if decode == 0.0 {
            f64::INFINITY
        } else {
            self.encode.as_secs_f64() / decode
        }
    }
}

/// Time `iterations` encodes and decodes of `data` at `rounds`.
pub fn measure_asymmetry(handle: &EngineHandle, rounds: u64, data: &[u8], iterations: u32) -> SlothResult<AsymmetryReport> {
    let mut encode = Duration::ZERO;
    let mut decode = Duration::ZERO;
    for _ in 0..iterations {
        let start = Instant::now();
        let encoded = handle.encode(rounds, data)?;
        encode += start.elapsed();

        let start = Instant::now();
        handle.decode(rounds, &encoded)?;
        decode += start.elapsed();
    }
    Ok(AsymmetryReport { rounds, iterations, encode, decode })
}
