#![forbid(unsafe_code)]

//! Block-wise application of the permutation over whole buffers.
//!
//! Blocks are independent: rounds chain inside a block, never across blocks,
//! so the blocks of one buffer may be spread over the rayon pool. Output
//! order always matches input order.

use rayon::prelude::*;
use sloth_core::{SlothError, SlothResult};
use tracing::debug;
use tokio_util::sync::CancellationToken;

use crate::permutation::{Direction, PermutationEngine};

/// Per-call codec switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecOptions<'a> {
    /// Spread blocks across the rayon pool.
    pub parallel: bool,
    /// Polled once per round; a fired token aborts the whole call.
    pub cancel: Option<&'a CancellationToken>,
}

/// Reject buffers that do not split into whole blocks.
pub fn check_alignment(len: usize, block_size: usize) -> SlothResult<()> {
    if block_size == 0 || len % block_size != 0 {
        return Err(SlothError::invalid_input(format!(
            "data length {len} is not a multiple of block size {block_size}"
        )));
    }
    Ok(())
}

/// Forward pass over every block of `data`.
pub fn encode(engine: &PermutationEngine, rounds: u64, data: &[u8], opts: CodecOptions<'_>) -> SlothResult<Vec<u8>> {
    apply(engine, Direction::Forward, rounds, data, opts)
}

/// Backward pass over every block of `encoded`.
pub fn decode(engine: &PermutationEngine, rounds: u64, encoded: &[u8], opts: CodecOptions<'_>) -> SlothResult<Vec<u8>> {
    apply(engine, Direction::Backward, rounds, encoded, opts)
}

/// Apply `direction` to each block, concatenating results.
pub fn apply(
    engine: &PermutationEngine,
    direction: Direction,
    rounds: u64,
    data: &[u8],
    opts: CodecOptions<'_>,
) -> SlothResult<Vec<u8>> {
    let bs = engine.block_size();
    check_alignment(data.len(), bs)?;
    let blocks = data.len() / bs;
    debug!(?direction, blocks, rounds, parallel = opts.parallel, "applying permutation");

    let mut out = vec![0u8; data.len()];
    if opts.parallel && blocks > 1 {
        data.par_chunks(bs)
            .zip(out.par_chunks_mut(bs))
            .try_for_each(|(src, dst)| engine.apply_block(direction, rounds, src, dst, opts.cancel))?;
    } else {
        for (src, dst) in data.chunks(bs).zip(out.chunks_mut(bs)) {
            engine.apply_block(direction, rounds, src, dst, opts.cancel)?;
        }
    }
    Ok(out)
}
