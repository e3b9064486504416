#![forbid(unsafe_code)]

//! Owned engine handle with a strict `Ready → Released` lifecycle.
//!
//! A handle exists only once its prime has been derived, so there is no
//! observable uninitialised state. Every operation takes `&self`, which lets
//! an `Arc<EngineHandle>` be shared by worker threads. Calls snapshot the
//! engine under a read lock and compute without holding it; `release` swaps
//! the slot to `Released` under the write lock. Calls already in flight
//! finish on their snapshot, later calls fail with
//! [`SlothError::AlreadyReleased`], and the prime is scrubbed when the last
//! snapshot drops.

use std::sync::{Arc, PoisonError, RwLock};

use sloth_core::{SlothConfig, SlothError, SlothResult};
use tracing::{debug, info};
use tokio_util::sync::CancellationToken;
use zeroize::Zeroizing;

use crate::codec::{self, CodecOptions};
use crate::permutation::PermutationEngine;
use crate::prime::{derive_prime, to_fixed_be, PrimeSearch};
use crate::verify;

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Ready,
    Released,
}

enum Slot {
    Ready(Arc<PermutationEngine>),
    Released,
}

pub struct EngineHandle {
    slot: RwLock<Slot>,
    block_size: usize,
    default_rounds: u64,
    parallel: bool,
}

impl EngineHandle {
    /// Derive the prime for `seed` with default settings.
    pub fn instantiate(seed: &[u8], block_size: usize) -> SlothResult<Self> {
        Self::with_config(seed, block_size, &SlothConfig::default())
    }

    /// Derive the prime for `seed` using the limits and defaults in `config`.
    ///
    /// `block_size` must be a positive multiple of `config.block_granularity`
    /// and `seed` must be exactly `block_size` bytes.
    pub fn with_config(seed: &[u8], block_size: usize, config: &SlothConfig) -> SlothResult<Self> {
        config.check_block_size(block_size)?;
        if seed.len() != block_size {
            return Err(SlothError::invalid_input(format!(
                "seed length {} does not match block size {block_size}",
                seed.len()
            )));
        }
        let prime = derive_prime(seed, block_size, &PrimeSearch::from(config))?;
        let engine = PermutationEngine::new(prime)?;
        debug!(block_size, "engine handle ready");
        Ok(Self {
            slot: RwLock::new(Slot::Ready(Arc::new(engine))),
            block_size,
            default_rounds: config.rounds,
            parallel: config.parallel_blocks,
        })
    }

    /// Override the rounds used by [`encode_default`](Self::encode_default)
    /// and [`decode_default`](Self::decode_default).
    #[must_use]
    pub fn with_rounds(mut self, rounds: u64) -> Self {
        self.default_rounds = rounds;
        self
    }

    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[must_use]
    pub fn default_rounds(&self) -> u64 {
        self.default_rounds
    }

    #[must_use]
    pub fn state(&self) -> HandleState {
        match &*self.slot.read().unwrap_or_else(PoisonError::into_inner) {
            Slot::Ready(_) => HandleState::Ready,
            Slot::Released => HandleState::Released,
        }
    }

    fn engine(&self) -> SlothResult<Arc<PermutationEngine>> {
        match &*self.slot.read().unwrap_or_else(PoisonError::into_inner) {
            Slot::Ready(engine) => Ok(Arc::clone(engine)),
            Slot::Released => Err(SlothError::AlreadyReleased),
        }
    }

    fn options<'a>(&self, cancel: Option<&'a CancellationToken>) -> CodecOptions<'a> {
        CodecOptions { parallel: self.parallel, cancel }
    }

    /// Slow direction: `rounds` square-root rounds per block.
    pub fn encode(&self, rounds: u64, data: &[u8]) -> SlothResult<Vec<u8>> {
        codec::encode(&*self.engine()?, rounds, data, self.options(None))
    }

    /// Fast direction: `rounds` squaring rounds per block.
    pub fn decode(&self, rounds: u64, data: &[u8]) -> SlothResult<Vec<u8>> {
        codec::decode(&*self.engine()?, rounds, data, self.options(None))
    }

    pub fn encode_cancellable(&self, rounds: u64, data: &[u8], cancel: &CancellationToken) -> SlothResult<Vec<u8>> {
        codec::encode(&*self.engine()?, rounds, data, self.options(Some(cancel)))
    }

    pub fn decode_cancellable(&self, rounds: u64, data: &[u8], cancel: &CancellationToken) -> SlothResult<Vec<u8>> {
        codec::decode(&*self.engine()?, rounds, data, self.options(Some(cancel)))
    }

    pub fn encode_default(&self, data: &[u8]) -> SlothResult<Vec<u8>> {
        self.encode(self.default_rounds, data)
    }

    pub fn decode_default(&self, data: &[u8]) -> SlothResult<Vec<u8>> {
        self.decode(self.default_rounds, data)
    }

    /// True iff `encoded` is the `rounds`-round encoding of `data`.
    /// Costs one decode, never an encode.
    pub fn verify_proof(&self, rounds: u64, data: &[u8], encoded: &[u8]) -> SlothResult<bool> {
        verify::verify_proof(&*self.engine()?, rounds, data, encoded, self.parallel)
    }

    /// The derived prime, big-endian and `block_size` bytes long.
    pub fn prime_bytes(&self) -> SlothResult<Zeroizing<Vec<u8>>> {
        let engine = self.engine()?;
        Ok(Zeroizing::new(to_fixed_be(engine.field().modulus(), self.block_size)))
    }

    /// Discard the prime. A second call fails.
    pub fn release(&self) -> SlothResult<()> {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *slot, Slot::Released) {
            Slot::Ready(engine) => {
                drop(engine);
                info!(block_size = self.block_size, "engine handle released");
                Ok(())
            }
            Slot::Released => Err(SlothError::AlreadyReleased),
        }
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("block_size", &self.block_size)
            .field("default_rounds", &self.default_rounds)
            .field("state", &self.state())
            .finish()
    }
}
