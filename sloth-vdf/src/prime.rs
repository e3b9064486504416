#![forbid(unsafe_code)]

//! Deterministic prime derivation from a seed.
//!
//! The seed is read as a big-endian integer `n` of `block_size` bytes and its
//! top bit is forced so the result is exactly `block_size` bytes wide. The
//! prime is the smallest `c > n` with `c ≡ 3 (mod 4)` that passes the
//! primality test: the search starts at the first value above `n` whose two
//! low bits are `11` and steps by 4.
//!
//! The primality test is trial division, a base-2 Miller-Rabin round, then a
//! configurable number of Miller-Rabin rounds with bases expanded from
//! SHA-256 of the candidate. No randomness is involved, so every machine
//! derives the same prime from the same seed.

use std::time::Instant;

use lazy_static::lazy_static;
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use sha2::{Digest, Sha256};
use sloth_core::{SlothConfig, SlothError, SlothResult};
use tracing::debug;
use zeroize::Zeroizing;

use crate::field::{scrub, PrimeField};

/// Candidates advance by this much so the low bits stay `11`.
pub const PROBE_STEP: u32 = 4;

lazy_static! {
    static ref SMALL_PRIMES: Vec<u32> = sieve(1000);
}

fn sieve(limit: usize) -> Vec<u32> {
    let mut composite = vec![false; limit];
    let mut primes = Vec::new();
    for i in 2..limit {
        if !composite[i] {
            primes.push(i as u32);
            let mut j = i * i;
            while j < limit {
                composite[j] = true;
                j += i;
            }
        }
    }
    primes
}

/// Search limits for [`derive_prime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimeSearch {
    pub max_probes: u64,
    pub primality_rounds: u32,
}

impl Default for PrimeSearch {
    fn default() -> Self {
        Self::from(&SlothConfig::default())
    }
}

impl From<&SlothConfig> for PrimeSearch {
    fn from(cfg: &SlothConfig) -> Self {
        Self { max_probes: cfg.max_prime_probes, primality_rounds: cfg.primality_rounds }
    }
}

/// A prime `p ≡ 3 (mod 4)` exactly `block_size` bytes wide.
pub struct Prime {
    value: BigUint,
    block_size: usize,
    probes: u64,
}

impl Prime {
    #[must_use]
    pub fn value(&self) -> &BigUint {
        &self.value
    }

    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of candidates tested before this prime was found.
    #[must_use]
    pub fn probes(&self) -> u64 {
        self.probes
    }

    /// Big-endian bytes, `block_size` long, wiped on drop.
    #[must_use]
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(to_fixed_be(&self.value, self.block_size))
    }

    /// Move the value into a [`PrimeField`], leaving nothing behind to scrub.
    pub fn into_field(mut self) -> SlothResult<PrimeField> {
        PrimeField::new(std::mem::take(&mut self.value))
    }
}

impl Drop for Prime {
    fn drop(&mut self) {
        scrub(&mut self.value);
    }
}

impl std::fmt::Debug for Prime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prime")
            .field("block_size", &self.block_size)
            .field("probes", &self.probes)
            .finish()
    }
}

/// Left-pad the big-endian encoding of `x` to `len` bytes.
pub(crate) fn to_fixed_be(x: &BigUint, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    write_fixed_be(x, &mut out);
    out
}

pub(crate) fn write_fixed_be(x: &BigUint, out: &mut [u8]) {
    let bytes = Zeroizing::new(x.to_bytes_be());
    out.fill(0);
    let take = bytes.len().min(out.len());
    let start = out.len() - take;
    out[start..].copy_from_slice(&bytes[bytes.len() - take..]);
}

/// Derive the prime for `seed`. `seed.len()` must equal `block_size`.
pub fn derive_prime(seed: &[u8], block_size: usize, search: &PrimeSearch) -> SlothResult<Prime> {
    if block_size == 0 {
        return Err(SlothError::invalid_input("block size must be positive"));
    }
    if seed.len() != block_size {
        return Err(SlothError::invalid_input(format!(
            "seed length {} does not match block size {block_size}",
            seed.len()
        )));
    }

    let start = Instant::now();
    let bits = block_size as u64 * 8;
    let mut candidate = BigUint::from_bytes_be(seed);
    candidate.set_bit(bits - 1, true);
    candidate += 1u32;
    let low = (&candidate & BigUint::from(3u8)).to_u32().unwrap_or(0);
    candidate += (3 + PROBE_STEP - low) % PROBE_STEP;

    let mut probes = 0u64;
    while probes < search.max_probes {
        if candidate.bits() > bits {
            // Ran off the top of the block width; no prime of this size left.
            break;
        }
        probes += 1;
        if is_probable_prime(&candidate, search.primality_rounds) {
            debug!(block_size, probes, elapsed_ms = start.elapsed().as_millis() as u64, "derived prime");
            return Ok(Prime { value: candidate, block_size, probes });
        }
        candidate += PROBE_STEP;
    }
    scrub(&mut candidate);
    Err(SlothError::GenerationFailed { probes })
}

/// Probabilistic primality check with deterministic bases.
#[must_use]
pub fn is_probable_prime(n: &BigUint, rounds: u32) -> bool {
    if *n < BigUint::from(2u8) {
        return false;
    }
    // small prime trial division (fast path)
    let small = n.to_u32();
    for &sp in SMALL_PRIMES.iter() {
        if small == Some(sp) {
            return true;
        }
        if (n % sp).is_zero() {
            return false;
        }
    }

    let one = BigUint::one();
    let nm1 = n - &one;
    // write n-1 = d * 2^s with d odd
    let mut d = nm1.clone();
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    if !miller_rabin(n, &nm1, &d, s, &BigUint::from(2u8)) {
        return false;
    }
    (0..rounds).all(|round| miller_rabin(n, &nm1, &d, s, &derived_base(n, round)))
}

fn miller_rabin(n: &BigUint, nm1: &BigUint, d: &BigUint, s: u32, a: &BigUint) -> bool {
    let one = BigUint::one();
    let mut x = a.modpow(d, n);
    if x == one || x == *nm1 {
        return true;
    }
    for _ in 1..s {
        x = (&x * &x) % n;
        if x == *nm1 {
            return true;
        }
    }
    false
}

/// Base in `[2, n-2]` expanded from SHA-256(n || round || block).
fn derived_base(n: &BigUint, round: u32) -> BigUint {
    let n_bytes = n.to_bytes_be();
    let want = n_bytes.len() + 8;
    let mut stream = Vec::with_capacity(want + 32);
    let mut block = 0u32;
    while stream.len() < want {
        let mut hasher = Sha256::new();
        hasher.update(&n_bytes);
        hasher.update(round.to_be_bytes());
        hasher.update(block.to_be_bytes());
        stream.extend_from_slice(&hasher.finalize());
        block += 1;
    }
    // n > 1000 here, so n - 3 is positive.
    let span = n - BigUint::from(3u8);
    BigUint::from_bytes_be(&stream) % span + BigUint::from(2u8)
}
