#![forbid(unsafe_code)]

//! Sloth delay function over arbitrary input.
//!
//! Everything is derived from the input bytes, so no key material has to be
//! shared between prover and verifier:
//!
//! 1. `n = bits / 8` bytes. The prime seed is the SHA-512 counter-mode
//!    expansion of the input under the label `sloth-prime`, fed to
//!    [`derive_prime`].
//! 2. The start value is the expansion under `sloth-input` with its top bit
//!    cleared, which keeps it below the prime.
//! 3. The witness is the forward chain of `iterations` rounds from the start
//!    value, `n` bytes big-endian. The final hash is SHA-512 of the witness.
//!
//! Verification checks the hash, runs the backward chain from the witness
//! and compares with the start value. It costs one squaring per round.

use num_bigint::BigUint;
use sha2::{Digest, Sha512};
use sloth_core::{SlothConfig, SlothError, SlothResult};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::permutation::PermutationEngine;
use crate::prime::{derive_prime, to_fixed_be, PrimeSearch};

/// Length of the final hash.
pub const HASH_SIZE: usize = 64;

/// `bits` must be a positive multiple of this.
pub const BITS_GRANULARITY: usize = 512;

const PRIME_LABEL: &[u8] = b"sloth-prime";
const INPUT_LABEL: &[u8] = b"sloth-input";

/// Output of [`Sloth::compute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayProof {
    /// Last value of the forward chain, `bits / 8` bytes big-endian.
    pub witness: Vec<u8>,
    /// SHA-512 of the witness.
    pub hash: [u8; HASH_SIZE],
}

/// Delay function keyed only by its input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sloth {
    search: PrimeSearch,
}

impl From<&SlothConfig> for Sloth {
    fn from(cfg: &SlothConfig) -> Self {
        Self { search: PrimeSearch::from(cfg) }
    }
}

impl Sloth {
    #[must_use]
    pub fn new(search: PrimeSearch) -> Self {
        Self { search }
    }

    /// Run `iterations` square-root rounds over `data`.
    pub fn compute(&self, data: &[u8], bits: usize, iterations: u64) -> SlothResult<DelayProof> {
        self.compute_inner(data, bits, iterations, None)
    }

    pub fn compute_cancellable(
        &self,
        data: &[u8],
        bits: usize,
        iterations: u64,
        cancel: &CancellationToken,
    ) -> SlothResult<DelayProof> {
        self.compute_inner(data, bits, iterations, Some(cancel))
    }

    fn compute_inner(
        &self,
        data: &[u8],
        bits: usize,
        iterations: u64,
        cancel: Option<&CancellationToken>,
    ) -> SlothResult<DelayProof> {
        let (engine, start) = self.setup(data, bits)?;
        let end = engine.forward(start, iterations, cancel)?;
        let witness = to_fixed_be(&end, engine.block_size());
        let mut hash = [0u8; HASH_SIZE];
        hash.copy_from_slice(&Sha512::digest(&witness));
        debug!(bits, iterations, "delay computed");
        Ok(DelayProof { witness, hash })
    }

    /// True iff `witness` and `hash` are what [`compute`](Self::compute)
    /// returns for the same `data`, `bits` and `iterations`.
    ///
    /// A bad `bits` value is an error; any mismatch in the proof is `false`.
    pub fn verify(&self, witness: &[u8], hash: &[u8], data: &[u8], bits: usize, iterations: u64) -> SlothResult<bool> {
        check_bits(bits)?;
        if witness.len() != bits / 8 || Sha512::digest(witness).as_slice() != hash {
            warn!(bits, iterations, "delay proof hash mismatch");
            return Ok(false);
        }
        let (engine, start) = self.setup(data, bits)?;
        let ok = match engine.backward(BigUint::from_bytes_be(witness), iterations, None) {
            Ok(back) => back == start,
            // witness outside the field
            Err(SlothError::InvalidInput { .. }) => false,
            Err(e) => return Err(e),
        };
        if !ok {
            warn!(bits, iterations, "delay proof rejected");
        }
        Ok(ok)
    }

    /// Prime and start value for `data`.
    fn setup(&self, data: &[u8], bits: usize) -> SlothResult<(PermutationEngine, BigUint)> {
        check_bits(bits)?;
        let n = bits / 8;
        let seed = expand(PRIME_LABEL, data, n);
        let engine = PermutationEngine::new(derive_prime(&seed, n, &self.search)?)?;
        let mut start = BigUint::from_bytes_be(&expand(INPUT_LABEL, data, n));
        start.set_bit(bits as u64 - 1, false);
        Ok((engine, start))
    }
}

fn check_bits(bits: usize) -> SlothResult<()> {
    if bits == 0 || bits % BITS_GRANULARITY != 0 {
        return Err(SlothError::invalid_input(format!(
            "bit size {bits} is not a positive multiple of {BITS_GRANULARITY}"
        )));
    }
    Ok(())
}

/// `SHA-512(label || counter || data)` blocks, counter big-endian u32, cut to `len`.
fn expand(label: &[u8], data: &[u8], len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + HASH_SIZE);
    let mut counter = 0u32;
    while out.len() < len {
        let mut hasher = Sha512::new();
        hasher.update(label);
        hasher.update(counter.to_be_bytes());
        hasher.update(data);
        out.extend_from_slice(&hasher.finalize());
        counter += 1;
    }
    out.truncate(len);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn honest_proof_verifies() {
        let sloth = Sloth::default();
        let proof = sloth.compute(b"123", 512, 10).unwrap();
        assert_eq!(proof.witness.len(), 64);
        assert!(sloth.verify(&proof.witness, &proof.hash, b"123", 512, 10).unwrap());
    }

    #[test]
    fn other_data_rejected() {
        let sloth = Sloth::default();
        let proof = sloth.compute(b"123", 512, 10).unwrap();
        assert!(!sloth.verify(&proof.witness, &proof.hash, b"1234", 512, 10).unwrap());
        assert!(!sloth.verify(&proof.witness, &proof.hash, b"123", 512, 11).unwrap());
    }

    #[test]
    fn tampered_hash_or_witness_rejected() {
        let sloth = Sloth::default();
        let proof = sloth.compute(b"abc", 512, 4).unwrap();
        let mut hash = proof.hash;
        hash[0] ^= 1;
        assert!(!sloth.verify(&proof.witness, &hash, b"abc", 512, 4).unwrap());
        assert!(!sloth.verify(&proof.witness[1..], &proof.hash, b"abc", 512, 4).unwrap());
        // consistent hash over a witness that is not in the field
        let forged = vec![0xffu8; 64];
        let forged_hash = Sha512::digest(&forged);
        assert!(!sloth.verify(&forged, &forged_hash, b"abc", 512, 4).unwrap());
    }

    #[test]
    fn deterministic() {
        let sloth = Sloth::default();
        assert_eq!(sloth.compute(b"x", 512, 3).unwrap(), sloth.compute(b"x", 512, 3).unwrap());
    }

    #[test]
    fn bad_bit_sizes() {
        let sloth = Sloth::default();
        for bits in [0, 256, 1000] {
            assert!(matches!(sloth.compute(b"123", bits, 1), Err(SlothError::InvalidInput { .. })));
            assert!(sloth.verify(&[], &[], b"123", bits, 1).is_err());
        }
    }

    #[test]
    fn expansion_is_counter_mode() {
        let out = expand(b"l", b"d", 100);
        assert_eq!(out.len(), 100);
        let mut first = Sha512::new();
        first.update(b"l");
        first.update(0u32.to_be_bytes());
        first.update(b"d");
        assert_eq!(&out[..64], first.finalize().as_slice());
    }

    #[test]
    fn cancelled_compute() {
        let token = CancellationToken::new();
        token.cancel();
        let err = Sloth::default().compute_cancellable(b"123", 512, 5, &token).unwrap_err();
        assert!(matches!(err, SlothError::Interrupted { round: 0 }));
    }
}
