#![forbid(unsafe_code)]

//! Cheap consistency check of an (original, encoded) pair.
//!
//! Only the squaring direction is run: `rounds` multiplications per block
//! instead of `rounds` exponentiations. A pair is accepted iff decoding every
//! encoded block reproduces the matching original block.

use num_bigint::BigUint;
use rayon::prelude::*;
use sloth_core::SlothResult;
use tracing::{debug, warn};

use crate::codec::check_alignment;
use crate::permutation::{Direction, PermutationEngine};
use crate::prime::to_fixed_be;

/// Check one block pair. Values outside the field never verify.
#[must_use]
pub fn verify_block(engine: &PermutationEngine, rounds: u64, block: &[u8], encoded_block: &[u8]) -> bool {
    let bs = engine.block_size();
    if block.len() != bs || encoded_block.len() != bs {
        return false;
    }
    let y = BigUint::from_bytes_be(encoded_block);
    match engine.run(Direction::Backward, y, rounds, None) {
        Ok(x) => to_fixed_be(&x, bs) == block,
        Err(_) => false,
    }
}

/// Verify that `encoded` is the `rounds`-round encoding of `data`.
///
/// Misaligned buffers are input errors; aligned buffers of different length
/// simply fail verification.
pub fn verify_proof(
    engine: &PermutationEngine,
    rounds: u64,
    data: &[u8],
    encoded: &[u8],
    parallel: bool,
) -> SlothResult<bool> {
    let bs = engine.block_size();
    check_alignment(data.len(), bs)?;
    check_alignment(encoded.len(), bs)?;
    if data.len() != encoded.len() {
        warn!(data = data.len(), encoded = encoded.len(), "proof length mismatch");
        return Ok(false);
    }

    let blocks = data.len() / bs;
    let ok = if parallel && blocks > 1 {
        data.par_chunks(bs)
            .zip(encoded.par_chunks(bs))
            .all(|(block, enc)| verify_block(engine, rounds, block, enc))
    } else {
        data.chunks(bs)
            .zip(encoded.chunks(bs))
            .all(|(block, enc)| verify_block(engine, rounds, block, enc))
    };
    if ok {
        debug!(blocks, rounds, "proof verified");
    } else {
        warn!(blocks, rounds, "proof rejected");
    }
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode, CodecOptions};

    fn engine() -> PermutationEngine {
        let p = (BigUint::from(1u8) << 127usize) - BigUint::from(1u8);
        PermutationEngine::from_modulus(p, 16).unwrap()
    }

    #[test]
    fn accepts_honest_encoding() {
        let engine = engine();
        let data: Vec<u8> = (0u8..48).map(|b| b & 0x3f).collect();
        let enc = encode(&engine, 12, &data, CodecOptions::default()).unwrap();
        assert!(verify_proof(&engine, 12, &data, &enc, false).unwrap());
        assert!(verify_proof(&engine, 12, &data, &enc, true).unwrap());
    }

    #[test]
    fn rejects_wrong_round_count() {
        let engine = engine();
        let data = vec![3u8; 16];
        let enc = encode(&engine, 12, &data, CodecOptions::default()).unwrap();
        assert!(!verify_proof(&engine, 11, &data, &enc, false).unwrap());
    }

    #[test]
    fn rejects_tampered_byte() {
        let engine = engine();
        let data = vec![9u8; 32];
        let mut enc = encode(&engine, 4, &data, CodecOptions::default()).unwrap();
        enc[20] ^= 0x01;
        assert!(!verify_proof(&engine, 4, &data, &enc, false).unwrap());
    }

    #[test]
    fn out_of_field_block_is_rejection_not_error() {
        let engine = engine();
        let data = vec![0u8; 16];
        assert!(!verify_proof(&engine, 1, &data, &[0xff; 16], false).unwrap());
    }

    #[test]
    fn length_handling() {
        let engine = engine();
        assert!(verify_proof(&engine, 1, &[0u8; 16], &[0u8; 17], false).is_err());
        assert!(!verify_proof(&engine, 1, &[0u8; 16], &[0u8; 32], false).unwrap());
        assert!(!verify_block(&engine, 1, &[0u8; 15], &[0u8; 16]));
    }
}
