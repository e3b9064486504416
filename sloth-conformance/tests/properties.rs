//! Property-based checks of the permutation.
//!
//! - decode inverts encode for any in-field data and round count
//! - encode/decode are deterministic
//! - verification accepts honest pairs and rejects single-byte tampering
//! - zero rounds is the identity

use proptest::prelude::*;
use sloth_conformance::{reference_handle, REFERENCE_BLOCK_SIZE};

/// Blocks whose top byte is below 0x80 are always under the reference prime.
fn data_strategy(max_blocks: usize) -> impl Strategy<Value = Vec<u8>> {
    (1..=max_blocks).prop_flat_map(|blocks| {
        prop::collection::vec(any::<u8>(), blocks * REFERENCE_BLOCK_SIZE).prop_map(|mut v| {
            for block in v.chunks_mut(REFERENCE_BLOCK_SIZE) {
                block[0] &= 0x7f;
            }
            v
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn decode_inverts_encode(data in data_strategy(4), rounds in 0u64..24) {
        let handle = reference_handle();
        let encoded = handle.encode(rounds, &data).unwrap();
        prop_assert_eq!(encoded.len(), data.len());
        prop_assert_eq!(handle.decode(rounds, &encoded).unwrap(), data);
    }

    #[test]
    fn encoding_is_deterministic(data in data_strategy(2), rounds in 1u64..16) {
        let handle = reference_handle();
        let first = handle.encode(rounds, &data).unwrap();
        let second = handle.encode(rounds, &data).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(handle.decode(rounds, &first).unwrap(), handle.decode(rounds, &second).unwrap());
    }

    #[test]
    fn verification_detects_tampering(
        data in data_strategy(3),
        rounds in 1u64..16,
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let handle = reference_handle();
        let encoded = handle.encode(rounds, &data).unwrap();
        prop_assert!(handle.verify_proof(rounds, &data, &encoded).unwrap());

        let mut tampered = encoded.clone();
        let pos = index.index(tampered.len());
        tampered[pos] ^= 1 << bit;
        prop_assert!(!handle.verify_proof(rounds, &data, &tampered).unwrap());
    }

    #[test]
    fn zero_rounds_is_identity(data in data_strategy(3)) {
        let handle = reference_handle();
        prop_assert_eq!(&handle.encode(0, &data).unwrap(), &data);
        prop_assert_eq!(&handle.decode(0, &data).unwrap(), &data);
    }
}
