#![no_main]
use libfuzzer_sys::fuzz_target;
use num_bigint::BigUint;
use sloth_vdf::{verify, PermutationEngine};

fuzz_target!(|input: (u8, Vec<u8>, Vec<u8>)| {
    let (rounds, data, encoded) = input;
    let Ok(engine) = PermutationEngine::from_modulus(BigUint::from(1019u32), 2) else {
        return;
    };
    let rounds = u64::from(rounds % 32);
    // arbitrary pairs must never panic; an accepted pair must re-encode to itself
    if let Ok(true) = verify::verify_proof(&engine, rounds, &data, &encoded, false) {
        let again: Vec<u8> = data
            .chunks(2)
            .flat_map(|block| engine.encode_block(rounds, block).expect("verified block"))
            .collect();
        assert_eq!(again, encoded);
    }
});
