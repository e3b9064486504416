//! Encode must stay far more expensive than decode and verify.

use std::time::Instant;

use sloth_conformance::*;
use sloth_vdf::measure_asymmetry;

#[test]
fn encode_much_slower_than_decode() {
    let handle = sequential_handle(&reference_seed(), REFERENCE_BLOCK_SIZE);
    let data = reference_data();
    for i in 0..5 {
        let report = measure_asymmetry(&handle, REFERENCE_ROUNDS, &data, 1).unwrap();
        assert!(
            report.ratio() > 100.0,
            "iteration {}: encode {:?} vs decode {:?} (ratio {:.1})",
            i + 1,
            report.encode,
            report.decode,
            report.ratio()
        );
    }
}

#[test]
fn encode_cost_grows_with_rounds() {
    let handle = sequential_handle(&reference_seed(), REFERENCE_BLOCK_SIZE);
    let data = reference_block();

    let start = Instant::now();
    handle.encode(50, &data).unwrap();
    let short = start.elapsed();

    let start = Instant::now();
    handle.encode(400, &data).unwrap();
    let long = start.elapsed();

    assert!(long > short, "400 rounds took {long:?}, 50 rounds took {short:?}");
}

#[test]
fn verify_costs_like_decode() {
    let handle = sequential_handle(&reference_seed(), REFERENCE_BLOCK_SIZE);
    let data = reference_data();
    let encoded = handle.encode(REFERENCE_ROUNDS, &data).unwrap();

    let start = Instant::now();
    handle.encode(REFERENCE_ROUNDS, &data).unwrap();
    let encode = start.elapsed();

    let start = Instant::now();
    assert!(handle.verify_proof(REFERENCE_ROUNDS, &data, &encoded).unwrap());
    let verify = start.elapsed();

    assert!(verify < encode, "verify {verify:?} should undercut encode {encode:?}");
}
