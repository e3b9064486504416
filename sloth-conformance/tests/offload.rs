use std::sync::Arc;

use sloth_conformance::*;
use sloth_vdf::{offload, CancellationToken, SlothError};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_offloaded_calls() {
    let handle = Arc::new(reference_handle());
    let data = reference_data();

    let jobs: Vec<_> = (0..4)
        .map(|_| tokio::spawn(offload::encode(Arc::clone(&handle), REFERENCE_ROUNDS, data.clone())))
        .collect();
    let expected = REFERENCE_ENCODED_BLOCK_HEX.repeat(2);
    for job in jobs {
        let encoded = job.await.unwrap().unwrap();
        assert_eq!(hex::encode(&encoded), expected);
    }
}

#[tokio::test]
async fn verify_and_decode_offloaded() {
    let handle = Arc::new(reference_handle());
    let data = reference_data();
    let encoded = hex::decode(REFERENCE_ENCODED_BLOCK_HEX.repeat(2)).unwrap();
    assert!(offload::verify(Arc::clone(&handle), REFERENCE_ROUNDS, data.clone(), encoded.clone()).await.unwrap());
    assert_eq!(offload::decode(handle, REFERENCE_ROUNDS, encoded).await.unwrap(), data);
}

#[tokio::test]
async fn pre_cancelled_token_aborts() {
    let handle = Arc::new(reference_handle());
    let token = CancellationToken::new();
    token.cancel();
    let err = offload::encode_cancellable(handle, 1_000, reference_data(), token).await.unwrap_err();
    assert!(matches!(err, SlothError::Interrupted { round: 0 }));
}
