#![forbid(unsafe_code)]

//! Async adapters that move passes onto tokio's blocking pool.
//!
//! Encoding is pure CPU work with no yield point, so running it on an async
//! worker would stall every other task scheduled there. These helpers take an
//! `Arc<EngineHandle>` and an owned buffer, run the call on
//! [`tokio::task::spawn_blocking`] and hand back the result.

use std::sync::Arc;

use sloth_core::{SlothError, SlothResult};
use tokio::task::{self, JoinError};
use tokio_util::sync::CancellationToken;

use crate::handle::EngineHandle;

fn join_error(err: JoinError) -> SlothError {
    SlothError::Worker { message: err.to_string() }
}

pub async fn encode(handle: Arc<EngineHandle>, rounds: u64, data: Vec<u8>) -> SlothResult<Vec<u8>> {
    task::spawn_blocking(move || handle.encode(rounds, &data)).await.map_err(join_error)?
}

pub async fn decode(handle: Arc<EngineHandle>, rounds: u64, data: Vec<u8>) -> SlothResult<Vec<u8>> {
    task::spawn_blocking(move || handle.decode(rounds, &data)).await.map_err(join_error)?
}

/// Encode on the blocking pool, aborting between rounds once `cancel` fires.
pub async fn encode_cancellable(
    handle: Arc<EngineHandle>,
    rounds: u64,
    data: Vec<u8>,
    cancel: CancellationToken,
) -> SlothResult<Vec<u8>> {
    task::spawn_blocking(move || handle.encode_cancellable(rounds, &data, &cancel))
        .await
        .map_err(join_error)?
}

pub async fn verify(handle: Arc<EngineHandle>, rounds: u64, data: Vec<u8>, encoded: Vec<u8>) -> SlothResult<bool> {
    task::spawn_blocking(move || handle.verify_proof(rounds, &data, &encoded))
        .await
        .map_err(join_error)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Duration;

    fn handle() -> Arc<EngineHandle> {
        Arc::new(EngineHandle::instantiate(&[0x5au8; 64], 64).unwrap())
    }

    #[tokio::test]
    async fn offloaded_round_trip() {
        let handle = handle();
        let data = vec![0x01u8; 128];
        let enc = encode(Arc::clone(&handle), 15, data.clone()).await.unwrap();
        assert!(verify(Arc::clone(&handle), 15, data.clone(), enc.clone()).await.unwrap());
        assert_eq!(decode(handle, 15, enc).await.unwrap(), data);
    }

    #[tokio::test]
    async fn cancel_from_async_side() {
        let handle = handle();
        let token = CancellationToken::new();
        let job = tokio::spawn(encode_cancellable(handle, 10_000_000, vec![0u8; 64], token.clone()));
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
        let err = job.await.unwrap().unwrap_err();
        assert!(matches!(err, SlothError::Interrupted { .. }));
    }

    #[tokio::test]
    async fn released_handle_reports_error() {
        let handle = handle();
        handle.release().unwrap();
        let err = encode(handle, 1, vec![0u8; 64]).await.unwrap_err();
        assert!(matches!(err, SlothError::AlreadyReleased));
    }
}
