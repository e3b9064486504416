#![forbid(unsafe_code)]

//! Sloth verifiable-delay permutation.
//!
//! A keyed permutation over fixed-size blocks: encoding applies a chain of
//! modular square roots and is deliberately slow and sequential, decoding
//! squares back and is cheap. A verifier confirms an (original, encoded) pair
//! by decoding only, never repeating the slow direction.
//!
//! ```rust,no_run
//! use sloth_vdf::EngineHandle;
//!
//! let seed = [7u8; 64];
//! let handle = EngineHandle::instantiate(&seed, 64).unwrap();
//! let data = [0u8; 128];
//! let encoded = handle.encode(100, &data).unwrap();
//! assert!(handle.verify_proof(100, &data, &encoded).unwrap());
//! assert_eq!(handle.decode(100, &encoded).unwrap(), data);
//! handle.release().unwrap();
//! ```

pub mod field;
pub mod prime;
pub mod permutation;
pub mod codec;
pub mod verify;
pub mod handle;
pub mod calib;
pub mod sloth;
pub mod offload;

pub use tokio_util::sync::CancellationToken;
pub use calib::{calibrate_rounds, measure_asymmetry, AsymmetryReport};
pub use handle::{EngineHandle, HandleState};
pub use permutation::{Direction, PermutationEngine};
pub use prime::{derive_prime, Prime, PrimeSearch};
pub use sloth::{DelayProof, Sloth};
pub use sloth_core::{SlothConfig, SlothError, SlothResult};
