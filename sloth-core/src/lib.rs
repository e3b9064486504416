#![forbid(unsafe_code)]

//! Shared building blocks for the sloth permutation crates: configuration and
//! the common error taxonomy.

pub mod config;
pub mod error;

pub use config::SlothConfig;
pub use error::{ErrorKind, SlothError, SlothResult};
