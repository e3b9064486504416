#![forbid(unsafe_code)]

//! Common error type for sloth crates.
//!
//! Every failure is local to one call. Nothing is retried or corrected
//! internally; a corrupted delay proof is worse than a loud error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlothError {
    /// Caller supplied malformed input (length mismatch, misaligned buffer,
    /// block value outside the field).
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Prime search exhausted its probe budget.
    #[error("Prime generation failed after {probes} probes")]
    GenerationFailed { probes: u64 },

    /// Operation attempted on a released handle.
    #[error("Engine handle already released")]
    AlreadyReleased,

    /// Forward or backward pass aborted through a cancellation token.
    /// Any partial output has been discarded.
    #[error("Operation interrupted at round {round}")]
    Interrupted { round: u64 },

    /// I/O related failures.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration parsing failures.
    #[error("Config parse error: {0}")]
    ConfigParse(toml::de::Error),

    /// Configuration parsed but holds unusable values.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Blocking worker failed to deliver a result.
    #[error("Worker error: {message}")]
    Worker { message: String },
}

/// Coarse error category, mirrors the variants above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Generation,
    Lifecycle,
    Cancellation,
    Configuration,
    Internal,
}

impl SlothError {
    /// Shorthand for [`SlothError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        SlothError::InvalidInput { message: message.into() }
    }

    /// Shorthand for [`SlothError::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        SlothError::Config { message: message.into() }
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            SlothError::InvalidInput { .. } => ErrorKind::Input,
            SlothError::GenerationFailed { .. } => ErrorKind::Generation,
            SlothError::AlreadyReleased => ErrorKind::Lifecycle,
            SlothError::Interrupted { .. } => ErrorKind::Cancellation,
            SlothError::ConfigParse(_) | SlothError::Config { .. } => ErrorKind::Configuration,
            SlothError::Io(_) | SlothError::Worker { .. } => ErrorKind::Internal,
        }
    }
}

/// Convenient alias for results throughout sloth crates.
pub type SlothResult<T> = Result<T, SlothError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            SlothError::invalid_input("data length 65 is not a multiple of 64").to_string(),
            "Invalid input: data length 65 is not a multiple of 64"
        );
        assert_eq!(
            SlothError::GenerationFailed { probes: 10 }.to_string(),
            "Prime generation failed after 10 probes"
        );
        assert_eq!(SlothError::AlreadyReleased.to_string(), "Engine handle already released");
        assert_eq!(
            SlothError::Interrupted { round: 3 }.to_string(),
            "Operation interrupted at round 3"
        );
    }

    #[test]
    fn kinds() {
        assert_eq!(SlothError::AlreadyReleased.kind(), ErrorKind::Lifecycle);
        assert_eq!(SlothError::config("x").kind(), ErrorKind::Configuration);
        assert_eq!(SlothError::Interrupted { round: 0 }.kind(), ErrorKind::Cancellation);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(SlothError::from(io).kind(), ErrorKind::Internal);
    }
}
