#![forbid(unsafe_code)]

//! Sloth configuration handling. Parses a TOML file into a strongly-typed structure; every key is
//! optional and falls back to the defaults below.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::debug;

use crate::{SlothError, SlothResult};

/// Primary configuration structure shared across sloth components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlothConfig {
    /// Block size in bytes used when the caller does not pick one.
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Block sizes must be a positive multiple of this many bytes.
    #[serde(default = "default_block_granularity")]
    pub block_granularity: usize,

    /// Default number of rounds.
    pub rounds: u64,

    /// Upper bound on candidates tested while searching for a prime.
    pub max_prime_probes: u64,

    /// Miller-Rabin rounds run on top of the base-2 check.
    pub primality_rounds: u32,

    /// Process the blocks of one call on the rayon pool.
    pub parallel_blocks: bool,

    /// Logging verbosity (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: Option<String>,
}

impl Default for SlothConfig {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            block_granularity: default_block_granularity(),
            rounds: 100,
            max_prime_probes: 100_000,
            primality_rounds: 32,
            parallel_blocks: true,
            log_level: Some("info".to_string()),
        }
    }
}

fn default_block_size() -> usize {
    64
}

fn default_block_granularity() -> usize {
    64
}

impl SlothConfig {
    /// Load a configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SlothResult<Self> {
        let data = fs::read_to_string(&path).map_err(SlothError::from)?;
        let cfg = Self::from_toml_str(&data)?;
        debug!(path = %path.as_ref().display(), "loaded configuration");
        Ok(cfg)
    }

    /// Load config alias version
    pub fn load<P: AsRef<Path>>(path: P) -> SlothResult<Self> {
        Self::from_file(path)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(data: &str) -> SlothResult<Self> {
        let cfg = toml::from_str::<SlothConfig>(data).map_err(SlothError::ConfigParse)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that the values are usable together.
    pub fn validate(&self) -> SlothResult<()> {
        if self.block_granularity == 0 {
            return Err(SlothError::config("block_granularity must be positive"));
        }
        self.check_block_size(self.block_size)?;
        if self.max_prime_probes == 0 {
            return Err(SlothError::config("max_prime_probes must be positive"));
        }
        Ok(())
    }

    /// Reject block sizes that are zero or not aligned to the granularity.
    pub fn check_block_size(&self, block_size: usize) -> SlothResult<()> {
        if block_size == 0 || self.block_granularity == 0 || block_size % self.block_granularity != 0 {
            return Err(SlothError::invalid_input(format!(
                "block size {block_size} is not a positive multiple of {}",
                self.block_granularity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let cfg = SlothConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.block_size, 64);
        assert_eq!(cfg.rounds, 100);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rounds = 5\nparallel_blocks = false").unwrap();
        let cfg = SlothConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.rounds, 5);
        assert!(!cfg.parallel_blocks);
        assert_eq!(cfg.block_granularity, 64);
        assert_eq!(cfg.max_prime_probes, 100_000);
    }

    #[test]
    fn empty_document_uses_default_fns() {
        let cfg = SlothConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.block_size, default_block_size());
        assert_eq!(cfg.block_granularity, default_block_granularity());
        assert_eq!(cfg, SlothConfig::default());
    }

    #[test]
    fn misaligned_block_size_rejected() {
        let err = SlothConfig::from_toml_str("block_size = 96").unwrap_err();
        assert!(matches!(err, SlothError::InvalidInput { .. }));

        let cfg = SlothConfig::from_toml_str("block_size = 96\nblock_granularity = 32").unwrap();
        assert_eq!(cfg.block_size, 96);
    }

    #[test]
    fn zero_granularity_rejected() {
        let err = SlothConfig::from_toml_str("block_granularity = 0").unwrap_err();
        assert!(matches!(err, SlothError::Config { .. }));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = SlothConfig::from_toml_str("rounds = \"many\"").unwrap_err();
        assert!(matches!(err, SlothError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SlothConfig::load("/nonexistent/sloth.toml").unwrap_err();
        assert!(matches!(err, SlothError::Io(_)));
    }
}
