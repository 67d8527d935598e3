// bitcoin-crypto/src/config.rs
use crate::{CryptoError, CryptoResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of SHA-512 passes over the random seed
pub const DEFAULT_SEED_STRETCHING: i64 = 30_000;

/// Default number of bytes drawn from the scheduler jitter collector
pub const DEFAULT_JITTER_BYTES: usize = 24;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    pub random: RandomConfig,
    pub keys: KeyConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomConfig {
    /// SHA-512 passes used to stretch the seed. Negative values count as 0,
    /// and 0 turns stretching off.
    pub seed_stretching: i64,
    pub jitter_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub compressed_public_keys: bool,
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            seed_stretching: DEFAULT_SEED_STRETCHING,
            jitter_bytes: DEFAULT_JITTER_BYTES,
        }
    }
}

impl RandomConfig {
    pub fn with_seed_stretching(seed_stretching: i64) -> Self {
        Self {
            seed_stretching,
            ..Self::default()
        }
    }

    /// Stretching rounds with negative values clamped to zero
    pub fn stretching_rounds(&self) -> u64 {
        self.seed_stretching.max(0) as u64
    }
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            compressed_public_keys: true,
        }
    }
}

impl CryptoConfig {
    pub fn from_toml_str(contents: &str) -> CryptoResult<Self> {
        toml::from_str(contents).map_err(|e| CryptoError::ConfigError(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> CryptoResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CryptoError::ConfigError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> CryptoResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| CryptoError::ConfigError(e.to_string()))?;
        std::fs::write(path.as_ref(), contents)
            .map_err(|e| CryptoError::ConfigError(e.to_string()))?;
        Ok(())
    }
}
