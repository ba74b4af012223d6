//! Context storage configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

/// Storage configuration for the tiered context store
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding file-fallback documents
    #[serde(default = "default_fallback_dir")]
    pub fallback_dir: PathBuf,

    /// Bound on a single primary store call, in milliseconds
    #[serde(default = "default_primary_timeout")]
    pub primary_timeout_ms: u64,
}

impl StorageConfig {
    pub fn primary_timeout(&self) -> Duration {
        Duration::from_millis(self.primary_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.fallback_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("STORAGE_FALLBACK_DIR"));
        }
        if self.primary_timeout_ms == 0 || self.primary_timeout_ms > 60_000 {
            return Err(ValidationError::InvalidPrimaryTimeout);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            fallback_dir: default_fallback_dir(),
            primary_timeout_ms: default_primary_timeout(),
        }
    }
}

fn default_fallback_dir() -> PathBuf {
    PathBuf::from("./data/learner_contexts")
}

fn default_primary_timeout() -> u64 {
    2000
}
