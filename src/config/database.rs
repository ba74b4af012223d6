//! PostgreSQL settings for the primary context tier.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// An empty `url` keeps the primary tier in memory.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a query waits for a pooled connection
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,

    /// Apply `migrations/` before serving
    #[serde(default)]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_configured()
            && !self.url.starts_with("postgres://")
            && !self.url.starts_with("postgresql://")
        {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.max_connections == 0 || self.max_connections > 100 {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.acquire_timeout_ms == 0 {
            return Err(ValidationError::InvalidAcquireTimeout);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
            run_migrations: false,
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

// Below the primary store timeout, so a starved pool surfaces as a
// fallback write rather than a request timeout.
fn default_acquire_timeout_ms() -> u64 {
    1500
}
