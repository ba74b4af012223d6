//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `LEARNER_CONTEXT` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use learner_context::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod database;
mod error;
mod personalization;
mod reconciliation;
mod server;
mod storage;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use personalization::PersonalizationConfig;
pub use reconciliation::ReconciliationConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a runnable
/// development configuration with an in-memory primary store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Listener, logging and CORS
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Tiered store settings (fallback directory, primary timeout)
    #[serde(default)]
    pub storage: StorageConfig,

    /// Reconciliation retry policy
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,

    /// Recommendation limits
    #[serde(default)]
    pub personalization: PersonalizationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `LEARNER_CONTEXT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `LEARNER_CONTEXT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `LEARNER_CONTEXT__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("LEARNER_CONTEXT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid, or
    /// if `server.require_database` is set without a database URL.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.storage.validate()?;
        self.reconciliation.validate()?;
        self.personalization.validate()?;
        if self.server.require_database && !self.database.is_configured() {
            return Err(ValidationError::MissingRequired("DATABASE__URL"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "LEARNER_CONTEXT__DATABASE__URL",
        "LEARNER_CONTEXT__SERVER__PORT",
        "LEARNER_CONTEXT__SERVER__REQUIRE_DATABASE",
        "LEARNER_CONTEXT__STORAGE__PRIMARY_TIMEOUT_MS",
        "LEARNER_CONTEXT__RECONCILIATION__RETRY_BUDGET",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(!config.database.is_configured());
        assert_eq!(config.storage.primary_timeout_ms, 2000);
        assert_eq!(config.personalization.dashboard_top_n, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("LEARNER_CONTEXT__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("LEARNER_CONTEXT__SERVER__PORT", "3000");
        env::set_var("LEARNER_CONTEXT__STORAGE__PRIMARY_TIMEOUT_MS", "750");
        env::set_var("LEARNER_CONTEXT__RECONCILIATION__RETRY_BUDGET", "3");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.primary_timeout_ms, 750);
        assert_eq!(config.reconciliation.retry_budget, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_required_database_must_be_configured() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("LEARNER_CONTEXT__SERVER__REQUIRE_DATABASE", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.server.require_database);
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("DATABASE__URL"))
        ));
    }
}
