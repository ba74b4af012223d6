//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid listen host: {0}")]
    InvalidHost(String),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool max_connections must be between 1 and 100")]
    InvalidPoolSize,

    #[error("Connection acquire timeout must be positive")]
    InvalidAcquireTimeout,

    #[error("Primary store timeout must be between 1 and 60000 ms")]
    InvalidPrimaryTimeout,

    #[error("Invalid reconciliation backoff: initial must be positive and not exceed max")]
    InvalidBackoff,

    #[error("Reconciliation retry budget must be at least 1")]
    InvalidRetryBudget,

    #[error("Widget limit for {0} must be between 1 and 20")]
    InvalidWidgetLimit(&'static str),
}
