//! Background reconciliation configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::storage::ReconcilerConfig;

/// Retry policy for pushing fallback copies back to the primary store
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    /// How often due retries are checked, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Delay after the first failed attempt, in milliseconds
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Upper bound on the retry delay, in milliseconds
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// Failed attempts before a learner is reported as degraded
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,
}

impl ReconciliationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.poll_interval_ms == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.initial_backoff_ms == 0 || self.initial_backoff_ms > self.max_backoff_ms {
            return Err(ValidationError::InvalidBackoff);
        }
        if self.retry_budget == 0 {
            return Err(ValidationError::InvalidRetryBudget);
        }
        Ok(())
    }

    /// Settings for the reconciler service
    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig::default()
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_backoff(
                Duration::from_millis(self.initial_backoff_ms),
                Duration::from_millis(self.max_backoff_ms),
            )
            .with_retry_budget(self.retry_budget)
    }
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            retry_budget: default_retry_budget(),
        }
    }
}

fn default_poll_interval() -> u64 {
    500
}

fn default_initial_backoff() -> u64 {
    500
}

fn default_max_backoff() -> u64 {
    30_000
}

fn default_retry_budget() -> u32 {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconciliation_defaults() {
        let config = ReconciliationConfig::default();
        assert!(config.validate().is_ok());

        let reconciler = config.reconciler_config();
        assert_eq!(reconciler.poll_interval, Duration::from_millis(500));
        assert_eq!(reconciler.max_backoff, Duration::from_secs(30));
        assert_eq!(reconciler.retry_budget, 8);
    }

    #[test]
    fn test_validation_backoff_order() {
        let config = ReconciliationConfig {
            initial_backoff_ms: 60_000,
            max_backoff_ms: 1_000,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidBackoff)));
    }

    #[test]
    fn test_validation_zero_budget() {
        let config = ReconciliationConfig {
            retry_budget: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
