//! Recommendation limits

use serde::Deserialize;

use super::error::ValidationError;

const MAX_WIDGETS: usize = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct PersonalizationConfig {
    /// Widgets shown on the dashboard
    #[serde(default = "default_dashboard_top_n")]
    pub dashboard_top_n: usize,

    /// Widgets shown in the sidebar
    #[serde(default = "default_sidebar_top_n")]
    pub sidebar_top_n: usize,
}

impl PersonalizationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.dashboard_top_n == 0 || self.dashboard_top_n > MAX_WIDGETS {
            return Err(ValidationError::InvalidWidgetLimit("dashboard"));
        }
        if self.sidebar_top_n == 0 || self.sidebar_top_n > MAX_WIDGETS {
            return Err(ValidationError::InvalidWidgetLimit("sidebar"));
        }
        Ok(())
    }
}

impl Default for PersonalizationConfig {
    fn default() -> Self {
        Self {
            dashboard_top_n: default_dashboard_top_n(),
            sidebar_top_n: default_sidebar_top_n(),
        }
    }
}

fn default_dashboard_top_n() -> usize {
    5
}

fn default_sidebar_top_n() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personalization_defaults() {
        let config = PersonalizationConfig::default();
        assert_eq!(config.dashboard_top_n, 5);
        assert_eq!(config.sidebar_top_n, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_limits() {
        let config = PersonalizationConfig {
            sidebar_top_n: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidWidgetLimit("sidebar"))
        ));
    }
}
