//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction and patch validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' accepts at most {max} entries, got {actual}")]
    TooMany {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("Field '{field}' has invalid value '{value}', expected one of: {allowed}")]
    NotAllowed {
        field: String,
        value: String,
        allowed: String,
    },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField {
            field: field.into(),
        }
    }

    /// Creates a too-many-entries validation error.
    pub fn too_many(field: impl Into<String>, max: usize, actual: usize) -> Self {
        ValidationError::TooMany {
            field: field.into(),
            max,
            actual,
        }
    }

    /// Creates a not-allowed (enum mismatch) validation error.
    pub fn not_allowed(
        field: impl Into<String>,
        value: impl Into<String>,
        allowed: &[&str],
    ) -> Self {
        ValidationError::NotAllowed {
            field: field.into(),
            value: value.into(),
            allowed: allowed.join(", "),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::EmptyField { field }
            | Self::TooMany { field, .. }
            | Self::NotAllowed { field, .. } => field,
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,

    // Not found errors
    LearnerNotFound,

    // Storage errors
    StoreUnavailable,
    ReconciliationFailure,

    // Infrastructure errors
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::LearnerNotFound => "LEARNER_NOT_FOUND",
            ErrorCode::StoreUnavailable => "STORE_UNAVAILABLE",
            ErrorCode::ReconciliationFailure => "RECONCILIATION_FAILURE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// Creates a not-found error for a learner.
    pub fn learner_not_found(learner_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::LearnerNotFound,
            format!("No learner record for '{}'", learner_id),
        )
        .with_detail("learner_id", learner_id.to_string())
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        DomainError::validation(field, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("learner_id");
        assert_eq!(format!("{}", err), "Field 'learner_id' cannot be empty");
    }

    #[test]
    fn validation_error_not_allowed_lists_choices() {
        let err = ValidationError::not_allowed("skill_level", "expert", &["beginner", "advanced"]);
        assert_eq!(
            format!("{}", err),
            "Field 'skill_level' has invalid value 'expert', expected one of: beginner, advanced"
        );
    }

    #[test]
    fn validation_error_converts_to_domain_error_with_field_detail() {
        let err: DomainError = ValidationError::too_many("goals", 10, 12).into();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("field"), Some(&"goals".to_string()));
        assert!(err.message().contains("at most 10"));
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::StoreUnavailable, "primary down");
        assert_eq!(format!("{}", err), "[STORE_UNAVAILABLE] primary down");
    }

    #[test]
    fn learner_not_found_carries_id() {
        let err = DomainError::learner_not_found("u9");
        assert_eq!(err.code(), ErrorCode::LearnerNotFound);
        assert_eq!(err.details.get("learner_id"), Some(&"u9".to_string()));
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(format!("{}", ErrorCode::LearnerNotFound), "LEARNER_NOT_FOUND");
        assert_eq!(format!("{}", ErrorCode::InternalError), "INTERNAL_ERROR");
    }
}
