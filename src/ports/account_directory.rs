//! Account Directory Port - Presence check against the account collaborator.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, LearnerId};

/// Errors from the account directory
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("No account for learner {0}")]
    NotFound(LearnerId),

    #[error("Account directory unavailable: {0}")]
    Unavailable(String),
}

impl From<AccountError> for DomainError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(learner_id) => DomainError::learner_not_found(learner_id),
            AccountError::Unavailable(reason) => {
                DomainError::new(ErrorCode::StoreUnavailable, "Account directory unavailable")
                    .with_detail("reason", reason)
            }
        }
    }
}

/// Port answering whether a learner id belongs to a known account
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// # Errors
    /// Returns `AccountError::NotFound` for an unknown learner
    async fn ensure_exists(&self, learner_id: &LearnerId) -> Result<(), AccountError>;
}
