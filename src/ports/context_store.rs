//! Context Store Port - Durable multi-tier persistence for learner contexts.

use async_trait::async_trait;
use serde::Serialize;

use super::context_tier::TierKind;
use crate::domain::foundation::{DomainError, ErrorCode, LearnerId};
use crate::domain::learner::UserContext;

/// Errors surfaced by the context store
#[derive(Debug, thiserror::Error)]
pub enum ContextStoreError {
    #[error("No context stored for learner {0}")]
    NotFound(LearnerId),

    #[error("Every tier failed for learner {learner_id}: {reason}")]
    AllTiersFailed { learner_id: LearnerId, reason: String },
}

impl From<ContextStoreError> for DomainError {
    fn from(err: ContextStoreError) -> Self {
        match err {
            ContextStoreError::NotFound(learner_id) => DomainError::learner_not_found(learner_id),
            ContextStoreError::AllTiersFailed { learner_id, reason } => DomainError::new(
                ErrorCode::StoreUnavailable,
                "Learner context storage is unavailable",
            )
            .with_detail("learner_id", learner_id.to_string())
            .with_detail("reason", reason),
        }
    }
}

/// A context read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSnapshot {
    pub context: UserContext,
    /// Tier that answered the read.
    pub source: TierKind,
    /// Set when the copy came from the file fallback because the primary
    /// store could not confirm it.
    pub stale: bool,
    /// Set on stale reads while reconciliation for this learner has used up
    /// its retry budget.
    pub degraded: bool,
}

impl ContextSnapshot {
    /// A copy confirmed by the cache or the primary store.
    pub fn current(context: UserContext, source: TierKind) -> Self {
        Self {
            context,
            source,
            stale: false,
            degraded: false,
        }
    }

    /// A copy served from the file fallback.
    pub fn fallback(context: UserContext, degraded: bool) -> Self {
        Self {
            context,
            source: TierKind::File,
            stale: true,
            degraded,
        }
    }
}

/// Where a write ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PutReceipt {
    /// `Primary` on success, `File` when the primary write failed and a
    /// reconciliation is pending.
    pub tier: TierKind,
    /// Set while reconciliation for this learner has used up its retry
    /// budget without reaching the primary store.
    pub degraded: bool,
}

impl PutReceipt {
    pub fn primary() -> Self {
        Self {
            tier: TierKind::Primary,
            degraded: false,
        }
    }
}

/// Port for the tiered context store
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Read a context: cache, then primary, then file fallback.
    ///
    /// # Errors
    /// Returns `ContextStoreError::NotFound` if no tier holds a copy
    async fn get(&self, learner_id: &LearnerId) -> Result<ContextSnapshot, ContextStoreError>;

    /// Write a context through the cache to the primary store, falling back
    /// to the file tier when the primary write fails.
    ///
    /// # Errors
    /// Returns `ContextStoreError::AllTiersFailed` only when neither the
    /// primary nor the file tier accepted the write
    async fn put(&self, context: &UserContext) -> Result<PutReceipt, ContextStoreError>;

    /// The cached copy, without any I/O.
    fn cached(&self, learner_id: &LearnerId) -> Option<UserContext>;
}
