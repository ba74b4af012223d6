//! Context Tier Port - One storage layer of the learner context store.
//!
//! The tiered store is assembled from three of these: an in-memory cache,
//! the primary durable store, and a local file fallback.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

use crate::domain::foundation::{LearnerId, Timestamp};
use crate::domain::learner::UserContext;

/// Which layer a tier implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    Cache,
    Primary,
    File,
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cache => "cache",
            Self::Primary => "primary",
            Self::File => "file",
        };
        write!(f, "{}", s)
    }
}

/// Errors that can occur in a single tier
#[derive(Debug, thiserror::Error)]
pub enum TierError {
    #[error("{tier} tier unavailable: {reason}")]
    Unavailable { tier: TierKind, reason: String },

    #[error("{tier} tier timed out after {millis}ms")]
    Timeout { tier: TierKind, millis: u64 },

    #[error("Failed to serialize context: {0}")]
    Serialization(String),

    #[error("Stored context for {learner_id} is corrupt: {reason}")]
    Corrupt { learner_id: LearnerId, reason: String },

    #[error("IO error: {0}")]
    Io(String),
}

impl TierError {
    pub fn unavailable(tier: TierKind, reason: impl fmt::Display) -> Self {
        Self::Unavailable {
            tier,
            reason: reason.to_string(),
        }
    }
}

/// Result of a write that a tier may decline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The incoming context is now the stored copy.
    Applied,
    /// A copy with a later `lastUpdated` was already stored and was kept.
    KeptNewer,
}

/// Port for one storage layer
#[async_trait]
pub trait ContextTier: Send + Sync {
    fn kind(&self) -> TierKind;

    /// Load the stored context, `None` when the tier has no copy.
    async fn load(&self, learner_id: &LearnerId) -> Result<Option<UserContext>, TierError>;

    /// Store a context. Tiers that compare versions keep whichever copy has
    /// the later `lastUpdated`.
    async fn store(&self, context: &UserContext) -> Result<StoreOutcome, TierError>;

    /// Remove the stored copy. Removing an absent copy succeeds.
    async fn remove(&self, learner_id: &LearnerId) -> Result<(), TierError>;

    /// Remove the stored copy only when it is not newer than `version`.
    ///
    /// Returns `true` when nothing newer remains.
    async fn remove_if_not_newer(
        &self,
        learner_id: &LearnerId,
        version: Timestamp,
    ) -> Result<bool, TierError> {
        match self.load(learner_id).await {
            Ok(Some(stored)) if stored.last_updated().is_after(&version) => Ok(false),
            Ok(_) | Err(TierError::Corrupt { .. }) => {
                self.remove(learner_id).await?;
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }

    /// Every learner with a stored copy.
    async fn list(&self) -> Result<Vec<LearnerId>, TierError>;
}
