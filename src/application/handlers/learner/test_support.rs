//! Shared fixtures for handler tests.

use std::sync::Arc;

use super::manager::UserContextManager;
use crate::adapters::accounts::InMemoryAccountDirectory;
use crate::adapters::storage::InMemoryContextTier;
use crate::domain::foundation::LearnerId;
use crate::domain::learner::UserContext;
use crate::domain::recommendation::RecommendationEngine;
use crate::domain::topics::TopicInferenceEngine;
use crate::ports::{ContextSnapshot, ContextStore, ContextStoreError, PutReceipt, TierKind};

/// Single-tier store: enough for handler tests that do not exercise
/// fallback behaviour.
#[derive(Default)]
pub struct MemoryStore {
    tier: InMemoryContextTier,
}

#[async_trait::async_trait]
impl ContextStore for MemoryStore {
    async fn get(&self, learner_id: &LearnerId) -> Result<ContextSnapshot, ContextStoreError> {
        self.tier
            .peek(learner_id)
            .map(|context| ContextSnapshot::current(context, TierKind::Cache))
            .ok_or_else(|| ContextStoreError::NotFound(learner_id.clone()))
    }

    async fn put(&self, context: &UserContext) -> Result<PutReceipt, ContextStoreError> {
        use crate::ports::ContextTier;
        let _ = self.tier.store(context).await;
        Ok(PutReceipt::primary())
    }

    fn cached(&self, learner_id: &LearnerId) -> Option<UserContext> {
        self.tier.peek(learner_id)
    }
}

pub fn learner(id: &str) -> LearnerId {
    LearnerId::new(id).unwrap()
}

/// Manager that knows learners `u1` and `u2`.
pub fn manager() -> Arc<UserContextManager> {
    let accounts = InMemoryAccountDirectory::with_learners([learner("u1"), learner("u2")]);
    Arc::new(UserContextManager::new(
        Arc::new(MemoryStore::default()),
        Arc::new(accounts),
    ))
}

pub fn recommendations() -> Arc<RecommendationEngine> {
    Arc::new(RecommendationEngine::new(TopicInferenceEngine::default()))
}
