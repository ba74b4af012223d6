//! In-Memory Context Tier Adapter
//!
//! Serves as the cache tier of the tiered store. With `TierKind::Primary`
//! it also stands in for the database in tests and local development; the
//! reachability switch and artificial latency simulate an outage.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::LearnerId;
use crate::domain::learner::UserContext;
use crate::ports::{ContextTier, StoreOutcome, TierError, TierKind};

/// In-memory storage for learner contexts
///
/// Keeps whichever copy of a context has the later `lastUpdated`.
#[derive(Debug, Clone)]
pub struct InMemoryContextTier {
    kind: TierKind,
    entries: Arc<DashMap<LearnerId, UserContext>>,
    reachable: Arc<AtomicBool>,
    latency_ms: Arc<AtomicU64>,
    store_calls: Arc<AtomicUsize>,
}

impl InMemoryContextTier {
    pub fn new(kind: TierKind) -> Self {
        Self {
            kind,
            entries: Arc::new(DashMap::new()),
            reachable: Arc::new(AtomicBool::new(true)),
            latency_ms: Arc::new(AtomicU64::new(0)),
            store_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Cache tier.
    pub fn cache() -> Self {
        Self::new(TierKind::Cache)
    }

    /// Stored copy without going through the tier interface.
    pub fn peek(&self, learner_id: &LearnerId) -> Option<UserContext> {
        self.entries.get(learner_id).map(|entry| entry.value().clone())
    }

    /// Drop a copy regardless of version.
    pub fn evict(&self, learner_id: &LearnerId) {
        self.entries.remove(learner_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Toggle simulated availability. While unreachable every call fails
    /// with `TierError::Unavailable`.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Delay added to every call.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of `store` calls received, successful or not.
    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }

    async fn check(&self) -> Result<(), TierError> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(TierError::unavailable(self.kind, "simulated outage"))
        }
    }
}

impl Default for InMemoryContextTier {
    fn default() -> Self {
        Self::cache()
    }
}

#[async_trait]
impl ContextTier for InMemoryContextTier {
    fn kind(&self) -> TierKind {
        self.kind
    }

    async fn load(&self, learner_id: &LearnerId) -> Result<Option<UserContext>, TierError> {
        self.check().await?;
        Ok(self.peek(learner_id))
    }

    async fn store(&self, context: &UserContext) -> Result<StoreOutcome, TierError> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        self.check().await?;

        let mut entry = self
            .entries
            .entry(context.learner_id().clone())
            .or_insert_with(|| context.clone());
        if entry.is_newer_than(context) {
            return Ok(StoreOutcome::KeptNewer);
        }
        *entry = context.clone();
        Ok(StoreOutcome::Applied)
    }

    async fn remove(&self, learner_id: &LearnerId) -> Result<(), TierError> {
        self.check().await?;
        self.entries.remove(learner_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<LearnerId>, TierError> {
        self.check().await?;
        let mut ids: Vec<LearnerId> = self.entries.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }
}
