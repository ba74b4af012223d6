//! Tiered Context Store - cache, primary store and file fallback behind
//! one `ContextStore`.
//!
//! ## Read path
//!
//! 1. Cache hit returns immediately.
//! 2. Cache miss reads the primary store and populates the cache.
//! 3. A primary failure (or miss) falls through to the file tier; anything
//!    found there is returned with `stale = true`.
//!
//! ## Write path
//!
//! The primary store is written under a bounded timeout. When that fails
//! the context goes to the file tier and a reconciliation is queued; the
//! [`Reconciler`](super::Reconciler) keeps retrying the primary write until
//! it succeeds, then deletes the file copy. The cache only takes the new
//! copy once one of those writes has succeeded.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::in_memory_context_tier::InMemoryContextTier;
use super::reconciler::{PendingReconciliation, ReconciliationQueue};
use crate::domain::foundation::{KeyedLocks, LearnerId, Timestamp};
use crate::domain::learner::UserContext;
use crate::ports::{
    ContextSnapshot, ContextStore, ContextStoreError, ContextTier, PutReceipt, StoreOutcome,
    TierError, TierKind,
};

/// Default bound on a single primary store call.
pub const DEFAULT_PRIMARY_TIMEOUT: Duration = Duration::from_secs(2);

/// Result of one reconciliation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The file copy reached the primary store and was removed.
    Synced,
    /// Nothing left to reconcile; the file copy was already gone.
    NothingPending,
}

/// Evicts a learner's cached copy on drop unless disarmed.
///
/// Held across the writes of a `put`, so a write that fails or is cancelled
/// mid-flight leaves no cached copy whose persistence is unknown.
struct CacheInvalidation<'a> {
    cache: &'a InMemoryContextTier,
    learner_id: &'a LearnerId,
    armed: bool,
}

impl<'a> CacheInvalidation<'a> {
    fn new(cache: &'a InMemoryContextTier, learner_id: &'a LearnerId) -> Self {
        Self {
            cache,
            learner_id,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CacheInvalidation<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.cache.evict(self.learner_id);
        }
    }
}

pub struct TieredContextStore {
    cache: InMemoryContextTier,
    primary: Arc<dyn ContextTier>,
    file: Arc<dyn ContextTier>,
    primary_timeout: Duration,
    queue: Arc<ReconciliationQueue>,
    // Serializes file-tier writes and removals per learner.
    fallback_locks: KeyedLocks<LearnerId>,
}

impl TieredContextStore {
    pub fn new(
        cache: InMemoryContextTier,
        primary: Arc<dyn ContextTier>,
        file: Arc<dyn ContextTier>,
    ) -> Self {
        Self {
            cache,
            primary,
            file,
            primary_timeout: DEFAULT_PRIMARY_TIMEOUT,
            queue: Arc::new(ReconciliationQueue::new()),
            fallback_locks: KeyedLocks::new(),
        }
    }

    pub fn with_primary_timeout(mut self, timeout: Duration) -> Self {
        self.primary_timeout = timeout;
        self
    }

    pub fn cache(&self) -> &InMemoryContextTier {
        &self.cache
    }

    pub fn queue(&self) -> &ReconciliationQueue {
        &self.queue
    }

    /// Learners whose latest write is only in the file tier.
    pub fn pending_reconciliations(&self) -> Vec<PendingReconciliation> {
        self.queue.snapshot()
    }

    /// Whether reconciliation for this learner has exhausted its retry budget.
    pub fn is_degraded(&self, learner_id: &LearnerId) -> bool {
        self.queue.is_degraded(learner_id)
    }

    async fn call_primary<T, F>(&self, op: F) -> Result<T, TierError>
    where
        F: Future<Output = Result<T, TierError>>,
    {
        match tokio::time::timeout(self.primary_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(TierError::Timeout {
                tier: TierKind::Primary,
                millis: self.primary_timeout.as_millis() as u64,
            }),
        }
    }

    fn fallback_snapshot(&self, context: UserContext) -> ContextSnapshot {
        let degraded = self.queue.is_degraded(context.learner_id());
        ContextSnapshot::fallback(context, degraded)
    }

    /// Load from the file tier, logging and swallowing failures.
    async fn load_fallback(&self, learner_id: &LearnerId) -> Option<UserContext> {
        match self.file.load(learner_id).await {
            Ok(found) => found,
            Err(e) => {
                warn!(learner_id = %learner_id, tier = %TierKind::File, error = %e, "Fallback read failed");
                None
            }
        }
    }

    /// Drop the file copy and queued retry once `version` is in the
    /// primary store.
    async fn settle(&self, learner_id: &LearnerId, version: Timestamp) {
        let _guard = self.fallback_locks.lock(learner_id.clone()).await;
        self.queue.cancel_if_not_newer(learner_id, version);
        if let Err(e) = self.file.remove_if_not_newer(learner_id, version).await {
            warn!(learner_id = %learner_id, error = %e, "Failed to remove fallback copy");
        }
    }

    /// Queue every context found in the file tier for reconciliation.
    ///
    /// A file copy only exists while a primary write is outstanding, so this
    /// restores the queue after a restart.
    pub async fn recover_pending(&self) -> Result<usize, TierError> {
        let ids = self.file.list().await?;
        let mut recovered = 0;
        for learner_id in ids {
            match self.file.load(&learner_id).await {
                Ok(Some(context)) => {
                    self.queue.enqueue(&learner_id, context.last_updated());
                    recovered += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    error!(learner_id = %learner_id, error = %e, "Unrecoverable fallback copy")
                }
            }
        }
        if recovered > 0 {
            info!(count = recovered, "Recovered pending reconciliations from fallback");
        }
        Ok(recovered)
    }

    /// Push the file-tier copy of one learner into the primary store.
    ///
    /// # Errors
    /// Returns the primary store error when the write did not go through
    pub async fn reconcile(&self, learner_id: &LearnerId) -> Result<Reconciled, TierError> {
        let context = {
            // Same lock as the fallback write, so a copy being written is
            // never mistaken for an absent one.
            let _guard = self.fallback_locks.lock(learner_id.clone()).await;
            match self.file.load(learner_id).await {
                Ok(Some(context)) => context,
                Ok(None) => {
                    self.queue.cancel(learner_id);
                    return Ok(Reconciled::NothingPending);
                }
                Err(e @ TierError::Corrupt { .. }) => {
                    error!(learner_id = %learner_id, error = %e, "Dropping corrupt fallback copy from reconciliation");
                    self.queue.cancel(learner_id);
                    return Ok(Reconciled::NothingPending);
                }
                Err(e) => return Err(e),
            }
        };

        let outcome = self.call_primary(self.primary.store(&context)).await?;
        if outcome == StoreOutcome::KeptNewer {
            debug!(learner_id = %learner_id, "Primary already holds a newer context");
        }
        self.settle(learner_id, context.last_updated()).await;
        Ok(Reconciled::Synced)
    }
}

#[async_trait]
impl ContextStore for TieredContextStore {
    async fn get(&self, learner_id: &LearnerId) -> Result<ContextSnapshot, ContextStoreError> {
        if let Some(context) = self.cache.peek(learner_id) {
            return Ok(ContextSnapshot::current(context, TierKind::Cache));
        }

        match self.call_primary(self.primary.load(learner_id)).await {
            Ok(Some(primary)) => {
                // A queued reconciliation means the file copy may be ahead.
                if self.queue.contains(learner_id) {
                    if let Some(fallback) = self.load_fallback(learner_id).await {
                        if fallback.is_newer_than(&primary) {
                            return Ok(self.fallback_snapshot(fallback));
                        }
                    }
                }
                let _ = self.cache.store(&primary).await;
                Ok(ContextSnapshot::current(primary, TierKind::Primary))
            }
            Ok(None) => match self.load_fallback(learner_id).await {
                Some(context) => Ok(self.fallback_snapshot(context)),
                None => Err(ContextStoreError::NotFound(learner_id.clone())),
            },
            Err(primary_err) => {
                warn!(
                    learner_id = %learner_id,
                    tier = %TierKind::Primary,
                    error = %primary_err,
                    "Primary read failed, falling back to file tier"
                );
                match self.file.load(learner_id).await {
                    Ok(Some(context)) => Ok(self.fallback_snapshot(context)),
                    // Primary may still hold a copy; absence is unknown.
                    Ok(None) => Err(ContextStoreError::AllTiersFailed {
                        learner_id: learner_id.clone(),
                        reason: primary_err.to_string(),
                    }),
                    Err(file_err) => Err(ContextStoreError::AllTiersFailed {
                        learner_id: learner_id.clone(),
                        reason: format!("{}; {}", primary_err, file_err),
                    }),
                }
            }
        }
    }

    async fn put(&self, context: &UserContext) -> Result<PutReceipt, ContextStoreError> {
        let learner_id = context.learner_id();
        let version = context.last_updated();
        let invalidation = CacheInvalidation::new(&self.cache, learner_id);

        let primary_err = match self.call_primary(self.primary.store(context)).await {
            Ok(_) => {
                let _ = self.cache.store(context).await;
                invalidation.disarm();
                if self.queue.contains(learner_id) {
                    self.settle(learner_id, version).await;
                }
                return Ok(PutReceipt::primary());
            }
            Err(e) => e,
        };

        warn!(
            learner_id = %learner_id,
            tier = %TierKind::Primary,
            error = %primary_err,
            "Primary write failed, writing to file tier"
        );

        let _guard = self.fallback_locks.lock(learner_id.clone()).await;
        // Queued before the write so a cancelled write cannot strand a file
        // copy; an entry without a newer file copy drains on its next attempt.
        self.queue.enqueue(learner_id, version);
        match self.file.store(context).await {
            Ok(_) => {
                let _ = self.cache.store(context).await;
                invalidation.disarm();
                Ok(PutReceipt {
                    tier: TierKind::File,
                    degraded: self.queue.is_degraded(learner_id),
                })
            }
            Err(file_err) => {
                error!(learner_id = %learner_id, error = %file_err, "File fallback write failed");
                Err(ContextStoreError::AllTiersFailed {
                    learner_id: learner_id.clone(),
                    reason: format!("{}; {}", primary_err, file_err),
                })
            }
        }
    }

    fn cached(&self, learner_id: &LearnerId) -> Option<UserContext> {
        self.cache.peek(learner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::FileContextStore;
    use crate::domain::learner::InteractionSignal;
    use crate::domain::topics::TopicInferenceEngine;
    use tempfile::TempDir;

    struct Fixture {
        store: TieredContextStore,
        primary: InMemoryContextTier,
        file: Arc<FileContextStore>,
        _dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let primary = InMemoryContextTier::new(TierKind::Primary);
        let file = Arc::new(FileContextStore::new(dir.path()));
        let store = TieredContextStore::new(
            InMemoryContextTier::cache(),
            Arc::new(primary.clone()),
            file.clone(),
        )
        .with_primary_timeout(Duration::from_millis(100));
        Fixture {
            store,
            primary,
            file,
            _dir: dir,
        }
    }

    fn context(id: &str) -> UserContext {
        UserContext::new(LearnerId::new(id).unwrap())
    }

    fn touched(ctx: &UserContext, query: &str) -> UserContext {
        let mut next = ctx.clone();
        next.apply_interaction(
            &InteractionSignal::new(query).unwrap(),
            &TopicInferenceEngine::default(),
        );
        next
    }

    #[tokio::test]
    async fn put_then_get_round_trips_through_cache() {
        let f = fixture();
        let ctx = context("u1");

        let receipt = f.store.put(&ctx).await.unwrap();
        assert_eq!(receipt, PutReceipt::primary());

        let snapshot = f.store.get(ctx.learner_id()).await.unwrap();
        assert_eq!(snapshot.context, ctx);
        assert_eq!(snapshot.source, TierKind::Cache);
        assert!(!snapshot.stale);
        assert_eq!(f.primary.peek(ctx.learner_id()), Some(ctx));
    }

    #[tokio::test]
    async fn cache_miss_reads_primary_and_populates_cache() {
        let f = fixture();
        let ctx = context("u1");
        f.primary.store(&ctx).await.unwrap();

        let snapshot = f.store.get(ctx.learner_id()).await.unwrap();
        assert_eq!(snapshot.source, TierKind::Primary);
        assert_eq!(f.store.cached(ctx.learner_id()), Some(ctx));
    }

    #[tokio::test]
    async fn unknown_learner_is_not_found() {
        let f = fixture();
        let result = f.store.get(&LearnerId::new("ghost").unwrap()).await;
        assert!(matches!(result, Err(ContextStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn primary_outage_writes_file_and_queues_reconciliation() {
        let f = fixture();
        let ctx = context("u1");
        f.primary.set_reachable(false);

        let receipt = f.store.put(&ctx).await.unwrap();
        assert_eq!(receipt.tier, TierKind::File);
        assert!(!receipt.degraded);
        assert_eq!(f.file.load(ctx.learner_id()).await.unwrap(), Some(ctx.clone()));
        assert_eq!(f.store.pending_reconciliations().len(), 1);

        f.store.cache().evict(ctx.learner_id());
        let snapshot = f.store.get(ctx.learner_id()).await.unwrap();
        assert_eq!(snapshot.context, ctx);
        assert_eq!(snapshot.source, TierKind::File);
        assert!(snapshot.stale);
    }

    #[tokio::test]
    async fn cancelled_put_leaves_no_cached_copy() {
        let f = fixture();
        let ctx = context("u1");
        f.store.put(&ctx).await.unwrap();

        let next = touched(&ctx, "what is a heap?");
        f.primary.set_latency(Duration::from_millis(500));
        let outcome = tokio::time::timeout(Duration::from_millis(20), f.store.put(&next)).await;
        assert!(outcome.is_err());
        f.primary.set_latency(Duration::ZERO);

        assert_eq!(f.store.cached(ctx.learner_id()), None);
        let snapshot = f.store.get(ctx.learner_id()).await.unwrap();
        assert_eq!(snapshot.context, ctx);
        assert_eq!(snapshot.source, TierKind::Primary);
        assert_eq!(f.file.load(ctx.learner_id()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn failed_fallback_write_leaves_no_cached_copy() {
        let primary = InMemoryContextTier::new(TierKind::Primary);
        let file = InMemoryContextTier::new(TierKind::File);
        let store = TieredContextStore::new(
            InMemoryContextTier::cache(),
            Arc::new(primary.clone()),
            Arc::new(file.clone()),
        );
        let ctx = context("u1");
        primary.set_reachable(false);
        file.set_reachable(false);

        let result = store.put(&ctx).await;
        assert!(matches!(result, Err(ContextStoreError::AllTiersFailed { .. })));
        assert_eq!(store.cached(ctx.learner_id()), None);
    }

    #[tokio::test]
    async fn stale_read_reports_degraded_reconciliation() {
        let f = fixture();
        let ctx = context("u1");
        f.primary.set_reachable(false);
        f.store.put(&ctx).await.unwrap();
        f.store.cache().evict(ctx.learner_id());

        let snapshot = f.store.get(ctx.learner_id()).await.unwrap();
        assert!(snapshot.stale);
        assert!(!snapshot.degraded);

        let config = crate::adapters::storage::ReconcilerConfig::default().with_retry_budget(1);
        f.store.queue().record_failure(ctx.learner_id(), &config);

        let snapshot = f.store.get(ctx.learner_id()).await.unwrap();
        assert!(snapshot.stale);
        assert!(snapshot.degraded);
    }

    #[tokio::test]
    async fn slow_primary_times_out_into_fallback() {
        let f = fixture();
        f.primary.set_latency(Duration::from_millis(500));
        let ctx = context("u1");

        let receipt = f.store.put(&ctx).await.unwrap();
        assert_eq!(receipt.tier, TierKind::File);
    }

    #[tokio::test]
    async fn later_primary_write_supersedes_pending_retry() {
        let f = fixture();
        let first = context("u1");
        f.primary.set_reachable(false);
        f.store.put(&first).await.unwrap();

        f.primary.set_reachable(true);
        let second = touched(&first, "recursion basics");
        assert_eq!(f.store.put(&second).await.unwrap(), PutReceipt::primary());

        assert!(f.store.pending_reconciliations().is_empty());
        assert_eq!(f.file.load(first.learner_id()).await.unwrap(), None);
        assert_eq!(f.primary.peek(first.learner_id()), Some(second));
    }

    #[tokio::test]
    async fn reconcile_moves_file_copy_into_primary() {
        let f = fixture();
        let ctx = context("u1");
        f.primary.set_reachable(false);
        f.store.put(&ctx).await.unwrap();

        assert!(f.store.reconcile(ctx.learner_id()).await.is_err());

        f.primary.set_reachable(true);
        assert_eq!(f.store.reconcile(ctx.learner_id()).await.unwrap(), Reconciled::Synced);
        assert_eq!(f.primary.peek(ctx.learner_id()), Some(ctx.clone()));
        assert_eq!(f.file.load(ctx.learner_id()).await.unwrap(), None);
        assert!(f.store.pending_reconciliations().is_empty());
    }

    #[tokio::test]
    async fn reconcile_never_overwrites_newer_primary_copy() {
        let f = fixture();
        let old = context("u1");
        let newer = touched(&old, "graph algorithms");
        f.file.store(&old).await.unwrap();
        f.primary.store(&newer).await.unwrap();

        f.store.reconcile(old.learner_id()).await.unwrap();
        assert_eq!(f.primary.peek(old.learner_id()), Some(newer));
        assert_eq!(f.file.load(old.learner_id()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn primary_miss_checks_file_tier() {
        let f = fixture();
        let ctx = context("u1");
        f.file.store(&ctx).await.unwrap();

        let snapshot = f.store.get(ctx.learner_id()).await.unwrap();
        assert!(snapshot.stale);
        assert_eq!(snapshot.source, TierKind::File);
    }

    #[tokio::test]
    async fn primary_outage_without_file_copy_is_unavailable_not_missing() {
        let f = fixture();
        f.primary.set_reachable(false);

        let result = f.store.get(&LearnerId::new("u1").unwrap()).await;
        assert!(matches!(result, Err(ContextStoreError::AllTiersFailed { .. })));
    }

    #[tokio::test]
    async fn recover_pending_requeues_file_documents() {
        let f = fixture();
        f.file.store(&context("a")).await.unwrap();
        f.file.store(&context("b")).await.unwrap();

        assert_eq!(f.store.recover_pending().await.unwrap(), 2);
        assert_eq!(f.store.pending_reconciliations().len(), 2);
    }
}
