//! Reconciler - Background service that pushes file-tier contexts back
//! into the primary store.
//!
//! Each learner whose latest write only reached the file tier has one entry
//! in the [`ReconciliationQueue`]. The reconciler retries due entries with
//! exponential backoff until the primary write succeeds. Once an entry has
//! failed `retry_budget` times it is flagged degraded and logged at `error`;
//! retries continue at the maximum backoff.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `poll_interval` | 500ms | How often due entries are checked |
//! | `initial_backoff` | 500ms | Delay after the first failure |
//! | `max_backoff` | 30s | Upper bound on the delay |
//! | `retry_budget` | 8 | Failures before degraded mode |
//!
//! ## Graceful Shutdown
//!
//! The service listens for a shutdown signal and makes one final pass over
//! every queued entry before stopping.

use dashmap::DashMap;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time;
use tracing::{error, info, warn};

use super::tiered_store::{Reconciled, TieredContextStore};
use crate::domain::foundation::{DomainError, ErrorCode, LearnerId, Timestamp};

/// Configuration for the Reconciler service.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub poll_interval: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub retry_budget: u32,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            retry_budget: 8,
        }
    }
}

impl ReconcilerConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    /// Delay before the next attempt after `failures` consecutive failures:
    /// initial, 2x, 4x, ... capped at `max_backoff`.
    pub fn backoff(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}

/// Public view of one queued reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingReconciliation {
    pub learner_id: LearnerId,
    pub version: Timestamp,
    pub failures: u32,
    pub degraded: bool,
}

#[derive(Debug, Clone)]
struct QueueEntry {
    version: Timestamp,
    failures: u32,
    degraded: bool,
    next_attempt: Instant,
}

impl QueueEntry {
    fn fresh(version: Timestamp) -> Self {
        Self {
            version,
            failures: 0,
            degraded: false,
            next_attempt: Instant::now(),
        }
    }
}

/// State after recording a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureRecord {
    pub failures: u32,
    /// Set only on the failure that exhausted the retry budget.
    pub newly_degraded: bool,
}

/// Learners with a write outstanding against the primary store, keyed by
/// learner and carrying the version held in the file tier.
#[derive(Debug, Default)]
pub struct ReconciliationQueue {
    entries: DashMap<LearnerId, QueueEntry>,
}

impl ReconciliationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `version` for reconciliation. A newer version supersedes the
    /// queued one; failures, backoff and the degraded flag carry over since
    /// they describe the primary store, not the document.
    pub fn enqueue(&self, learner_id: &LearnerId, version: Timestamp) {
        self.entries
            .entry(learner_id.clone())
            .and_modify(|entry| {
                if version.is_after(&entry.version) {
                    entry.version = version;
                }
            })
            .or_insert_with(|| QueueEntry::fresh(version));
    }

    /// Drop the entry unless it holds a version newer than `version`.
    pub fn cancel_if_not_newer(&self, learner_id: &LearnerId, version: Timestamp) {
        self.entries
            .remove_if(learner_id, |_, entry| !entry.version.is_after(&version));
    }

    pub fn cancel(&self, learner_id: &LearnerId) {
        self.entries.remove(learner_id);
    }

    pub fn contains(&self, learner_id: &LearnerId) -> bool {
        self.entries.contains_key(learner_id)
    }

    pub fn is_degraded(&self, learner_id: &LearnerId) -> bool {
        self.entries
            .get(learner_id)
            .is_some_and(|entry| entry.degraded)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Learners whose next attempt is due at `now`.
    pub fn due(&self, now: Instant) -> Vec<LearnerId> {
        self.entries
            .iter()
            .filter(|entry| entry.next_attempt <= now)
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Every queued learner, due or not.
    pub fn all(&self) -> Vec<LearnerId> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Record a failed attempt. Ignored when the entry has since been
    /// removed.
    pub fn record_failure(
        &self,
        learner_id: &LearnerId,
        config: &ReconcilerConfig,
    ) -> Option<FailureRecord> {
        let mut entry = self.entries.get_mut(learner_id)?;
        entry.failures += 1;
        entry.next_attempt = Instant::now() + config.backoff(entry.failures);
        let newly_degraded = !entry.degraded && entry.failures >= config.retry_budget;
        if newly_degraded {
            entry.degraded = true;
        }
        Some(FailureRecord {
            failures: entry.failures,
            newly_degraded,
        })
    }

    pub fn snapshot(&self) -> Vec<PendingReconciliation> {
        let mut pending: Vec<PendingReconciliation> = self
            .entries
            .iter()
            .map(|entry| PendingReconciliation {
                learner_id: entry.key().clone(),
                version: entry.version,
                failures: entry.failures,
                degraded: entry.degraded,
            })
            .collect();
        pending.sort_by(|a, b| a.learner_id.cmp(&b.learner_id));
        pending
    }
}

/// Background service that drains the reconciliation queue.
pub struct Reconciler {
    store: Arc<TieredContextStore>,
    config: ReconcilerConfig,
}

impl Reconciler {
    pub fn new(store: Arc<TieredContextStore>) -> Self {
        Self {
            store,
            config: ReconcilerConfig::default(),
        }
    }

    pub fn with_config(store: Arc<TieredContextStore>, config: ReconcilerConfig) -> Self {
        Self { store, config }
    }

    /// Run the reconciliation loop until shutdown signal is received.
    ///
    /// Queues any file-tier documents left over from a previous run first.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), DomainError> {
        self.store.recover_pending().await.map_err(|e| {
            DomainError::new(
                ErrorCode::ReconciliationFailure,
                format!("Failed to scan fallback store: {}", e),
            )
        })?;

        let mut interval = time::interval(self.config.poll_interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        let remaining = self.final_pass().await;
                        if remaining > 0 {
                            warn!(remaining, "Shutting down with reconciliations outstanding");
                        }
                        return Ok(());
                    }
                }

                _ = interval.tick() => {
                    self.run_once().await;
                }
            }
        }
    }

    /// Attempt every due entry once. Returns the number synced.
    pub async fn run_once(&self) -> usize {
        let due = self.store.queue().due(Instant::now());
        self.attempt_all(due).await
    }

    /// Attempt every queued entry regardless of backoff. Returns the number
    /// still outstanding.
    pub async fn final_pass(&self) -> usize {
        let all = self.store.queue().all();
        self.attempt_all(all).await;
        self.store.queue().len()
    }

    async fn attempt_all(&self, learner_ids: Vec<LearnerId>) -> usize {
        let attempts = learner_ids
            .into_iter()
            .map(|learner_id| self.attempt(learner_id));
        join_all(attempts).await.into_iter().filter(|synced| *synced).count()
    }

    async fn attempt(&self, learner_id: LearnerId) -> bool {
        match self.store.reconcile(&learner_id).await {
            Ok(Reconciled::Synced) => {
                info!(learner_id = %learner_id, "Reconciled fallback context into primary store");
                true
            }
            Ok(Reconciled::NothingPending) => false,
            Err(e) => {
                let record = self
                    .store
                    .queue()
                    .record_failure(&learner_id, &self.config);
                match record {
                    Some(record) if record.newly_degraded => error!(
                        learner_id = %learner_id,
                        attempts = record.failures,
                        error = %e,
                        "Reconciliation retry budget exhausted, running degraded on file tier"
                    ),
                    Some(record) => warn!(
                        learner_id = %learner_id,
                        attempts = record.failures,
                        error = %e,
                        "Reconciliation attempt failed"
                    ),
                    None => {}
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::{FileContextStore, InMemoryContextTier};
    use crate::domain::learner::{InteractionSignal, UserContext};
    use crate::domain::topics::TopicInferenceEngine;
    use crate::ports::{ContextStore, ContextTier, TierKind};
    use tempfile::TempDir;

    fn learner(id: &str) -> LearnerId {
        LearnerId::new(id).unwrap()
    }

    fn fast_config() -> ReconcilerConfig {
        ReconcilerConfig::default()
            .with_poll_interval(Duration::from_millis(10))
            .with_backoff(Duration::ZERO, Duration::ZERO)
            .with_retry_budget(2)
    }

    fn setup(dir: &TempDir) -> (Arc<TieredContextStore>, InMemoryContextTier) {
        let primary = InMemoryContextTier::new(TierKind::Primary);
        let store = TieredContextStore::new(
            InMemoryContextTier::cache(),
            Arc::new(primary.clone()),
            Arc::new(FileContextStore::new(dir.path())),
        )
        .with_primary_timeout(Duration::from_millis(100));
        (Arc::new(store), primary)
    }

    #[test]
    fn backoff_doubles_up_to_max() {
        let config = ReconcilerConfig::default()
            .with_backoff(Duration::from_millis(100), Duration::from_millis(500));
        assert_eq!(config.backoff(1), Duration::from_millis(100));
        assert_eq!(config.backoff(2), Duration::from_millis(200));
        assert_eq!(config.backoff(3), Duration::from_millis(400));
        assert_eq!(config.backoff(4), Duration::from_millis(500));
        assert_eq!(config.backoff(40), Duration::from_millis(500));
    }

    #[test]
    fn newer_version_supersedes_and_keeps_retry_state() {
        let queue = ReconciliationQueue::new();
        let id = learner("u1");
        let v1 = Timestamp::from_unix_secs(100);
        let v2 = Timestamp::from_unix_secs(200);
        let config = ReconcilerConfig::default()
            .with_backoff(Duration::from_secs(60), Duration::from_secs(60))
            .with_retry_budget(2);

        queue.enqueue(&id, v1);
        queue.record_failure(&id, &config);
        queue.record_failure(&id, &config);
        assert!(queue.is_degraded(&id));

        queue.enqueue(&id, v2);
        let pending = queue.snapshot();
        assert_eq!(pending[0].version, v2);
        assert_eq!(pending[0].failures, 2);
        assert!(pending[0].degraded);
        // Still backing off after the new write.
        assert!(queue.due(Instant::now()).is_empty());
    }

    #[test]
    fn failure_after_removal_is_ignored() {
        let queue = ReconciliationQueue::new();
        let id = learner("u1");
        queue.enqueue(&id, Timestamp::from_unix_secs(1));
        queue.cancel(&id);
        assert_eq!(queue.record_failure(&id, &fast_config()), None);
    }

    #[test]
    fn older_version_does_not_replace_queued_entry() {
        let queue = ReconciliationQueue::new();
        let id = learner("u1");
        queue.enqueue(&id, Timestamp::from_unix_secs(200));
        queue.enqueue(&id, Timestamp::from_unix_secs(100));
        assert_eq!(queue.snapshot()[0].version, Timestamp::from_unix_secs(200));

        queue.cancel_if_not_newer(&id, Timestamp::from_unix_secs(150));
        assert!(queue.contains(&id));
        queue.cancel_if_not_newer(&id, Timestamp::from_unix_secs(200));
        assert!(queue.is_empty());
    }

    #[test]
    fn degraded_flag_is_raised_once() {
        let queue = ReconciliationQueue::new();
        let id = learner("u1");
        let v = Timestamp::from_unix_secs(1);
        let config = fast_config();
        queue.enqueue(&id, v);

        assert!(!queue.record_failure(&id, &config).unwrap().newly_degraded);
        assert!(queue.record_failure(&id, &config).unwrap().newly_degraded);
        assert!(!queue.record_failure(&id, &config).unwrap().newly_degraded);
        assert!(queue.is_degraded(&id));
    }

    #[tokio::test]
    async fn run_once_syncs_after_primary_recovers() {
        let dir = TempDir::new().unwrap();
        let (store, primary) = setup(&dir);
        let reconciler = Reconciler::with_config(store.clone(), fast_config());
        let ctx = UserContext::new(learner("u1"));

        primary.set_reachable(false);
        store.put(&ctx).await.unwrap();

        assert_eq!(reconciler.run_once().await, 0);
        assert_eq!(reconciler.run_once().await, 0);
        assert!(store.is_degraded(ctx.learner_id()));

        primary.set_reachable(true);
        assert_eq!(reconciler.run_once().await, 1);
        assert!(store.pending_reconciliations().is_empty());
        assert_eq!(primary.peek(ctx.learner_id()), Some(ctx));
    }

    #[tokio::test]
    async fn write_after_exhausted_budget_reports_degraded() {
        let dir = TempDir::new().unwrap();
        let (store, primary) = setup(&dir);
        let reconciler = Reconciler::with_config(store.clone(), fast_config());
        let ctx = UserContext::new(learner("u1"));

        primary.set_reachable(false);
        assert!(!store.put(&ctx).await.unwrap().degraded);
        reconciler.run_once().await;
        reconciler.run_once().await;
        assert!(store.is_degraded(ctx.learner_id()));

        let mut next = ctx.clone();
        next.apply_interaction(
            &InteractionSignal::new("what is a heap?").unwrap(),
            &TopicInferenceEngine::default(),
        );
        let receipt = store.put(&next).await.unwrap();
        assert_eq!(receipt.tier, TierKind::File);
        assert!(receipt.degraded);
        assert_eq!(store.pending_reconciliations()[0].failures, 2);

        primary.set_reachable(true);
        assert_eq!(reconciler.run_once().await, 1);
        assert!(!store.is_degraded(ctx.learner_id()));
        assert_eq!(primary.peek(ctx.learner_id()), Some(next));
    }

    #[tokio::test]
    async fn run_recovers_queue_and_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let (store, primary) = setup(&dir);
        let ctx = UserContext::new(learner("u1"));
        FileContextStore::new(dir.path()).store(&ctx).await.unwrap();

        let reconciler = Reconciler::with_config(store.clone(), fast_config());
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { reconciler.run(rx).await });

        for _ in 0..50 {
            if primary.peek(ctx.learner_id()).is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tx.send(true).unwrap();
        handle.await.unwrap().unwrap();

        assert_eq!(primary.peek(ctx.learner_id()), Some(ctx));
        assert!(store.pending_reconciliations().is_empty());
    }
}
