//! UserContextManager - Lifecycle and merge policy for learner contexts.
//!
//! Every mutation follows the same protocol:
//!
//! 1. Check the learner has an account.
//! 2. Fetch the current context (creating a default one if absent).
//! 3. Take the learner's lock, re-read the cached copy and merge into it.
//! 4. Persist the merged copy with a single `ContextStore::put`.
//!
//! The lock is held across the merge and the put only, so concurrent
//! updates for one learner are serialized without losing either change,
//! while different learners proceed in parallel.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::foundation::{DomainError, KeyedLocks, LearnerId};
use crate::domain::learner::{InteractionSignal, ProfilePatch, UserContext};
use crate::domain::topics::{Topic, TopicInferenceEngine};
use crate::ports::{
    AccountDirectory, ContextSnapshot, ContextStore, ContextStoreError, PutReceipt, TierKind,
};

/// A context after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedContext {
    pub context: UserContext,
    pub receipt: PutReceipt,
}

/// Result of tracking one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedInteraction {
    pub saved: SavedContext,
    /// Topics attributed to the interaction, top topic first.
    pub topics: Vec<Topic>,
}

pub struct UserContextManager {
    store: Arc<dyn ContextStore>,
    accounts: Arc<dyn AccountDirectory>,
    topics: TopicInferenceEngine,
    locks: KeyedLocks<LearnerId>,
}

impl UserContextManager {
    pub fn new(store: Arc<dyn ContextStore>, accounts: Arc<dyn AccountDirectory>) -> Self {
        Self {
            store,
            accounts,
            topics: TopicInferenceEngine::default(),
            locks: KeyedLocks::new(),
        }
    }

    pub fn with_topics(mut self, topics: TopicInferenceEngine) -> Self {
        self.topics = topics;
        self
    }

    pub fn topics(&self) -> &TopicInferenceEngine {
        &self.topics
    }

    /// Number of learners with a mutation in flight.
    pub fn active_locks(&self) -> usize {
        self.locks.len()
    }

    /// Current context, creating and persisting defaults for a learner seen
    /// for the first time.
    ///
    /// # Errors
    ///
    /// - `LearnerNotFound` if the learner has no account
    /// - `StoreUnavailable` if no tier could answer or accept the default
    pub async fn get_or_create(&self, learner_id: &LearnerId) -> Result<ContextSnapshot, DomainError> {
        self.accounts.ensure_exists(learner_id).await?;
        self.fetch_or_create(learner_id).await
    }

    /// Merge one tracked interaction into the learner's context.
    ///
    /// # Errors
    ///
    /// - `LearnerNotFound` if the learner has no account
    /// - `StoreUnavailable` if neither the primary nor the file tier
    ///   accepted the write
    pub async fn update(
        &self,
        learner_id: &LearnerId,
        signal: &InteractionSignal,
    ) -> Result<TrackedInteraction, DomainError> {
        let mut inferred = Vec::new();
        let saved = self
            .mutate(learner_id, |context| {
                inferred = context.apply_interaction(signal, &self.topics);
            })
            .await?;

        debug!(
            learner_id = %learner_id,
            topics = ?inferred.iter().map(Topic::as_str).collect::<Vec<_>>(),
            "Tracked interaction"
        );
        Ok(TrackedInteraction {
            saved,
            topics: inferred,
        })
    }

    /// Apply an explicit profile edit. The patch is validated before any
    /// state is read, so a rejected patch has no side effects.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if any field of the patch is invalid
    /// - `LearnerNotFound` if the learner has no account
    /// - `StoreUnavailable` if the write could not be persisted
    pub async fn save(
        &self,
        learner_id: &LearnerId,
        patch: ProfilePatch,
    ) -> Result<SavedContext, DomainError> {
        let validated = patch.validate()?;
        let saved = self
            .mutate(learner_id, move |context| context.apply_patch(validated))
            .await?;
        info!(learner_id = %learner_id, "Profile updated");
        Ok(saved)
    }

    async fn mutate<F>(&self, learner_id: &LearnerId, merge: F) -> Result<SavedContext, DomainError>
    where
        F: FnOnce(&mut UserContext),
    {
        self.accounts.ensure_exists(learner_id).await?;
        let fetched = self.fetch_or_create(learner_id).await?.context;

        let _guard = self.locks.lock(learner_id.clone()).await;
        // A completed write is in the cache, so the cached copy reflects any
        // update that finished while this one waited for the lock.
        let mut context = match self.store.cached(learner_id) {
            Some(cached) if !fetched.is_newer_than(&cached) => cached,
            _ => fetched,
        };
        merge(&mut context);

        let receipt = self.store.put(&context).await?;
        if receipt.tier != TierKind::Primary {
            warn!(
                learner_id = %learner_id,
                degraded = receipt.degraded,
                "Context persisted to fallback tier"
            );
        }
        Ok(SavedContext { context, receipt })
    }

    async fn fetch_or_create(&self, learner_id: &LearnerId) -> Result<ContextSnapshot, DomainError> {
        match self.store.get(learner_id).await {
            Ok(snapshot) => return Ok(snapshot),
            Err(ContextStoreError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let _guard = self.locks.lock(learner_id.clone()).await;
        if let Some(context) = self.store.cached(learner_id) {
            return Ok(ContextSnapshot::current(context, TierKind::Cache));
        }

        let context = UserContext::new(learner_id.clone());
        let receipt = self.store.put(&context).await?;
        info!(learner_id = %learner_id, tier = %receipt.tier, "Created learner context");
        Ok(match receipt.tier {
            TierKind::File => ContextSnapshot::fallback(context, receipt.degraded),
            tier => ContextSnapshot::current(context, tier),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::accounts::InMemoryAccountDirectory;
    use crate::adapters::storage::{FileContextStore, InMemoryContextTier, TieredContextStore};
    use crate::domain::foundation::ErrorCode;
    use crate::domain::learner::SkillLevel;
    use std::collections::BTreeMap;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        manager: Arc<UserContextManager>,
        store: Arc<TieredContextStore>,
        primary: InMemoryContextTier,
        _dir: TempDir,
    }

    fn learner(id: &str) -> LearnerId {
        LearnerId::new(id).unwrap()
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let primary = InMemoryContextTier::new(TierKind::Primary);
        let store = Arc::new(
            TieredContextStore::new(
                InMemoryContextTier::cache(),
                Arc::new(primary.clone()),
                Arc::new(FileContextStore::new(dir.path())),
            )
            .with_primary_timeout(Duration::from_millis(100)),
        );
        let accounts = InMemoryAccountDirectory::with_learners([learner("u1"), learner("u2")]);
        let manager = Arc::new(UserContextManager::new(store.clone(), Arc::new(accounts)));
        Fixture {
            manager,
            store,
            primary,
            _dir: dir,
        }
    }

    fn signal(text: &str) -> InteractionSignal {
        InteractionSignal::new(text).unwrap()
    }

    #[tokio::test]
    async fn unseen_learner_gets_persisted_defaults() {
        let f = fixture();
        let snapshot = f.manager.get_or_create(&learner("u1")).await.unwrap();

        let ctx = &snapshot.context;
        assert_eq!(ctx.skill_level(), SkillLevel::Beginner);
        assert!(ctx.preferences().weak_topics.is_empty());
        assert!(ctx.preferences().goals.is_empty());
        assert!(ctx.recent_questions().is_empty());
        assert!(!snapshot.stale);
        assert_eq!(f.primary.peek(&learner("u1")).as_ref(), Some(ctx));
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let f = fixture();
        let err = f.manager.get_or_create(&learner("stranger")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::LearnerNotFound);

        let err = f
            .manager
            .update(&learner("stranger"), &signal("recursion"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::LearnerNotFound);
        assert!(f.primary.is_empty());
    }

    #[tokio::test]
    async fn update_on_fresh_learner_records_question_and_topic() {
        let f = fixture();
        let tracked = f
            .manager
            .update(&learner("u1"), &signal("Can you explain recursion?"))
            .await
            .unwrap();

        let ctx = &tracked.saved.context;
        assert!(ctx
            .session_data()
            .topics
            .contains(&Topic::new("recursion").unwrap()));
        assert_eq!(
            ctx.recent_questions().iter().collect::<Vec<_>>(),
            vec!["Can you explain recursion?"]
        );
        assert_eq!(ctx.session_data().interaction_count, 1);
        assert_eq!(tracked.saved.receipt, PutReceipt::primary());
    }

    #[tokio::test]
    async fn recent_questions_keep_last_ten_in_order() {
        let f = fixture();
        for i in 0..13 {
            f.manager
                .update(&learner("u1"), &signal(&format!("question {}", i)))
                .await
                .unwrap();
        }

        let ctx = f.manager.get_or_create(&learner("u1")).await.unwrap().context;
        let questions: Vec<&String> = ctx.recent_questions().iter().collect();
        assert_eq!(questions.len(), 10);
        assert_eq!(questions.first().map(|q| q.as_str()), Some("question 3"));
        assert_eq!(questions.last().map(|q| q.as_str()), Some("question 12"));
        assert_eq!(ctx.session_data().interaction_count, 13);
    }

    #[tokio::test]
    async fn repeated_wrong_answers_record_weak_topic_once() {
        let f = fixture();
        for _ in 0..3 {
            f.manager
                .update(
                    &learner("u1"),
                    &signal("dbms normal forms").with_correctness(false),
                )
                .await
                .unwrap();
        }

        let ctx = f.manager.get_or_create(&learner("u1")).await.unwrap().context;
        let dbms = Topic::new("dbms").unwrap();
        let count = ctx
            .preferences()
            .weak_topics
            .iter()
            .filter(|t| **t == dbms)
            .count();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn invalid_patch_leaves_context_untouched() {
        let f = fixture();
        let before = f.manager.get_or_create(&learner("u1")).await.unwrap().context;

        let patch = ProfilePatch {
            skill_level: Some("wizard".to_string()),
            ..Default::default()
        };
        let err = f.manager.save(&learner("u1"), patch).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);

        let after = f.manager.get_or_create(&learner("u1")).await.unwrap().context;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn save_applies_fields_and_confidence() {
        let f = fixture();
        let mut confidence = BTreeMap::new();
        confidence.insert("recursion".to_string(), "low".to_string());
        let patch = ProfilePatch {
            skill_level: Some("advanced".to_string()),
            goals: Some(vec!["Master SQL joins".to_string()]),
            topic_confidence: Some(confidence),
            ..Default::default()
        };

        let saved = f.manager.save(&learner("u1"), patch).await.unwrap();
        assert_eq!(saved.context.skill_level(), SkillLevel::Advanced);
        assert_eq!(saved.context.preferences().goals.len(), 1);
        assert_eq!(
            f.primary.peek(&learner("u1")).map(|c| c.skill_level()),
            Some(SkillLevel::Advanced)
        );
    }

    #[tokio::test]
    async fn concurrent_updates_on_one_learner_are_not_lost() {
        let f = fixture();
        let a = {
            let manager = f.manager.clone();
            tokio::spawn(async move {
                manager
                    .update(&learner("u1"), &signal("recursion"))
                    .await
                    .unwrap()
            })
        };
        let b = {
            let manager = f.manager.clone();
            tokio::spawn(async move {
                manager
                    .update(&learner("u1"), &signal("operating systems"))
                    .await
                    .unwrap()
            })
        };
        a.await.unwrap();
        b.await.unwrap();

        let stored = f.primary.peek(&learner("u1")).unwrap();
        let topics = &stored.session_data().topics;
        assert!(topics.contains(&Topic::new("recursion").unwrap()));
        assert!(topics.contains(&Topic::new("operating systems").unwrap()));
        assert_eq!(stored.session_data().interaction_count, 2);
        assert_eq!(f.manager.active_locks(), 0);
    }

    #[tokio::test]
    async fn updates_survive_primary_outage() {
        let f = fixture();
        f.manager.get_or_create(&learner("u1")).await.unwrap();
        f.primary.set_reachable(false);

        let tracked = f
            .manager
            .update(&learner("u1"), &signal("networking basics"))
            .await
            .unwrap();
        assert_eq!(tracked.saved.receipt.tier, TierKind::File);
        assert_eq!(f.store.pending_reconciliations().len(), 1);
    }
}
