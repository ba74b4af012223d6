//! In-memory account directory for tests and local development.

use async_trait::async_trait;
use dashmap::DashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::foundation::LearnerId;
use crate::ports::{AccountDirectory, AccountError};

/// AccountDirectory backed by a fixed set of learner ids.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountDirectory {
    known: Arc<DashSet<LearnerId>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory pre-populated with the given learners.
    pub fn with_learners<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = LearnerId>,
    {
        let directory = Self::new();
        for id in ids {
            directory.register(id);
        }
        directory
    }

    pub fn register(&self, learner_id: LearnerId) {
        self.known.insert(learner_id);
    }

    pub fn deregister(&self, learner_id: &LearnerId) {
        self.known.remove(learner_id);
    }

    /// Simulate the account service being down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountDirectory for InMemoryAccountDirectory {
    async fn ensure_exists(&self, learner_id: &LearnerId) -> Result<(), AccountError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AccountError::Unavailable(
                "account directory offline".to_string(),
            ));
        }
        if self.known.contains(learner_id) {
            Ok(())
        } else {
            Err(AccountError::NotFound(learner_id.clone()))
        }
    }
}
