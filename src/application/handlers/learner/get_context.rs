//! GetContext - Query handler returning a learner's context.

use std::sync::Arc;

use super::manager::UserContextManager;
use crate::domain::foundation::{DomainError, LearnerId};
use crate::ports::ContextSnapshot;

/// Query for one learner's context.
#[derive(Debug, Clone)]
pub struct GetContextQuery {
    pub learner_id: LearnerId,
}

/// Handler for reading contexts. Unseen learners get a default context.
pub struct GetContextHandler {
    manager: Arc<UserContextManager>,
}

impl GetContextHandler {
    pub fn new(manager: Arc<UserContextManager>) -> Self {
        Self { manager }
    }

    pub async fn handle(&self, query: GetContextQuery) -> Result<ContextSnapshot, DomainError> {
        self.manager.get_or_create(&query.learner_id).await
    }
}
