//! GetPromptContext - Query handler for the prompt-ready learner summary.

use std::sync::Arc;

use super::manager::UserContextManager;
use crate::domain::foundation::{DomainError, LearnerId};
use crate::domain::learner::PromptContext;

#[derive(Debug, Clone)]
pub struct GetPromptContextQuery {
    pub learner_id: LearnerId,
}

pub struct GetPromptContextHandler {
    manager: Arc<UserContextManager>,
}

impl GetPromptContextHandler {
    pub fn new(manager: Arc<UserContextManager>) -> Self {
        Self { manager }
    }

    pub async fn handle(&self, query: GetPromptContextQuery) -> Result<PromptContext, DomainError> {
        let snapshot = self.manager.get_or_create(&query.learner_id).await?;
        Ok(PromptContext::from_context(&snapshot.context))
    }
}
