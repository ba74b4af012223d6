//! PatchProfile - Command handler for explicit profile edits.

use std::sync::Arc;

use super::manager::{SavedContext, UserContextManager};
use crate::domain::foundation::{DomainError, LearnerId};
use crate::domain::learner::ProfilePatch;

/// Command carrying the fields to change. Absent fields are left as is.
#[derive(Debug, Clone)]
pub struct PatchProfileCommand {
    pub learner_id: LearnerId,
    pub patch: ProfilePatch,
}

/// Handler for profile edits.
pub struct PatchProfileHandler {
    manager: Arc<UserContextManager>,
}

impl PatchProfileHandler {
    pub fn new(manager: Arc<UserContextManager>) -> Self {
        Self { manager }
    }

    pub async fn handle(&self, cmd: PatchProfileCommand) -> Result<SavedContext, DomainError> {
        if cmd.patch.is_empty() {
            return Err(DomainError::validation(
                "profile",
                "Patch must set at least one field",
            ));
        }
        self.manager.save(&cmd.learner_id, cmd.patch).await
    }
}
