//! TrackInteraction - Command handler merging one interaction into a
//! learner's context.

use std::sync::Arc;

use super::manager::{TrackedInteraction, UserContextManager};
use crate::domain::foundation::{DomainError, LearnerId};
use crate::domain::learner::InteractionSignal;

/// Command to record an interaction.
#[derive(Debug, Clone)]
pub struct TrackInteractionCommand {
    pub learner_id: LearnerId,
    pub signal: InteractionSignal,
}

/// Handler for tracking interactions.
pub struct TrackInteractionHandler {
    manager: Arc<UserContextManager>,
}

impl TrackInteractionHandler {
    pub fn new(manager: Arc<UserContextManager>) -> Self {
        Self { manager }
    }

    pub async fn handle(
        &self,
        cmd: TrackInteractionCommand,
    ) -> Result<TrackedInteraction, DomainError> {
        self.manager.update(&cmd.learner_id, &cmd.signal).await
    }
}
