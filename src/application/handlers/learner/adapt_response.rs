//! AdaptResponse - Reshapes a generated answer for the learner's style.

use std::sync::Arc;

use super::manager::UserContextManager;
use crate::domain::adaptation::{AdaptedResponse, ResponseAdapter};
use crate::domain::foundation::{DomainError, LearnerId};

/// Command to adapt an already generated answer.
#[derive(Debug, Clone)]
pub struct AdaptResponseCommand {
    pub learner_id: LearnerId,
    pub raw_text: String,
}

/// Handler for response adaptation.
pub struct AdaptResponseHandler {
    manager: Arc<UserContextManager>,
    adapter: ResponseAdapter,
}

impl AdaptResponseHandler {
    pub fn new(manager: Arc<UserContextManager>, adapter: ResponseAdapter) -> Self {
        Self { manager, adapter }
    }

    pub async fn handle(&self, cmd: AdaptResponseCommand) -> Result<AdaptedResponse, DomainError> {
        let snapshot = self.manager.get_or_create(&cmd.learner_id).await?;
        Ok(self.adapter.adapt(&cmd.raw_text, &snapshot.context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::learner::test_support::{learner, manager};
    use crate::domain::adaptation::AdaptationStyle;
    use crate::domain::learner::ProfilePatch;

    #[tokio::test]
    async fn answer_is_adapted_for_learner_style() {
        let manager = manager();
        let patch = ProfilePatch {
            learning_style: Some(vec!["visual".to_string()]),
            ..Default::default()
        };
        manager.save(&learner("u1"), patch).await.unwrap();

        let handler = AdaptResponseHandler::new(manager, ResponseAdapter::default());
        let raw = "Recursion is a function calling itself.\n\nEvery recursion needs a base case.";
        let adapted = handler
            .handle(AdaptResponseCommand {
                learner_id: learner("u1"),
                raw_text: raw.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(adapted.style, AdaptationStyle::Visual);
        assert!(adapted.styled_text.contains("Recursion is a function calling itself."));
        assert!(adapted.styled_text.contains("Every recursion needs a base case."));
    }

    #[tokio::test]
    async fn unknown_learner_is_rejected() {
        let handler = AdaptResponseHandler::new(manager(), ResponseAdapter::default());
        let result = handler
            .handle(AdaptResponseCommand {
                learner_id: learner("nobody"),
                raw_text: "text".to_string(),
            })
            .await;
        assert!(result.is_err());
    }
}
