//! Interaction signal reported by chat, quiz and other request paths.

use crate::domain::foundation::ValidationError;
use crate::domain::topics::Topic;

/// One tracked learner interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionSignal {
    query_text: String,
    was_correct: Option<bool>,
    topic_hint: Option<Topic>,
    response: Option<String>,
}

impl InteractionSignal {
    /// Creates a signal; the query text must contain something other than
    /// whitespace.
    pub fn new(query_text: impl Into<String>) -> Result<Self, ValidationError> {
        let query_text = query_text.into();
        if query_text.trim().is_empty() {
            return Err(ValidationError::empty_field("query_text"));
        }
        Ok(Self {
            query_text,
            was_correct: None,
            topic_hint: None,
            response: None,
        })
    }

    /// Outcome of a graded interaction such as a quiz answer.
    pub fn with_correctness(mut self, was_correct: bool) -> Self {
        self.was_correct = Some(was_correct);
        self
    }

    pub fn with_topic_hint(mut self, topic: Topic) -> Self {
        self.topic_hint = Some(topic);
        self
    }

    /// Answer given to the query, kept in the conversation history.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn was_correct(&self) -> Option<bool> {
        self.was_correct
    }

    pub fn topic_hint(&self) -> Option<&Topic> {
        self.topic_hint.as_ref()
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }
}
