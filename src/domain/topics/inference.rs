//! Keyword-based topic inference.

use once_cell::sync::Lazy;
use std::sync::Arc;

use super::lexicon::tokenize;
use super::{Lexicon, Topic};

/// Maps free text onto the topic vocabulary of a [`Lexicon`].
///
/// Deterministic and side-effect free. Text with no recognised phrase yields
/// an empty result.
#[derive(Debug, Clone)]
pub struct TopicInferenceEngine {
    lexicon: Arc<Lexicon>,
}

impl TopicInferenceEngine {
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            lexicon: Arc::new(lexicon),
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Returns every matching topic once, ordered by where it is first
    /// mentioned in the text. The first element is the top topic.
    pub fn infer(&self, text: &str) -> Vec<Topic> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(usize, usize, &Topic)> = self
            .lexicon
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(order, entry)| {
                entry
                    .first_match(&tokens)
                    .map(|position| (position, order, entry.topic()))
            })
            .collect();
        hits.sort_by_key(|(position, order, _)| (*position, *order));
        hits.into_iter().map(|(_, _, topic)| topic.clone()).collect()
    }

    /// Display label for a topic.
    pub fn label(&self, topic: &Topic) -> String {
        self.lexicon.label_for(topic)
    }
}

static BUILTIN_LEXICON: Lazy<Arc<Lexicon>> = Lazy::new(|| Arc::new(Lexicon::builtin()));

impl Default for TopicInferenceEngine {
    /// Engine over the built-in lexicon, shared across instances.
    fn default() -> Self {
        Self {
            lexicon: Arc::clone(&BUILTIN_LEXICON),
        }
    }
}
