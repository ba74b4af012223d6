//! Topic module - Topic tags and keyword inference over free text.
//!
//! Inference is plain phrase matching against a [`Lexicon`]; there is no
//! scoring or confidence attached to a match.

mod inference;
mod lexicon;
mod topic;

pub use inference::TopicInferenceEngine;
pub use lexicon::{Lexicon, LexiconEntry};
pub use topic::Topic;
