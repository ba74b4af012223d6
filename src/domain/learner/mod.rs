//! Learner module - Per-learner personalization state.
//!
//! A [`UserContext`] is created with defaults the first time a learner is
//! seen, then mutated by tracked interactions and explicit profile edits.
//!
//! # Domain Invariants
//!
//! 1. The learner id is never empty and never reassigned
//! 2. Recent questions hold at most 10 entries and the conversation history
//!    at most 50, oldest evicted first
//! 3. Weak topics (20) and goals (10) are deduplicated and capped, FIFO
//! 4. `lastUpdated` strictly increases on every mutation
//! 5. Skill level changes only through an explicit profile edit

mod collections;
mod context;
mod patch;
mod preferences;
mod prompt;
mod signal;

pub use collections::{BoundedQueue, CappedSet};
pub use context::{
    ConversationEntry, ConversationHistory, Goals, LearningStyles, Preferences,
    RecentQuestions, SessionData, SessionTopics, UserContext, WeakTopics,
    MAX_CONVERSATION_HISTORY, MAX_GOALS, MAX_LEARNING_STYLES, MAX_RECENT_QUESTIONS,
    MAX_SESSION_TOPICS, MAX_TOPIC_CONFIDENCE, MAX_WEAK_TOPICS,
};
pub use patch::{ProfilePatch, ValidatedPatch};
pub use preferences::{ConfidenceLevel, LearningStyle, SkillLevel};
pub use prompt::PromptContext;
pub use signal::InteractionSignal;
