//! The learner context aggregate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::collections::{BoundedQueue, CappedSet};
use super::patch::ValidatedPatch;
use super::preferences::{ConfidenceLevel, LearningStyle, SkillLevel};
use super::signal::InteractionSignal;
use crate::domain::foundation::{LearnerId, Timestamp};
use crate::domain::topics::{Topic, TopicInferenceEngine};

pub const MAX_RECENT_QUESTIONS: usize = 10;
pub const MAX_WEAK_TOPICS: usize = 20;
pub const MAX_GOALS: usize = 10;
pub const MAX_LEARNING_STYLES: usize = 4;
pub const MAX_SESSION_TOPICS: usize = 50;
pub const MAX_TOPIC_CONFIDENCE: usize = 50;
pub const MAX_CONVERSATION_HISTORY: usize = 50;

/// Length at which a query is cut when used as an activity description.
const ACTIVITY_QUERY_CHARS: usize = 80;
/// Length at which an answer is cut before it enters the history.
const HISTORY_RESPONSE_CHARS: usize = 200;

pub type LearningStyles = CappedSet<LearningStyle, MAX_LEARNING_STYLES>;
pub type WeakTopics = CappedSet<Topic, MAX_WEAK_TOPICS>;
pub type Goals = CappedSet<String, MAX_GOALS>;
pub type SessionTopics = CappedSet<Topic, MAX_SESSION_TOPICS>;
pub type RecentQuestions = BoundedQueue<String, MAX_RECENT_QUESTIONS>;
pub type ConversationHistory = BoundedQueue<ConversationEntry, MAX_CONVERSATION_HISTORY>;

/// Learner preferences. The first learning style is the dominant one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub learning_style: LearningStyles,
    pub weak_topics: WeakTopics,
    pub goals: Goals,
    pub topic_confidence: BTreeMap<Topic, ConfidenceLevel>,
}

impl Preferences {
    pub fn dominant_style(&self) -> Option<LearningStyle> {
        self.learning_style.first().copied()
    }

    pub fn confidence_in(&self, topic: &Topic) -> Option<ConfidenceLevel> {
        self.topic_confidence.get(topic).copied()
    }
}

/// Activity within the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub start_time: Timestamp,
    pub interaction_count: u64,
    #[serde(default)]
    pub topics: SessionTopics,
}

impl SessionData {
    fn starting_at(start_time: Timestamp) -> Self {
        Self {
            start_time,
            interaction_count: 0,
            topics: SessionTopics::new(),
        }
    }
}

/// One tracked exchange kept in the persistent conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEntry {
    pub timestamp: Timestamp,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
}

/// Long-lived personalization state for one learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    learner_id: LearnerId,
    #[serde(default)]
    preferences: Preferences,
    #[serde(default)]
    skill_level: SkillLevel,
    #[serde(default)]
    last_activity_description: String,
    #[serde(default)]
    recent_questions: RecentQuestions,
    #[serde(default)]
    conversation_history: ConversationHistory,
    session_data: SessionData,
    created_at: Timestamp,
    last_updated: Timestamp,
}

impl UserContext {
    /// Default context for a learner seen for the first time.
    pub fn new(learner_id: LearnerId) -> Self {
        let now = Timestamp::now().trunc_micros();
        Self {
            learner_id,
            preferences: Preferences::default(),
            skill_level: SkillLevel::default(),
            last_activity_description: String::new(),
            recent_questions: RecentQuestions::new(),
            conversation_history: ConversationHistory::new(),
            session_data: SessionData::starting_at(now),
            created_at: now,
            last_updated: now,
        }
    }

    pub fn learner_id(&self) -> &LearnerId {
        &self.learner_id
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn skill_level(&self) -> SkillLevel {
        self.skill_level
    }

    pub fn last_activity_description(&self) -> &str {
        &self.last_activity_description
    }

    pub fn recent_questions(&self) -> &RecentQuestions {
        &self.recent_questions
    }

    /// Last 50 tracked exchanges, oldest first.
    pub fn conversation_history(&self) -> &ConversationHistory {
        &self.conversation_history
    }

    pub fn session_data(&self) -> &SessionData {
        &self.session_data
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_updated(&self) -> Timestamp {
        self.last_updated
    }

    /// True when this copy was written after `other`.
    pub fn is_newer_than(&self, other: &UserContext) -> bool {
        self.last_updated.is_after(&other.last_updated)
    }

    /// Merges one tracked interaction into the context.
    ///
    /// Returns the topics attributed to the interaction, top topic first.
    pub fn apply_interaction(
        &mut self,
        signal: &InteractionSignal,
        engine: &TopicInferenceEngine,
    ) -> Vec<Topic> {
        let mut topics = engine.infer(signal.query_text());
        if let Some(hint) = signal.topic_hint() {
            if !topics.contains(hint) {
                topics.push(hint.clone());
            }
        }

        self.session_data.topics.extend(topics.iter().cloned());
        if signal.was_correct() == Some(false) {
            self.preferences.weak_topics.extend(topics.iter().cloned());
        }

        self.recent_questions.push(signal.query_text().to_string());
        self.session_data.interaction_count += 1;

        let now = Timestamp::strictly_after(&self.last_updated);
        self.conversation_history.push(ConversationEntry {
            timestamp: now,
            query: signal.query_text().to_string(),
            response: signal
                .response()
                .map(|text| truncate_chars(text, HISTORY_RESPONSE_CHARS)),
            topic: topics.first().cloned(),
        });

        self.last_activity_description = match topics.first() {
            Some(top) => format!("Exploring {}", engine.label(top)),
            None => format!("Asked: {}", truncate_chars(signal.query_text(), ACTIVITY_QUERY_CHARS)),
        };

        self.last_updated = now;
        topics
    }

    /// Applies an explicit profile edit. Lists in the patch replace the
    /// stored lists; confidence entries are upserted per topic.
    pub fn apply_patch(&mut self, patch: ValidatedPatch) {
        if let Some(styles) = patch.learning_style {
            self.preferences.learning_style = styles;
        }
        if let Some(level) = patch.skill_level {
            self.skill_level = level;
        }
        if let Some(goals) = patch.goals {
            self.preferences.goals = goals;
        }
        if let Some(weak_topics) = patch.weak_topics {
            self.preferences.weak_topics = weak_topics;
        }
        if let Some(confidence) = patch.topic_confidence {
            for (topic, level) in confidence {
                if self.preferences.topic_confidence.len() >= MAX_TOPIC_CONFIDENCE
                    && !self.preferences.topic_confidence.contains_key(&topic)
                {
                    continue;
                }
                self.preferences.topic_confidence.insert(topic, level);
            }
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.last_updated = Timestamp::strictly_after(&self.last_updated);
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
