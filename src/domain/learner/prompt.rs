//! Compact learner summary for inclusion in text-generation prompts.

use serde::Serialize;
use std::fmt::Write;

use super::context::UserContext;
use super::preferences::{LearningStyle, SkillLevel};

const PROMPT_RECENT_TOPICS: usize = 5;
const PROMPT_RECENT_QUESTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptContext {
    pub skill_level: SkillLevel,
    pub learning_styles: Vec<LearningStyle>,
    pub goals: Vec<String>,
    pub weak_topics: Vec<String>,
    /// Most recently explored session topics, newest last.
    pub recent_topics: Vec<String>,
    pub interaction_count: u64,
    pub last_activity: String,
    /// Latest questions, newest last.
    pub recent_questions: Vec<String>,
}

impl PromptContext {
    pub fn from_context(ctx: &UserContext) -> Self {
        let prefs = ctx.preferences();
        let session_topics = ctx.session_data().topics.as_slice();
        let questions: Vec<&String> = ctx.recent_questions().iter().collect();

        Self {
            skill_level: ctx.skill_level(),
            learning_styles: prefs.learning_style.iter().copied().collect(),
            goals: prefs.goals.iter().cloned().collect(),
            weak_topics: prefs.weak_topics.iter().map(|t| t.to_string()).collect(),
            recent_topics: session_topics[session_topics.len().saturating_sub(PROMPT_RECENT_TOPICS)..]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            interaction_count: ctx.session_data().interaction_count,
            last_activity: ctx.last_activity_description().to_string(),
            recent_questions: questions[questions.len().saturating_sub(PROMPT_RECENT_QUESTIONS)..]
                .iter()
                .map(|q| (*q).clone())
                .collect(),
        }
    }

    /// Plain-text rendering, one fact per line, omitting empty facts.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Skill level: {}", self.skill_level);
        if !self.learning_styles.is_empty() {
            let styles: Vec<&str> = self.learning_styles.iter().map(|s| s.as_str()).collect();
            let _ = writeln!(out, "Learning style: {}", styles.join(", "));
        }
        if !self.goals.is_empty() {
            let _ = writeln!(out, "Goals: {}", self.goals.join("; "));
        }
        if !self.weak_topics.is_empty() {
            let _ = writeln!(out, "Needs practice with: {}", self.weak_topics.join(", "));
        }
        if !self.recent_topics.is_empty() {
            let _ = writeln!(out, "Recently explored: {}", self.recent_topics.join(", "));
        }
        let _ = writeln!(out, "Interactions this session: {}", self.interaction_count);
        if !self.last_activity.is_empty() {
            let _ = writeln!(out, "Last activity: {}", self.last_activity);
        }
        for question in &self.recent_questions {
            let _ = writeln!(out, "Recent question: {}", question);
        }
        out
    }
}
