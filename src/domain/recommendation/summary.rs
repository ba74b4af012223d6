//! Summary cards shown next to the ranked widgets: welcome, progress and
//! learning path on the dashboard; focus areas and recent activity in the
//! sidebar.

use serde::Serialize;

use crate::domain::learner::{SkillLevel, UserContext};
use crate::domain::topics::TopicInferenceEngine;

/// Interactions a learning path counts towards.
pub const LEARNING_PATH_TARGET: u64 = 10;
const MAX_NEXT_STEPS: usize = 3;

/// Fillers used when the context yields fewer than three steps.
const GENERAL_STEPS: [&str; 4] = [
    "Take a practice quiz to identify knowledge gaps",
    "Complete a learning assessment to update your profile",
    "Try a visualization exercise for a difficult concept",
    "Attempt the interactive coding exercises",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WelcomeMessage {
    pub message: String,
    pub subtitle: String,
    pub encouragement: String,
}

impl WelcomeMessage {
    pub fn for_context(ctx: &UserContext) -> Self {
        let message = if ctx.session_data().interaction_count > 0 {
            "Welcome back!".to_string()
        } else {
            "Welcome!".to_string()
        };

        let subtitle = match ctx.last_activity_description() {
            "" => "Let's continue your learning journey.".to_string(),
            activity => format!("Last time: {}.", activity),
        };

        let encouragement = match ctx.skill_level() {
            SkillLevel::Beginner => "Building strong foundations today!",
            SkillLevel::Intermediate => "You're making great progress!",
            SkillLevel::Advanced => "Ready for advanced challenges?",
        }
        .to_string();

        Self {
            message,
            subtitle,
            encouragement,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub interactions: u64,
    pub topics_explored: usize,
    pub weak_topics: usize,
    pub goals: usize,
    pub level: String,
    pub message: String,
}

impl ProgressSummary {
    pub fn for_context(ctx: &UserContext) -> Self {
        let interactions = ctx.session_data().interaction_count;
        let message = match interactions {
            0..=2 => "Just starting out? Let's build momentum!",
            3..=10 => "You're making good progress!",
            _ => "Great work! You're learning consistently.",
        }
        .to_string();

        Self {
            interactions,
            topics_explored: ctx.session_data().topics.len(),
            weak_topics: ctx.preferences().weak_topics.len(),
            goals: ctx.preferences().goals.len(),
            level: ctx.skill_level().label().to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LearningStep {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathProgress {
    pub completed: u64,
    pub total: u64,
    pub message: String,
}

/// "Your Learning Path": up to three concrete next steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextSteps {
    pub title: String,
    pub description: String,
    pub steps: Vec<LearningStep>,
    pub current_progress: PathProgress,
}

impl NextSteps {
    /// Steps come from the first two weak topics, the topic of the first
    /// goal, then the skill level, topped up from a fixed list.
    pub fn for_context(ctx: &UserContext, topics: &TopicInferenceEngine) -> Self {
        let prefs = ctx.preferences();
        let mut texts: Vec<String> = Vec::with_capacity(MAX_NEXT_STEPS + 1);

        let mut weak = prefs.weak_topics.iter();
        if let Some(topic) = weak.next() {
            texts.push(format!("Complete the {} practice exercises", topics.label(topic)));
        }
        if let Some(topic) = weak.next() {
            texts.push(format!("Review the {} flashcards", topics.label(topic)));
        }

        let goal_topic = prefs
            .goals
            .first()
            .and_then(|goal| topics.infer(goal).into_iter().next());
        if let Some(topic) = goal_topic {
            texts.push(format!("Take the {} assessment quiz", topics.label(&topic)));
        }

        texts.push(
            match ctx.skill_level() {
                SkillLevel::Beginner => "Complete the CS Fundamentals interactive tutorial",
                SkillLevel::Intermediate => "Try the programming challenge to test your skills",
                SkillLevel::Advanced => "Tackle the advanced algorithm optimization exercises",
            }
            .to_string(),
        );

        for filler in GENERAL_STEPS {
            if texts.len() >= MAX_NEXT_STEPS {
                break;
            }
            texts.push(filler.to_string());
        }
        texts.truncate(MAX_NEXT_STEPS);

        Self {
            title: "Your Learning Path".to_string(),
            description: "Focus on these next steps to reach your goals.".to_string(),
            steps: texts
                .into_iter()
                .enumerate()
                .map(|(i, text)| LearningStep {
                    id: format!("step_{}", i + 1),
                    text,
                })
                .collect(),
            current_progress: PathProgress {
                completed: ctx.session_data().interaction_count,
                total: LEARNING_PATH_TARGET,
                message: "Keep going!".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusTopic {
    pub id: String,
    pub name: String,
}

/// "Focus Areas": the learner's weak topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusAreas {
    pub title: String,
    pub topics: Vec<FocusTopic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FocusAreas {
    pub fn for_context(ctx: &UserContext, topics: &TopicInferenceEngine) -> Self {
        let weak = &ctx.preferences().weak_topics;
        Self {
            title: "Focus Areas".to_string(),
            topics: weak
                .iter()
                .enumerate()
                .map(|(i, topic)| FocusTopic {
                    id: format!("topic_{}", i + 1),
                    name: topics.label(topic),
                })
                .collect(),
            message: weak
                .is_empty()
                .then(|| "No specific focus areas identified yet. Keep learning!".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityItem {
    pub id: String,
    pub text: String,
}

/// "Recent Activity": recent questions, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentActivity {
    pub title: String,
    pub items: Vec<ActivityItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecentActivity {
    pub fn for_context(ctx: &UserContext) -> Self {
        let questions = ctx.recent_questions();
        Self {
            title: "Recent Activity".to_string(),
            items: questions
                .iter()
                .rev()
                .enumerate()
                .map(|(i, question)| ActivityItem {
                    id: format!("activity_{}", i + 1),
                    text: question.clone(),
                })
                .collect(),
            message: questions
                .is_empty()
                .then(|| "No recent activity. Start exploring!".to_string()),
        }
    }
}
