//! HTTP DTOs for learner-context endpoints.
//!
//! Contexts are returned in their stored document shape (camelCase) under
//! `context`; the envelope fields are snake_case like the request bodies.

use serde::{Deserialize, Serialize};

use crate::application::handlers::learner::{
    DashboardView, SavedContext, SidebarView, TrackedInteraction,
};
use crate::domain::adaptation::{AdaptationStyle, AdaptedResponse};
use crate::domain::foundation::DomainError;
use crate::domain::learner::{PromptContext, SkillLevel, UserContext};
use crate::domain::recommendation::{
    FocusAreas, NextSteps, ProgressSummary, RecentActivity, WelcomeMessage, Widget,
};
use crate::domain::topics::Topic;
use crate::ports::{ContextSnapshot, TierKind};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to record one interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackInteractionRequest {
    pub query_text: String,
    #[serde(default)]
    pub was_correct: Option<bool>,
    #[serde(default)]
    pub topic_hint: Option<String>,
    /// Answer shown to the learner, kept in the conversation history.
    #[serde(default)]
    pub response: Option<String>,
}

/// Request to adapt a generated answer.
#[derive(Debug, Clone, Deserialize)]
pub struct AdaptRequest {
    pub raw_text: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct ContextResponse {
    pub context: UserContext,
    pub source: TierKind,
    pub stale: bool,
    pub degraded: bool,
}

impl From<ContextSnapshot> for ContextResponse {
    fn from(snapshot: ContextSnapshot) -> Self {
        Self {
            context: snapshot.context,
            source: snapshot.source,
            stale: snapshot.stale,
            degraded: snapshot.degraded,
        }
    }
}

/// Response for writes: the merged context and where it was persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SavedContextResponse {
    pub context: UserContext,
    pub persisted_to: TierKind,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inferred_topics: Option<Vec<Topic>>,
}

impl From<SavedContext> for SavedContextResponse {
    fn from(saved: SavedContext) -> Self {
        Self {
            context: saved.context,
            persisted_to: saved.receipt.tier,
            degraded: saved.receipt.degraded,
            inferred_topics: None,
        }
    }
}

impl From<TrackedInteraction> for SavedContextResponse {
    fn from(tracked: TrackedInteraction) -> Self {
        Self {
            inferred_topics: Some(tracked.topics),
            ..tracked.saved.into()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub widgets: Vec<Widget>,
    pub welcome: WelcomeMessage,
    pub progress: ProgressSummary,
    pub next_steps: NextSteps,
    pub stale: bool,
}

impl From<DashboardView> for DashboardResponse {
    fn from(view: DashboardView) -> Self {
        Self {
            widgets: view.widgets,
            welcome: view.welcome,
            progress: view.progress,
            next_steps: view.next_steps,
            stale: view.stale,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SidebarResponse {
    pub widgets: Vec<Widget>,
    pub focus_areas: FocusAreas,
    pub recent_activity: RecentActivity,
    pub stale: bool,
}

impl From<SidebarView> for SidebarResponse {
    fn from(view: SidebarView) -> Self {
        Self {
            widgets: view.widgets,
            focus_areas: view.focus_areas,
            recent_activity: view.recent_activity,
            stale: view.stale,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdaptResponse {
    pub styled_text: String,
    pub inserted_cues: Vec<String>,
    pub style: AdaptationStyle,
    pub skill_level: SkillLevel,
}

impl From<AdaptedResponse> for AdaptResponse {
    fn from(adapted: AdaptedResponse) -> Self {
        Self {
            styled_text: adapted.styled_text,
            inserted_cues: adapted.inserted_cues,
            style: adapted.style,
            skill_level: adapted.skill_level,
        }
    }
}

/// Prompt context plus its rendered text block.
#[derive(Debug, Clone, Serialize)]
pub struct PromptContextResponse {
    #[serde(flatten)]
    pub prompt: PromptContext,
    pub rendered: String,
}

impl From<PromptContext> for PromptContextResponse {
    fn from(prompt: PromptContext) -> Self {
        let rendered = prompt.render();
        Self { prompt, rendered }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&DomainError> for ErrorResponse {
    fn from(error: &DomainError) -> Self {
        let details = if error.details.is_empty() {
            None
        } else {
            serde_json::to_value(&error.details).ok()
        };
        Self {
            code: error.code().to_string(),
            message: error.message().to_string(),
            details,
        }
    }
}
