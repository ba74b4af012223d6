//! Recommendation widgets.

use serde::Serialize;
use std::fmt;

use crate::domain::learner::LearningStyle;
use crate::domain::topics::Topic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Flashcards,
    Game,
    Resource,
    GoalNudge,
}

impl WidgetKind {
    /// Learning styles this kind of widget suits.
    pub fn suited_styles(&self) -> &'static [LearningStyle] {
        match self {
            Self::Flashcards => &[LearningStyle::Reading, LearningStyle::Visual],
            Self::Game => &[LearningStyle::Kinesthetic, LearningStyle::Visual],
            Self::Resource => &[LearningStyle::Reading, LearningStyle::Auditory],
            Self::GoalNudge => &[],
        }
    }

    /// Kinds shown in the compact sidebar.
    pub fn fits_sidebar(&self) -> bool {
        matches!(self, Self::Flashcards | Self::Game)
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Flashcards => "flashcards",
            Self::Game => "game",
            Self::Resource => "resource",
            Self::GoalNudge => "goal_nudge",
        };
        write!(f, "{}", s)
    }
}

/// A ranked recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Widget {
    pub id: String,
    pub kind: WidgetKind,
    pub title: String,
    pub description: String,
    pub topics: Vec<Topic>,
    pub score: f64,
}

impl Widget {
    pub(crate) fn candidate(
        id: impl Into<String>,
        kind: WidgetKind,
        title: impl Into<String>,
        description: impl Into<String>,
        topics: Vec<Topic>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            description: description.into(),
            topics,
            score: 0.0,
        }
    }
}
