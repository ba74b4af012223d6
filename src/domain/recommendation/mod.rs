//! Recommendation module - Ranked widgets derived from a learner context.
//!
//! Every candidate is scored as
//! `0.4 * goal + 0.3 * weak_topic + 0.2 * style + 0.1 * recency`.
//! Zero-score candidates are dropped and equal scores keep generation order.

mod catalog;
mod engine;
mod summary;
mod widget;

pub use engine::{
    RecommendationEngine, ScoringWeights, DEFAULT_DASHBOARD_TOP_N, DEFAULT_SIDEBAR_TOP_N,
};
pub use summary::{
    ActivityItem, FocusAreas, FocusTopic, LearningStep, NextSteps, PathProgress, ProgressSummary,
    RecentActivity, WelcomeMessage, LEARNING_PATH_TARGET,
};
pub use widget::{Widget, WidgetKind};
