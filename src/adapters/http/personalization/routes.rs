//! HTTP routes for learner-context endpoints.

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers::{
    adapt_response, get_context, get_dashboard_widgets, get_prompt_context,
    get_sidebar_widgets, patch_profile, track_interaction, LearnerHandlers,
};

/// Creates the learner router. Mount under `/api/learners`.
pub fn learner_routes(handlers: LearnerHandlers) -> Router {
    Router::new()
        .route("/:learner_id/context", get(get_context))
        .route("/:learner_id/interactions", post(track_interaction))
        .route("/:learner_id/widgets/dashboard", get(get_dashboard_widgets))
        .route("/:learner_id/widgets/sidebar", get(get_sidebar_widgets))
        .route("/:learner_id/adapt", post(adapt_response))
        .route("/:learner_id/profile", patch(patch_profile))
        .route("/:learner_id/prompt-context", get(get_prompt_context))
        .with_state(handlers)
}
