//! HTTP handlers for learner-context endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::application::handlers::learner::{
    AdaptResponseCommand, AdaptResponseHandler, GetContextHandler, GetContextQuery,
    GetDashboardWidgetsHandler, GetPromptContextHandler, GetPromptContextQuery,
    GetSidebarWidgetsHandler, GetWidgetsQuery, PatchProfileCommand, PatchProfileHandler,
    TrackInteractionCommand, TrackInteractionHandler, UserContextManager,
};
use crate::domain::adaptation::ResponseAdapter;
use crate::domain::foundation::{DomainError, ErrorCode, LearnerId};
use crate::domain::learner::{InteractionSignal, ProfilePatch};
use crate::domain::recommendation::RecommendationEngine;
use crate::domain::topics::Topic;

use super::dto::{
    AdaptRequest, AdaptResponse, ContextResponse, DashboardResponse, ErrorResponse,
    PromptContextResponse, SavedContextResponse, SidebarResponse, TrackInteractionRequest,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct LearnerHandlers {
    get_context: Arc<GetContextHandler>,
    track_interaction: Arc<TrackInteractionHandler>,
    dashboard: Arc<GetDashboardWidgetsHandler>,
    sidebar: Arc<GetSidebarWidgetsHandler>,
    adapt_response: Arc<AdaptResponseHandler>,
    patch_profile: Arc<PatchProfileHandler>,
    prompt_context: Arc<GetPromptContextHandler>,
}

impl LearnerHandlers {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        get_context: Arc<GetContextHandler>,
        track_interaction: Arc<TrackInteractionHandler>,
        dashboard: Arc<GetDashboardWidgetsHandler>,
        sidebar: Arc<GetSidebarWidgetsHandler>,
        adapt_response: Arc<AdaptResponseHandler>,
        patch_profile: Arc<PatchProfileHandler>,
        prompt_context: Arc<GetPromptContextHandler>,
    ) -> Self {
        Self {
            get_context,
            track_interaction,
            dashboard,
            sidebar,
            adapt_response,
            patch_profile,
            prompt_context,
        }
    }

    /// Wire every handler around one manager.
    pub fn from_manager(
        manager: Arc<UserContextManager>,
        recommendations: RecommendationEngine,
        adapter: ResponseAdapter,
    ) -> Self {
        let recommendations = Arc::new(recommendations);
        Self::new(
            Arc::new(GetContextHandler::new(manager.clone())),
            Arc::new(TrackInteractionHandler::new(manager.clone())),
            Arc::new(GetDashboardWidgetsHandler::new(
                manager.clone(),
                recommendations.clone(),
            )),
            Arc::new(GetSidebarWidgetsHandler::new(manager.clone(), recommendations)),
            Arc::new(AdaptResponseHandler::new(manager.clone(), adapter)),
            Arc::new(PatchProfileHandler::new(manager.clone())),
            Arc::new(GetPromptContextHandler::new(manager)),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/learners/:learner_id/context
pub async fn get_context(
    State(handlers): State<LearnerHandlers>,
    Path(learner_id): Path<String>,
) -> Response {
    let learner_id = match parse_learner_id(learner_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .get_context
        .handle(GetContextQuery { learner_id })
        .await
    {
        Ok(snapshot) => (StatusCode::OK, Json(ContextResponse::from(snapshot))).into_response(),
        Err(e) => handle_learner_error(e),
    }
}

/// POST /api/learners/:learner_id/interactions
pub async fn track_interaction(
    State(handlers): State<LearnerHandlers>,
    Path(learner_id): Path<String>,
    body: Result<Json<TrackInteractionRequest>, JsonRejection>,
) -> Response {
    let learner_id = match parse_learner_id(learner_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let req = match parse_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    let signal = match build_signal(req) {
        Ok(signal) => signal,
        Err(e) => return handle_learner_error(e),
    };

    match handlers
        .track_interaction
        .handle(TrackInteractionCommand { learner_id, signal })
        .await
    {
        Ok(tracked) => {
            (StatusCode::OK, Json(SavedContextResponse::from(tracked))).into_response()
        }
        Err(e) => handle_learner_error(e),
    }
}

/// GET /api/learners/:learner_id/widgets/dashboard
pub async fn get_dashboard_widgets(
    State(handlers): State<LearnerHandlers>,
    Path(learner_id): Path<String>,
) -> Response {
    let learner_id = match parse_learner_id(learner_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .dashboard
        .handle(GetWidgetsQuery { learner_id })
        .await
    {
        Ok(view) => (StatusCode::OK, Json(DashboardResponse::from(view))).into_response(),
        Err(e) => handle_learner_error(e),
    }
}

/// GET /api/learners/:learner_id/widgets/sidebar
pub async fn get_sidebar_widgets(
    State(handlers): State<LearnerHandlers>,
    Path(learner_id): Path<String>,
) -> Response {
    let learner_id = match parse_learner_id(learner_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.sidebar.handle(GetWidgetsQuery { learner_id }).await {
        Ok(view) => (StatusCode::OK, Json(SidebarResponse::from(view))).into_response(),
        Err(e) => handle_learner_error(e),
    }
}

/// POST /api/learners/:learner_id/adapt
pub async fn adapt_response(
    State(handlers): State<LearnerHandlers>,
    Path(learner_id): Path<String>,
    body: Result<Json<AdaptRequest>, JsonRejection>,
) -> Response {
    let learner_id = match parse_learner_id(learner_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let req = match parse_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    let cmd = AdaptResponseCommand {
        learner_id,
        raw_text: req.raw_text,
    };
    match handlers.adapt_response.handle(cmd).await {
        Ok(adapted) => (StatusCode::OK, Json(AdaptResponse::from(adapted))).into_response(),
        Err(e) => handle_learner_error(e),
    }
}

/// PATCH /api/learners/:learner_id/profile
pub async fn patch_profile(
    State(handlers): State<LearnerHandlers>,
    Path(learner_id): Path<String>,
    body: Result<Json<ProfilePatch>, JsonRejection>,
) -> Response {
    let learner_id = match parse_learner_id(learner_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let patch = match parse_body(body) {
        Ok(patch) => patch,
        Err(response) => return response,
    };

    match handlers
        .patch_profile
        .handle(PatchProfileCommand { learner_id, patch })
        .await
    {
        Ok(saved) => (StatusCode::OK, Json(SavedContextResponse::from(saved))).into_response(),
        Err(e) => handle_learner_error(e),
    }
}

/// GET /api/learners/:learner_id/prompt-context
pub async fn get_prompt_context(
    State(handlers): State<LearnerHandlers>,
    Path(learner_id): Path<String>,
) -> Response {
    let learner_id = match parse_learner_id(learner_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .prompt_context
        .handle(GetPromptContextQuery { learner_id })
        .await
    {
        Ok(prompt) => {
            (StatusCode::OK, Json(PromptContextResponse::from(prompt))).into_response()
        }
        Err(e) => handle_learner_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Request parsing
// ════════════════════════════════════════════════════════════════════════════

fn parse_learner_id(raw: String) -> Result<LearnerId, Response> {
    LearnerId::new(raw).map_err(|e| handle_learner_error(e.into()))
}

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(value)| value).map_err(|rejection| {
        handle_learner_error(DomainError::validation("body", rejection.body_text()))
    })
}

fn build_signal(req: TrackInteractionRequest) -> Result<InteractionSignal, DomainError> {
    let mut signal = InteractionSignal::new(req.query_text)?;
    if let Some(correct) = req.was_correct {
        signal = signal.with_correctness(correct);
    }
    if let Some(hint) = req.topic_hint {
        signal = signal.with_topic_hint(Topic::new(hint)?);
    }
    if let Some(response) = req.response {
        signal = signal.with_response(response);
    }
    Ok(signal)
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_learner_error(error: DomainError) -> Response {
    let status = match error.code() {
        ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorCode::LearnerNotFound => StatusCode::NOT_FOUND,
        ErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::ReconciliationFailure | ErrorCode::InternalError => {
            error!(error = %error, "Learner request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::from(&error))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_maps_to_400() {
        let error = DomainError::validation("query_text", "Invalid value");
        assert_eq!(handle_learner_error(error).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn learner_not_found_maps_to_404() {
        let error = DomainError::learner_not_found("u1");
        assert_eq!(handle_learner_error(error).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_unavailable_maps_to_503() {
        let error = DomainError::new(ErrorCode::StoreUnavailable, "down");
        assert_eq!(
            handle_learner_error(error).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn internal_error_maps_to_500() {
        let error = DomainError::new(ErrorCode::InternalError, "boom");
        assert_eq!(
            handle_learner_error(error).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn blank_query_text_is_rejected() {
        let req = TrackInteractionRequest {
            query_text: "   ".to_string(),
            was_correct: None,
            topic_hint: None,
            response: None,
        };
        assert!(build_signal(req).is_err());
    }

    #[test]
    fn signal_carries_correctness_and_hint() {
        let req = TrackInteractionRequest {
            query_text: "normal forms".to_string(),
            was_correct: Some(false),
            topic_hint: Some("DBMS".to_string()),
            response: Some("Normal forms reduce redundancy.".to_string()),
        };
        let signal = build_signal(req).unwrap();
        assert_eq!(signal.was_correct(), Some(false));
        assert_eq!(signal.response(), Some("Normal forms reduce redundancy."));
        assert_eq!(signal.topic_hint().map(Topic::as_str), Some("dbms"));
    }
}
