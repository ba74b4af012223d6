//! HTTP adapters - REST API implementations.
//!
//! `api_router` assembles the learner-context routes with request tracing,
//! a request timeout and CORS.

pub mod personalization;

use axum::{
    http::{HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::ServerConfig;

pub use personalization::{learner_routes, LearnerHandlers};

/// Complete API router.
pub fn api_router(handlers: LearnerHandlers, server: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/learners", learner_routes(handlers))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(server.request_timeout()))
                .layer(cors_layer(&server.cors_origins_list())),
        )
}

/// Permissive when no origins are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
