//! HTTP adapter for learner-context endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AdaptRequest, AdaptResponse, ContextResponse, DashboardResponse, ErrorResponse,
    PromptContextResponse, SavedContextResponse, SidebarResponse, TrackInteractionRequest,
};
pub use handlers::LearnerHandlers;
pub use routes::learner_routes;
