//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod learner;

pub use learner::{
    AdaptResponseCommand, AdaptResponseHandler, DashboardView, GetContextHandler,
    GetContextQuery, GetDashboardWidgetsHandler, GetPromptContextHandler, GetPromptContextQuery,
    GetSidebarWidgetsHandler, GetWidgetsQuery, PatchProfileCommand, PatchProfileHandler,
    SavedContext, SidebarView, TrackInteractionCommand, TrackInteractionHandler,
    TrackedInteraction, UserContextManager,
};
