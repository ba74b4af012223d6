//! Learner application handlers.
//!
//! Command and query handlers behind the learner-context API. All of them
//! go through [`UserContextManager`], which owns the merge protocol.

mod adapt_response;
mod get_context;
mod get_prompt_context;
mod get_widgets;
mod manager;
mod patch_profile;
#[cfg(test)]
mod test_support;
mod track_interaction;

pub use adapt_response::{AdaptResponseCommand, AdaptResponseHandler};
pub use get_context::{GetContextHandler, GetContextQuery};
pub use get_prompt_context::{GetPromptContextHandler, GetPromptContextQuery};
pub use get_widgets::{
    DashboardView, GetDashboardWidgetsHandler, GetSidebarWidgetsHandler, GetWidgetsQuery,
    SidebarView,
};
pub use manager::{SavedContext, TrackedInteraction, UserContextManager};
pub use patch_profile::{PatchProfileCommand, PatchProfileHandler};
pub use track_interaction::{TrackInteractionCommand, TrackInteractionHandler};
