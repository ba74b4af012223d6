//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Commands (track an interaction, patch a profile) go through the
//! `UserContextManager` merge protocol; queries read a context snapshot and
//! derive views from it.

pub mod handlers;

pub use handlers::*;
