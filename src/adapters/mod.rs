//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - Context tiers (memory, PostgreSQL, file) and the tiered store
//! - `accounts` - Account directory implementations
//! - `http` - axum REST API

pub mod accounts;
pub mod http;
pub mod storage;

pub use accounts::{InMemoryAccountDirectory, OpenAccountDirectory};
pub use http::{api_router, LearnerHandlers};
pub use storage::{
    FileContextStore, InMemoryContextTier, PgContextStore, Reconciler, ReconcilerConfig,
    TieredContextStore,
};
