//! Storage Adapters
//!
//! Implementations of the `ContextTier` and `ContextStore` ports.
//!
//! ## Available Adapters
//!
//! - **InMemoryContextTier** - Cache tier; also a primary double for tests
//! - **PgContextStore** - Primary tier backed by PostgreSQL
//! - **FileContextStore** - Local JSON fallback tier
//! - **TieredContextStore** - The three tiers behind one `ContextStore`
//! - **Reconciler** - Background sync of fallback copies into the primary
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileContextStore, InMemoryContextTier, PgContextStore, TieredContextStore};
//!
//! let store = TieredContextStore::new(
//!     InMemoryContextTier::cache(),
//!     Arc::new(PgContextStore::new(pool)),
//!     Arc::new(FileContextStore::new("./data/learner_contexts")),
//! );
//! ```

mod file_context_store;
mod in_memory_context_tier;
mod postgres_context_store;
mod reconciler;
mod tiered_store;

pub use file_context_store::FileContextStore;
pub use in_memory_context_tier::InMemoryContextTier;
pub use postgres_context_store::PgContextStore;
pub use reconciler::{
    FailureRecord, PendingReconciliation, ReconciliationQueue, Reconciler, ReconcilerConfig,
};
pub use tiered_store::{Reconciled, TieredContextStore, DEFAULT_PRIMARY_TIMEOUT};
