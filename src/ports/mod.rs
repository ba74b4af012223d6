//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `ContextTier` - One storage layer (cache, primary, file fallback)
//! - `ContextStore` - The tiered store the application reads and writes
//!
//! ## Collaborator Ports
//!
//! - `AccountDirectory` - Whether a learner id belongs to a known account

mod account_directory;
mod context_store;
mod context_tier;

pub use account_directory::{AccountDirectory, AccountError};
pub use context_store::{ContextSnapshot, ContextStore, ContextStoreError, PutReceipt};
pub use context_tier::{ContextTier, StoreOutcome, TierError, TierKind};
