//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, error types and the per-key lock table
//! that form the vocabulary of the learner context domain.

mod errors;
mod ids;
mod keyed_locks;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::LearnerId;
pub use keyed_locks::{KeyedGuard, KeyedLocks};
pub use timestamp::Timestamp;
