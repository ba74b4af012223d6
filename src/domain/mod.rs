//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, timestamps, errors)
//! - `learner` - Learner context aggregate, preferences and profile edits
//! - `topics` - Topic tags and keyword inference
//! - `recommendation` - Weighted widget ranking and dashboard summaries
//! - `adaptation` - Style transforms for generated answers

pub mod adaptation;
pub mod foundation;
pub mod learner;
pub mod recommendation;
pub mod topics;
