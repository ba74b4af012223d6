//! Learner Context - Adaptive personalization engine for a tutoring platform
//!
//! This crate maintains long-lived per-learner state (preferences, skill
//! level, weak topics, goals, recent activity), derives ranked
//! recommendations from it and reshapes generated answers for the learner's
//! style. Contexts are persisted through a cache, a PostgreSQL primary store
//! and a local file fallback that is reconciled in the background.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
