//! Adaptation module - Style transforms applied to already generated answers.
//!
//! Nothing here calls a text-generation service; the adapter only adds an
//! introduction and cue paragraphs around the answer it is given.

mod adapter;
mod style;

pub use adapter::{AdaptedResponse, ResponseAdapter};
pub use style::{AdaptationStyle, CueKind, CueRule, StyleRegistry, StyleTransform};
