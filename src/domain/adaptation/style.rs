//! Style transforms keyed by (adaptation style, skill level).

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::domain::learner::{LearningStyle, SkillLevel};

/// Presentation style applied to an answer. `Textual` is used when the
/// learner has no recorded learning style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdaptationStyle {
    Visual,
    Auditory,
    Kinesthetic,
    Reading,
    Textual,
}

impl AdaptationStyle {
    pub const ALL: [AdaptationStyle; 5] = [
        AdaptationStyle::Visual,
        AdaptationStyle::Auditory,
        AdaptationStyle::Kinesthetic,
        AdaptationStyle::Reading,
        AdaptationStyle::Textual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Auditory => "auditory",
            Self::Kinesthetic => "kinesthetic",
            Self::Reading => "reading",
            Self::Textual => "textual",
        }
    }
}

impl From<Option<LearningStyle>> for AdaptationStyle {
    fn from(style: Option<LearningStyle>) -> Self {
        match style {
            Some(LearningStyle::Visual) => Self::Visual,
            Some(LearningStyle::Auditory) => Self::Auditory,
            Some(LearningStyle::Kinesthetic) => Self::Kinesthetic,
            Some(LearningStyle::Reading) => Self::Reading,
            None => Self::Textual,
        }
    }
}

impl fmt::Display for AdaptationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of cue marker inserted into an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    Diagram,
    TryThis,
    Recap,
    Note,
}

impl CueKind {
    pub const ALL: [CueKind; 4] = [CueKind::Diagram, CueKind::TryThis, CueKind::Recap, CueKind::Note];

    /// Leading text every marker of this kind starts with.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Diagram => "[DIAGRAM:",
            Self::TryThis => "Try this:",
            Self::Recap => "[RECAP]",
            Self::Note => "[NOTE]",
        }
    }

    /// Whether a paragraph is a marker inserted by an adapter.
    pub fn is_cue(paragraph: &str) -> bool {
        let trimmed = paragraph.trim_start();
        Self::ALL.iter().any(|kind| trimmed.starts_with(kind.prefix()))
    }

    /// Marker text for the paragraph it follows.
    pub fn render(&self, paragraph: &str, skill: SkillLevel) -> String {
        match self {
            Self::Diagram => format!("[DIAGRAM: {}]", headline(paragraph)),
            Self::TryThis => format!(
                "Try this: {}",
                match skill {
                    SkillLevel::Beginner => "rework this step by hand with a small example of your own.",
                    SkillLevel::Intermediate => "change one input and predict the result before checking it.",
                    SkillLevel::Advanced => "find an edge case that would break a naive version of this.",
                }
            ),
            Self::Recap => format!("[RECAP] Say the key idea out loud: {}", first_sentence(paragraph)),
            Self::Note => "[NOTE] Write down the key terms from this answer in your own words.".to_string(),
        }
    }
}

/// Where cue markers go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueRule {
    None,
    /// A marker after each of the first `max` paragraphs.
    AfterParagraphs { kind: CueKind, max: usize },
    /// A single marker after the last paragraph, rendered from the first.
    Closing(CueKind),
}

/// Deterministic text-shaping parameters for one (style, skill) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTransform {
    pub introduction: String,
    pub cues: CueRule,
}

impl StyleTransform {
    pub fn new(introduction: impl Into<String>, cues: CueRule) -> Self {
        Self {
            introduction: introduction.into(),
            cues,
        }
    }
}

/// Fixed lookup table of style transforms.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    transforms: HashMap<(AdaptationStyle, SkillLevel), StyleTransform>,
}

impl StyleRegistry {
    /// Registry covering every style and skill level.
    pub fn builtin() -> Self {
        use AdaptationStyle::*;
        use SkillLevel::*;

        let mut registry = Self {
            transforms: HashMap::new(),
        };
        let diagrams = |max| CueRule::AfterParagraphs {
            kind: CueKind::Diagram,
            max,
        };
        let exercises = |max| CueRule::AfterParagraphs {
            kind: CueKind::TryThis,
            max,
        };

        registry
            .register(Visual, Beginner, StyleTransform::new(
                "Let's picture this step by step. Look for the diagram markers as you read.",
                diagrams(3),
            ))
            .register(Visual, Intermediate, StyleTransform::new(
                "Here is a visual walkthrough. Sketch each marked diagram to check your mental model.",
                diagrams(2),
            ))
            .register(Visual, Advanced, StyleTransform::new(
                "A compact explanation, with a diagram marker where structure matters most.",
                diagrams(1),
            ))
            .register(Auditory, Beginner, StyleTransform::new(
                "Try reading this aloud. Hearing each step helps it stick.",
                CueRule::Closing(CueKind::Recap),
            ))
            .register(Auditory, Intermediate, StyleTransform::new(
                "Talk this through as you read, as if explaining it to a friend.",
                CueRule::Closing(CueKind::Recap),
            ))
            .register(Auditory, Advanced, StyleTransform::new(
                "Read this through once, then explain the trade-offs aloud.",
                CueRule::Closing(CueKind::Recap),
            ))
            .register(Kinesthetic, Beginner, StyleTransform::new(
                "Let's learn by doing. Pause at each exercise and try it yourself.",
                exercises(3),
            ))
            .register(Kinesthetic, Intermediate, StyleTransform::new(
                "Work through this hands-on. Each exercise builds on the last.",
                exercises(2),
            ))
            .register(Kinesthetic, Advanced, StyleTransform::new(
                "Experiment with the idea below before moving on.",
                exercises(1),
            ))
            .register(Reading, Beginner, StyleTransform::new(
                "Here is a step-by-step written explanation. Take notes as you go.",
                CueRule::Closing(CueKind::Note),
            ))
            .register(Reading, Intermediate, StyleTransform::new(
                "A structured written explanation follows.",
                CueRule::Closing(CueKind::Note),
            ))
            .register(Reading, Advanced, StyleTransform::new(
                "A concise written summary follows.",
                CueRule::Closing(CueKind::Note),
            ))
            .register(Textual, Beginner, StyleTransform::new(
                "Here is a clear explanation to get you started.",
                CueRule::None,
            ))
            .register(Textual, Intermediate, StyleTransform::new(
                "Here is an explanation building on what you already know.",
                CueRule::None,
            ))
            .register(Textual, Advanced, StyleTransform::new(
                "Here is a detailed explanation.",
                CueRule::None,
            ));
        registry
    }

    /// Adds or replaces the transform for a (style, skill) pair.
    pub fn register(
        &mut self,
        style: AdaptationStyle,
        skill: SkillLevel,
        transform: StyleTransform,
    ) -> &mut Self {
        self.transforms.insert((style, skill), transform);
        self
    }

    pub fn get(&self, style: AdaptationStyle, skill: SkillLevel) -> Option<&StyleTransform> {
        self.transforms.get(&(style, skill))
    }

    /// Every non-empty introduction in the registry.
    pub fn introductions(&self) -> impl Iterator<Item = &str> {
        self.transforms
            .values()
            .map(|t| t.introduction.as_str())
            .filter(|intro| !intro.is_empty())
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// First line of a paragraph, without heading or list markers, capped at
/// eight words.
fn headline(paragraph: &str) -> String {
    let line = paragraph.lines().next().unwrap_or_default();
    let line = line.trim().trim_start_matches(['#', '-', '*', '>']).trim();
    let words: Vec<&str> = line.split_whitespace().take(8).collect();
    words
        .join(" ")
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .to_string()
}

fn first_sentence(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.find(['.', '!', '?']) {
        Some(end) => flat[..=end].to_string(),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_covers_every_pair() {
        let registry = StyleRegistry::builtin();
        for style in AdaptationStyle::ALL {
            for skill in SkillLevel::ALL {
                assert!(registry.get(style, skill).is_some(), "{}/{}", style, skill);
            }
        }
    }

    #[test]
    fn empty_style_maps_to_textual() {
        assert_eq!(AdaptationStyle::from(None), AdaptationStyle::Textual);
        assert_eq!(
            AdaptationStyle::from(Some(LearningStyle::Kinesthetic)),
            AdaptationStyle::Kinesthetic
        );
    }

    #[test]
    fn diagram_cue_uses_paragraph_headline() {
        let cue = CueKind::Diagram.render("## Binary search halves the range each step.", SkillLevel::Beginner);
        assert_eq!(cue, "[DIAGRAM: Binary search halves the range each step]");
        assert!(CueKind::is_cue(&cue));
    }

    #[test]
    fn recap_uses_first_sentence() {
        let cue = CueKind::Recap.render("A stack is LIFO. It grows upward.", SkillLevel::Advanced);
        assert_eq!(cue, "[RECAP] Say the key idea out loud: A stack is LIFO.");
    }

    #[test]
    fn register_replaces_existing_transform() {
        let mut registry = StyleRegistry::builtin();
        registry.register(
            AdaptationStyle::Textual,
            SkillLevel::Beginner,
            StyleTransform::new("Hi.", CueRule::None),
        );
        assert_eq!(
            registry.get(AdaptationStyle::Textual, SkillLevel::Beginner).map(|t| t.introduction.as_str()),
            Some("Hi.")
        );
    }
}
