//! Reshapes generated answers for a learner's style and skill level.

use serde::Serialize;

use super::style::{AdaptationStyle, CueKind, CueRule, StyleRegistry, StyleTransform};
use crate::domain::learner::{SkillLevel, UserContext};

const SENTINEL_OPEN: &str = "<!-- adapted: ";
const SENTINEL_CLOSE: &str = " -->";

/// Result of adapting one answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdaptedResponse {
    pub styled_text: String,
    pub inserted_cues: Vec<String>,
    pub style: AdaptationStyle,
    pub skill_level: SkillLevel,
}

/// Applies the registered transform for the learner's dominant style and
/// skill level. Paragraphs of the answer are never edited; cues and the
/// introduction are added as separate paragraphs.
///
/// Output starts with a sentinel line naming the transform. Adapting an
/// already adapted answer for the same transform returns it unchanged; for a
/// different transform the previous adaptation is removed first.
#[derive(Debug, Clone, Default)]
pub struct ResponseAdapter {
    registry: StyleRegistry,
}

impl ResponseAdapter {
    pub fn new(registry: StyleRegistry) -> Self {
        Self { registry }
    }

    pub fn adapt(&self, raw_text: &str, ctx: &UserContext) -> AdaptedResponse {
        let style = AdaptationStyle::from(ctx.preferences().dominant_style());
        let skill = ctx.skill_level();
        self.adapt_with(raw_text, style, skill)
    }

    pub fn adapt_with(
        &self,
        raw_text: &str,
        style: AdaptationStyle,
        skill: SkillLevel,
    ) -> AdaptedResponse {
        let sentinel = sentinel_for(style, skill);

        let body = match split_sentinel(raw_text) {
            Some((existing, rest)) if existing == sentinel => {
                return AdaptedResponse {
                    styled_text: raw_text.to_string(),
                    inserted_cues: paragraphs(rest)
                        .into_iter()
                        .filter(|p| CueKind::is_cue(p))
                        .map(str::to_string)
                        .collect(),
                    style,
                    skill_level: skill,
                };
            }
            Some((_, rest)) => self.strip_adaptation(rest),
            None => paragraphs(raw_text).into_iter().map(str::to_string).collect(),
        };

        if body.is_empty() {
            return AdaptedResponse {
                styled_text: String::new(),
                inserted_cues: Vec::new(),
                style,
                skill_level: skill,
            };
        }

        let fallback;
        let transform = match self.registry.get(style, skill) {
            Some(t) => t,
            None => {
                fallback = StyleTransform::new("", CueRule::None);
                &fallback
            }
        };

        let (blocks, inserted_cues) = insert_cues(&body, transform.cues, skill);

        let mut out = Vec::with_capacity(blocks.len() + 1);
        if !transform.introduction.is_empty() {
            out.push(transform.introduction.clone());
        }
        out.extend(blocks);

        AdaptedResponse {
            styled_text: format!("{}\n{}", sentinel, out.join("\n\n")),
            inserted_cues,
            style,
            skill_level: skill,
        }
    }

    /// Recovers the answer paragraphs from adapted output (sentinel already
    /// removed): drops the introduction and every cue paragraph.
    fn strip_adaptation(&self, rest: &str) -> Vec<String> {
        let mut blocks = paragraphs(rest);
        let starts_with_intro = blocks
            .first()
            .is_some_and(|first| self.registry.introductions().any(|intro| intro == *first));
        if starts_with_intro {
            blocks.remove(0);
        }
        blocks
            .into_iter()
            .filter(|p| !CueKind::is_cue(p))
            .map(str::to_string)
            .collect()
    }
}

fn sentinel_for(style: AdaptationStyle, skill: SkillLevel) -> String {
    format!("{}{}/{}{}", SENTINEL_OPEN, style, skill, SENTINEL_CLOSE)
}

/// Splits a leading sentinel line from the rest of the text.
fn split_sentinel(text: &str) -> Option<(&str, &str)> {
    let (first, rest) = match text.split_once('\n') {
        Some((first, rest)) => (first, rest),
        None => (text, ""),
    };
    let first = first.trim_end_matches('\r');
    if first.starts_with(SENTINEL_OPEN) && first.ends_with(SENTINEL_CLOSE) {
        Some((first, rest))
    } else {
        None
    }
}

fn insert_cues(body: &[String], rule: CueRule, skill: SkillLevel) -> (Vec<String>, Vec<String>) {
    let mut blocks = Vec::with_capacity(body.len() * 2);
    let mut cues = Vec::new();

    match rule {
        CueRule::None => blocks.extend(body.iter().cloned()),
        CueRule::AfterParagraphs { kind, max } => {
            for (i, paragraph) in body.iter().enumerate() {
                blocks.push(paragraph.clone());
                if i < max && !is_code_block(paragraph) {
                    let cue = kind.render(paragraph, skill);
                    blocks.push(cue.clone());
                    cues.push(cue);
                }
            }
        }
        CueRule::Closing(kind) => {
            blocks.extend(body.iter().cloned());
            let source = body.iter().find(|p| !is_code_block(p)).unwrap_or(&body[0]);
            let cue = kind.render(source, skill);
            blocks.push(cue.clone());
            cues.push(cue);
        }
    }

    (blocks, cues)
}

fn is_code_block(paragraph: &str) -> bool {
    paragraph.trim_start().starts_with("```")
}

/// Splits text into paragraphs on blank lines. Fenced code blocks stay in
/// one paragraph even when they contain blank lines.
fn paragraphs(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut in_fence = false;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let content = line.trim_end_matches(['\n', '\r']);

        if content.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }

        if content.trim().is_empty() && !in_fence {
            if let Some(s) = start.take() {
                out.push(&text[s..end]);
            }
            continue;
        }

        if start.is_none() {
            start = Some(line_start);
        }
        end = line_start + content.len();
    }
    if let Some(s) = start {
        out.push(&text[s..end]);
    }
    out
}
