//! Explicit profile edits and their validation.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::context::{
    Goals, LearningStyles, WeakTopics, MAX_GOALS, MAX_LEARNING_STYLES, MAX_TOPIC_CONFIDENCE,
    MAX_WEAK_TOPICS,
};
use super::preferences::{ConfidenceLevel, LearningStyle, SkillLevel};
use crate::domain::foundation::ValidationError;
use crate::domain::topics::Topic;

/// Partial profile edit as received from a caller. Absent fields are left
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub learning_style: Option<Vec<String>>,
    #[serde(default)]
    pub skill_level: Option<String>,
    #[serde(default)]
    pub goals: Option<Vec<String>>,
    #[serde(default)]
    pub weak_topics: Option<Vec<String>>,
    #[serde(default)]
    pub topic_confidence: Option<BTreeMap<String, String>>,
}

/// A profile edit whose every field has been checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedPatch {
    pub learning_style: Option<LearningStyles>,
    pub skill_level: Option<SkillLevel>,
    pub goals: Option<Goals>,
    pub weak_topics: Option<WeakTopics>,
    pub topic_confidence: Option<BTreeMap<Topic, ConfidenceLevel>>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.learning_style.is_none()
            && self.skill_level.is_none()
            && self.goals.is_none()
            && self.weak_topics.is_none()
            && self.topic_confidence.is_none()
    }

    /// Validates every field. The first invalid field fails the whole patch,
    /// so nothing is applied.
    pub fn validate(self) -> Result<ValidatedPatch, ValidationError> {
        let learning_style = self
            .learning_style
            .map(|raw| {
                let styles = raw
                    .iter()
                    .map(|s| s.parse::<LearningStyle>())
                    .collect::<Result<Vec<_>, _>>()?;
                distinct_within("learning_style", styles, MAX_LEARNING_STYLES)
            })
            .transpose()?
            .map(LearningStyles::from);

        let skill_level = self
            .skill_level
            .map(|s| s.parse::<SkillLevel>())
            .transpose()?;

        let goals = self
            .goals
            .map(|raw| {
                let goals = raw
                    .into_iter()
                    .map(|g| {
                        let trimmed = g.trim().to_string();
                        if trimmed.is_empty() {
                            Err(ValidationError::empty_field("goals"))
                        } else {
                            Ok(trimmed)
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                distinct_within("goals", goals, MAX_GOALS)
            })
            .transpose()?
            .map(Goals::from);

        let weak_topics = self
            .weak_topics
            .map(|raw| {
                let topics = raw
                    .iter()
                    .map(|t| Topic::new(t).map_err(|_| ValidationError::empty_field("weak_topics")))
                    .collect::<Result<Vec<_>, _>>()?;
                distinct_within("weak_topics", topics, MAX_WEAK_TOPICS)
            })
            .transpose()?
            .map(WeakTopics::from);

        let topic_confidence = self
            .topic_confidence
            .map(|raw| {
                if raw.len() > MAX_TOPIC_CONFIDENCE {
                    return Err(ValidationError::too_many(
                        "topic_confidence",
                        MAX_TOPIC_CONFIDENCE,
                        raw.len(),
                    ));
                }
                raw.iter()
                    .map(|(topic, level)| -> Result<_, ValidationError> {
                        let topic = Topic::new(topic)
                            .map_err(|_| ValidationError::empty_field("topic_confidence"))?;
                        let level = level.parse::<ConfidenceLevel>()?;
                        Ok((topic, level))
                    })
                    .collect::<Result<BTreeMap<_, _>, ValidationError>>()
            })
            .transpose()?;

        Ok(ValidatedPatch {
            learning_style,
            skill_level,
            goals,
            weak_topics,
            topic_confidence,
        })
    }
}

/// Deduplicates preserving order and rejects lists longer than `max`.
fn distinct_within<T: PartialEq>(
    field: &str,
    items: Vec<T>,
    max: usize,
) -> Result<Vec<T>, ValidationError> {
    let mut distinct: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !distinct.contains(&item) {
            distinct.push(item);
        }
    }
    if distinct.len() > max {
        return Err(ValidationError::too_many(field, max, distinct.len()));
    }
    Ok(distinct)
}
