//! Weighted ranking of recommendation candidates.

use std::cmp::Ordering;
use std::collections::HashSet;

use super::catalog;
use super::summary::{FocusAreas, NextSteps, ProgressSummary, RecentActivity, WelcomeMessage};
use super::widget::{Widget, WidgetKind};
use crate::domain::learner::{ConfidenceLevel, UserContext};
use crate::domain::topics::{Topic, TopicInferenceEngine};

pub const DEFAULT_DASHBOARD_TOP_N: usize = 5;
pub const DEFAULT_SIDEBAR_TOP_N: usize = 3;

/// Relative weight of each scoring signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub goal: f64,
    pub weak_topic: f64,
    pub style: f64,
    pub recency: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            goal: 0.4,
            weak_topic: 0.3,
            style: 0.2,
            recency: 0.1,
        }
    }
}

/// Signals derived once per ranking from a context snapshot.
struct Signals<'a> {
    ctx: &'a UserContext,
    goal_topics: HashSet<Topic>,
    /// Topics of each recent question, newest first.
    recent_topics: Vec<Vec<Topic>>,
}

/// Derives ranked widgets from a learner context snapshot.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    topics: TopicInferenceEngine,
    weights: ScoringWeights,
    dashboard_top_n: usize,
    sidebar_top_n: usize,
}

impl RecommendationEngine {
    pub fn new(topics: TopicInferenceEngine) -> Self {
        Self {
            topics,
            weights: ScoringWeights::default(),
            dashboard_top_n: DEFAULT_DASHBOARD_TOP_N,
            sidebar_top_n: DEFAULT_SIDEBAR_TOP_N,
        }
    }

    pub fn with_limits(mut self, dashboard_top_n: usize, sidebar_top_n: usize) -> Self {
        self.dashboard_top_n = dashboard_top_n;
        self.sidebar_top_n = sidebar_top_n;
        self
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn build_dashboard_widgets(&self, ctx: &UserContext) -> Vec<Widget> {
        let mut ranked = self.rank(ctx, |_| true);
        ranked.truncate(self.dashboard_top_n);
        ranked
    }

    pub fn build_sidebar_widgets(&self, ctx: &UserContext) -> Vec<Widget> {
        let mut ranked = self.rank(ctx, |kind| kind.fits_sidebar());
        ranked.truncate(self.sidebar_top_n);
        ranked
    }

    pub fn welcome(&self, ctx: &UserContext) -> WelcomeMessage {
        WelcomeMessage::for_context(ctx)
    }

    pub fn progress(&self, ctx: &UserContext) -> ProgressSummary {
        ProgressSummary::for_context(ctx)
    }

    pub fn next_steps(&self, ctx: &UserContext) -> NextSteps {
        NextSteps::for_context(ctx, &self.topics)
    }

    pub fn focus_areas(&self, ctx: &UserContext) -> FocusAreas {
        FocusAreas::for_context(ctx, &self.topics)
    }

    pub fn recent_activity(&self, ctx: &UserContext) -> RecentActivity {
        RecentActivity::for_context(ctx)
    }

    /// Every candidate with a positive score, best first. Equal scores keep
    /// candidate-generation order.
    fn rank(&self, ctx: &UserContext, keep: impl Fn(WidgetKind) -> bool) -> Vec<Widget> {
        let signals = self.signals(ctx);
        let mut scored: Vec<Widget> = self
            .candidates(ctx)
            .into_iter()
            .filter(|w| keep(w.kind))
            .map(|mut w| {
                w.score = self.score(&w, &signals);
                w
            })
            .filter(|w| w.score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored
    }

    fn signals<'a>(&self, ctx: &'a UserContext) -> Signals<'a> {
        let goal_topics = ctx
            .preferences()
            .goals
            .iter()
            .flat_map(|goal| self.topics.infer(goal))
            .collect();
        let recent_topics = ctx
            .recent_questions()
            .iter()
            .rev()
            .map(|q| self.topics.infer(q))
            .collect();
        Signals {
            ctx,
            goal_topics,
            recent_topics,
        }
    }

    /// Candidates in a fixed order: weak topics, goals, session topics,
    /// then general widgets. Ids are unique.
    fn candidates(&self, ctx: &UserContext) -> Vec<Widget> {
        let mut out: Vec<Widget> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut push = |w: Widget| {
            if seen.insert(w.id.clone()) {
                out.push(w);
            }
        };

        for topic in ctx.preferences().weak_topics.iter() {
            push(self.flashcards(topic));
            catalog::games_for(topic).for_each(&mut push);
            push(self.tutorial(topic, ctx));
        }

        for (index, goal) in ctx.preferences().goals.iter().enumerate() {
            let topics = self.topics.infer(goal);
            push(Widget::candidate(
                format!("goal_{}", index + 1),
                WidgetKind::GoalNudge,
                format!("Work toward: {}", goal),
                "Pick up where you left off on this goal",
                topics.clone(),
            ));
            for topic in &topics {
                push(self.flashcards(topic));
            }
        }

        for topic in ctx.session_data().topics.iter() {
            push(self.tutorial(topic, ctx));
            catalog::games_for(topic).for_each(&mut push);
        }

        catalog::general().for_each(&mut push);
        out
    }

    fn flashcards(&self, topic: &Topic) -> Widget {
        let label = self.topics.label(topic);
        Widget::candidate(
            format!("flashcards_{}", topic.slug()),
            WidgetKind::Flashcards,
            format!("{} Practice Flashcards", label),
            format!("Practice {} concepts to strengthen your understanding", label),
            vec![topic.clone()],
        )
    }

    fn tutorial(&self, topic: &Topic, ctx: &UserContext) -> Widget {
        let label = self.topics.label(topic);
        Widget::candidate(
            format!("resource_{}", topic.slug()),
            WidgetKind::Resource,
            format!("{} Tutorial", label),
            format!("Comprehensive {} guide to {}", ctx.skill_level(), label),
            vec![topic.clone()],
        )
    }

    fn score(&self, widget: &Widget, signals: &Signals<'_>) -> f64 {
        let w = &self.weights;
        w.goal * goal_match(widget, signals)
            + w.weak_topic * weak_topic_match(widget, signals.ctx)
            + w.style * style_match(widget.kind, signals.ctx)
            + w.recency * recency_boost(widget, signals)
    }
}

fn goal_match(widget: &Widget, signals: &Signals<'_>) -> f64 {
    if widget.kind == WidgetKind::GoalNudge
        || widget.topics.iter().any(|t| signals.goal_topics.contains(t))
    {
        1.0
    } else {
        0.0
    }
}

/// 1 for a weak topic, 0.5 for a topic the learner rated low confidence.
fn weak_topic_match(widget: &Widget, ctx: &UserContext) -> f64 {
    let prefs = ctx.preferences();
    widget
        .topics
        .iter()
        .map(|t| {
            if prefs.weak_topics.contains(t) {
                1.0
            } else if prefs.confidence_in(t) == Some(ConfidenceLevel::Low) {
                0.5
            } else {
                0.0
            }
        })
        .fold(0.0, f64::max)
}

/// 1 when the dominant style suits the widget, 0.5 for a secondary style.
fn style_match(kind: WidgetKind, ctx: &UserContext) -> f64 {
    let suited = kind.suited_styles();
    let styles = &ctx.preferences().learning_style;
    match styles.first() {
        Some(dominant) if suited.contains(dominant) => 1.0,
        Some(_) if styles.iter().any(|s| suited.contains(s)) => 0.5,
        _ => 0.0,
    }
}

/// `1 / (1 + i)` where `i` is the position (newest = 0) of the latest
/// question touching one of the widget's topics.
fn recency_boost(widget: &Widget, signals: &Signals<'_>) -> f64 {
    signals
        .recent_topics
        .iter()
        .position(|topics| topics.iter().any(|t| widget.topics.contains(t)))
        .map(|i| 1.0 / (1.0 + i as f64))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::LearnerId;
    use crate::domain::learner::{InteractionSignal, ProfilePatch};
    use std::collections::BTreeMap;

    fn engine() -> RecommendationEngine {
        RecommendationEngine::new(TopicInferenceEngine::default())
    }

    fn context_with(patch: ProfilePatch) -> UserContext {
        let mut ctx = UserContext::new(LearnerId::new("u1").unwrap());
        ctx.apply_patch(patch.validate().unwrap());
        ctx
    }

    fn ids(widgets: &[Widget]) -> Vec<&str> {
        widgets.iter().map(|w| w.id.as_str()).collect()
    }

    #[test]
    fn fresh_learner_has_no_scored_widgets() {
        let ctx = UserContext::new(LearnerId::new("u1").unwrap());
        assert!(engine().build_dashboard_widgets(&ctx).is_empty());
    }

    #[test]
    fn goal_and_weak_topic_put_dbms_practice_first() {
        let ctx = context_with(ProfilePatch {
            goals: Some(vec!["Master SQL joins".into()]),
            weak_topics: Some(vec!["dbms".into()]),
            ..Default::default()
        });
        let widgets = engine().build_dashboard_widgets(&ctx);

        assert_eq!(widgets[0].title, "DBMS Practice Flashcards");
        assert!((widgets[0].score - 0.7).abs() < 1e-9);
        assert!(!ids(&widgets).contains(&"game_memory_match"));
        assert!(widgets.len() <= DEFAULT_DASHBOARD_TOP_N);
    }

    #[test]
    fn scores_are_non_increasing_and_positive() {
        let mut ctx = context_with(ProfilePatch {
            learning_style: Some(vec!["visual".into()]),
            goals: Some(vec!["Learn operating systems".into()]),
            weak_topics: Some(vec!["recursion".into(), "python".into()]),
            ..Default::default()
        });
        ctx.apply_interaction(
            &InteractionSignal::new("threads vs processes").unwrap(),
            &TopicInferenceEngine::default(),
        );
        let widgets = engine().with_limits(50, 50).build_dashboard_widgets(&ctx);
        assert!(widgets.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(widgets.iter().all(|w| w.score > 0.0));
        let unique: HashSet<_> = widgets.iter().map(|w| &w.id).collect();
        assert_eq!(unique.len(), widgets.len());
    }

    #[test]
    fn ties_keep_generation_order() {
        let ctx = context_with(ProfilePatch {
            weak_topics: Some(vec!["python".into(), "javascript".into()]),
            ..Default::default()
        });
        let widgets = engine().with_limits(10, 10).build_dashboard_widgets(&ctx);
        assert_eq!(
            ids(&widgets),
            vec![
                "flashcards_python",
                "resource_python",
                "flashcards_javascript",
                "resource_javascript"
            ]
        );
    }

    #[test]
    fn recency_favours_latest_question_topic() {
        let mut ctx = context_with(ProfilePatch {
            weak_topics: Some(vec!["python".into(), "javascript".into()]),
            ..Default::default()
        });
        let topics = TopicInferenceEngine::default();
        ctx.apply_interaction(&InteractionSignal::new("python decorators").unwrap(), &topics);
        ctx.apply_interaction(&InteractionSignal::new("js closures").unwrap(), &topics);

        let widgets = engine().build_dashboard_widgets(&ctx);
        assert_eq!(widgets[0].id, "flashcards_javascript");
        assert!((widgets[0].score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn low_confidence_counts_half() {
        let ctx = context_with(ProfilePatch {
            topic_confidence: Some(BTreeMap::from([("recursion".into(), "low".into())])),
            ..Default::default()
        });
        let topics = TopicInferenceEngine::default();
        let mut ctx = ctx;
        ctx.apply_interaction(&InteractionSignal::new("recursion").unwrap(), &topics);

        let widgets = engine().build_dashboard_widgets(&ctx);
        let tutorial = widgets.iter().find(|w| w.id == "resource_recursion").unwrap();
        assert!((tutorial.score - (0.3 * 0.5 + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn style_lifts_general_widgets() {
        let ctx = context_with(ProfilePatch {
            learning_style: Some(vec!["kinesthetic".into(), "reading".into()]),
            ..Default::default()
        });
        let widgets = engine().build_dashboard_widgets(&ctx);
        assert_eq!(ids(&widgets), vec!["game_memory_match", "resource_cs_fundamentals"]);
        assert!((widgets[0].score - 0.2).abs() < 1e-9);
        assert!((widgets[1].score - 0.1).abs() < 1e-9);
    }

    #[test]
    fn sidebar_only_shows_flashcards_and_games() {
        let ctx = context_with(ProfilePatch {
            goals: Some(vec!["Master SQL joins".into()]),
            weak_topics: Some(vec!["dbms".into(), "recursion".into()]),
            ..Default::default()
        });
        let widgets = engine().build_sidebar_widgets(&ctx);
        assert!(widgets.len() <= DEFAULT_SIDEBAR_TOP_N);
        assert!(widgets.iter().all(|w| w.kind.fits_sidebar()));
        assert_eq!(widgets[0].id, "flashcards_dbms");
    }
}
