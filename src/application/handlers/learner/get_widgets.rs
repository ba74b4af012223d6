//! GetDashboardWidgets / GetSidebarWidgets - Ranked recommendations for a
//! learner.

use std::sync::Arc;

use super::manager::UserContextManager;
use crate::domain::foundation::{DomainError, LearnerId};
use crate::domain::recommendation::{
    FocusAreas, NextSteps, ProgressSummary, RecentActivity, RecommendationEngine,
    WelcomeMessage, Widget,
};

/// Query for either widget surface.
#[derive(Debug, Clone)]
pub struct GetWidgetsQuery {
    pub learner_id: LearnerId,
}

/// Dashboard content: ranked widgets plus the summary cards.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub widgets: Vec<Widget>,
    pub welcome: WelcomeMessage,
    pub progress: ProgressSummary,
    pub next_steps: NextSteps,
    pub stale: bool,
}

/// Sidebar content: practice widgets plus focus areas and recent activity.
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarView {
    pub widgets: Vec<Widget>,
    pub focus_areas: FocusAreas,
    pub recent_activity: RecentActivity,
    pub stale: bool,
}

/// Handler for the dashboard.
pub struct GetDashboardWidgetsHandler {
    manager: Arc<UserContextManager>,
    engine: Arc<RecommendationEngine>,
}

impl GetDashboardWidgetsHandler {
    pub fn new(manager: Arc<UserContextManager>, engine: Arc<RecommendationEngine>) -> Self {
        Self { manager, engine }
    }

    pub async fn handle(&self, query: GetWidgetsQuery) -> Result<DashboardView, DomainError> {
        let snapshot = self.manager.get_or_create(&query.learner_id).await?;
        let ctx = &snapshot.context;
        Ok(DashboardView {
            widgets: self.engine.build_dashboard_widgets(ctx),
            welcome: self.engine.welcome(ctx),
            progress: self.engine.progress(ctx),
            next_steps: self.engine.next_steps(ctx),
            stale: snapshot.stale,
        })
    }
}

/// Handler for the sidebar.
pub struct GetSidebarWidgetsHandler {
    manager: Arc<UserContextManager>,
    engine: Arc<RecommendationEngine>,
}

impl GetSidebarWidgetsHandler {
    pub fn new(manager: Arc<UserContextManager>, engine: Arc<RecommendationEngine>) -> Self {
        Self { manager, engine }
    }

    pub async fn handle(&self, query: GetWidgetsQuery) -> Result<SidebarView, DomainError> {
        let snapshot = self.manager.get_or_create(&query.learner_id).await?;
        let ctx = &snapshot.context;
        Ok(SidebarView {
            widgets: self.engine.build_sidebar_widgets(ctx),
            focus_areas: self.engine.focus_areas(ctx),
            recent_activity: self.engine.recent_activity(ctx),
            stale: snapshot.stale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::learner::test_support::{learner, manager, recommendations};
    use crate::domain::learner::{InteractionSignal, ProfilePatch};

    #[tokio::test]
    async fn fresh_learner_gets_welcome_but_no_widgets() {
        let handler = GetDashboardWidgetsHandler::new(manager(), recommendations());
        let view = handler
            .handle(GetWidgetsQuery {
                learner_id: learner("u1"),
            })
            .await
            .unwrap();

        assert!(view.widgets.is_empty());
        assert_eq!(view.progress.interactions, 0);
        assert!(!view.welcome.message.is_empty());
        assert!(!view.stale);
    }

    #[tokio::test]
    async fn dbms_practice_leads_dashboard_for_sql_goal() {
        let manager = manager();
        let patch = ProfilePatch {
            goals: Some(vec!["Master SQL joins".to_string()]),
            weak_topics: Some(vec!["dbms".to_string()]),
            ..Default::default()
        };
        manager.save(&learner("u1"), patch).await.unwrap();

        let handler = GetDashboardWidgetsHandler::new(manager, recommendations());
        let view = handler
            .handle(GetWidgetsQuery {
                learner_id: learner("u1"),
            })
            .await
            .unwrap();

        assert_eq!(view.widgets[0].title, "DBMS Practice Flashcards");
        assert!(view.widgets.len() <= 5);
        assert_eq!(
            view.next_steps.steps[0].text,
            "Complete the DBMS practice exercises"
        );
        assert_eq!(view.next_steps.steps.len(), 3);
    }

    #[tokio::test]
    async fn sidebar_holds_only_practice_widgets() {
        let manager = manager();
        let patch = ProfilePatch {
            weak_topics: Some(vec!["recursion".to_string(), "dbms".to_string()]),
            ..Default::default()
        };
        manager.save(&learner("u1"), patch).await.unwrap();

        let handler = GetSidebarWidgetsHandler::new(manager, recommendations());
        let view = handler
            .handle(GetWidgetsQuery {
                learner_id: learner("u1"),
            })
            .await
            .unwrap();

        assert!(!view.widgets.is_empty());
        assert!(view.widgets.len() <= 3);
        assert!(view.widgets.iter().all(|w| w.kind.fits_sidebar()));
        let names: Vec<&str> = view
            .focus_areas
            .topics
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["Recursion", "DBMS"]);
        assert!(view.recent_activity.items.is_empty());
    }

    #[tokio::test]
    async fn sidebar_recent_activity_follows_tracked_questions() {
        let manager = manager();
        manager
            .update(
                &learner("u1"),
                &InteractionSignal::new("how does tcp work").unwrap(),
            )
            .await
            .unwrap();

        let handler = GetSidebarWidgetsHandler::new(manager, recommendations());
        let view = handler
            .handle(GetWidgetsQuery {
                learner_id: learner("u1"),
            })
            .await
            .unwrap();

        assert_eq!(view.recent_activity.items.len(), 1);
        assert_eq!(view.recent_activity.items[0].text, "how does tcp work");
        assert_eq!(view.recent_activity.message, None);
        assert!(view.focus_areas.message.is_some());
    }
}
