//! Fixed catalog of games and general-purpose resources.

use super::widget::{Widget, WidgetKind};
use crate::domain::topics::Topic;

struct CatalogItem {
    id: &'static str,
    kind: WidgetKind,
    title: &'static str,
    description: &'static str,
    topics: &'static [&'static str],
}

const TOPIC_GAMES: &[CatalogItem] = &[
    CatalogItem {
        id: "game_os_visualization",
        kind: WidgetKind::Game,
        title: "OS Visualization Game",
        description: "Interactive visualization of operating system concepts",
        topics: &["operating systems", "os"],
    },
    CatalogItem {
        id: "game_recursion_puzzle",
        kind: WidgetKind::Game,
        title: "Recursion Puzzle",
        description: "Solve recursive problems visually",
        topics: &["recursion", "algorithms"],
    },
    CatalogItem {
        id: "game_dbms_challenge",
        kind: WidgetKind::Game,
        title: "Database Query Challenge",
        description: "Practice SQL queries in a game environment",
        topics: &["dbms", "sql", "database"],
    },
];

const GENERAL: &[CatalogItem] = &[
    CatalogItem {
        id: "game_memory_match",
        kind: WidgetKind::Game,
        title: "CS Concept Memory Match",
        description: "Match related computer science concepts",
        topics: &[],
    },
    CatalogItem {
        id: "resource_cs_fundamentals",
        kind: WidgetKind::Resource,
        title: "Computer Science Fundamentals",
        description: "Core CS concepts explained clearly",
        topics: &[],
    },
];

impl CatalogItem {
    fn topics(&self) -> Vec<Topic> {
        self.topics.iter().filter_map(|t| Topic::new(t).ok()).collect()
    }

    fn to_widget(&self) -> Widget {
        Widget::candidate(self.id, self.kind, self.title, self.description, self.topics())
    }
}

/// Games covering `topic`, in catalog order.
pub(crate) fn games_for(topic: &Topic) -> impl Iterator<Item = Widget> + '_ {
    TOPIC_GAMES
        .iter()
        .filter(move |item| item.topics.contains(&topic.as_str()))
        .map(CatalogItem::to_widget)
}

/// Widgets that apply to every learner.
pub(crate) fn general() -> impl Iterator<Item = Widget> {
    GENERAL.iter().map(CatalogItem::to_widget)
}
