//! Keyword lexicon mapping phrases to topic tags.

use super::Topic;

/// Built-in computer science vocabulary: (topic, display label, phrases).
const BUILTIN: &[(&str, &str, &[&str])] = &[
    ("python", "Python", &["python", "py"]),
    ("javascript", "JavaScript", &["javascript", "js"]),
    (
        "algorithms",
        "Algorithms",
        &["algorithm", "sorting", "searching", "big o"],
    ),
    (
        "data structures",
        "Data Structures",
        &[
            "data structure",
            "array",
            "linked list",
            "list",
            "tree",
            "graph",
            "stack",
            "queue",
            "hash table",
        ],
    ),
    (
        "database",
        "Databases",
        &["database", "sql", "mysql", "postgresql"],
    ),
    (
        "dbms",
        "DBMS",
        &["dbms", "normalization", "sql", "relational model"],
    ),
    (
        "machine learning",
        "Machine Learning",
        &["machine learning", "ml", "neural network"],
    ),
    (
        "operating systems",
        "Operating Systems",
        &["os", "operating system", "process", "thread", "scheduling"],
    ),
    ("recursion", "Recursion", &["recursion", "recursive"]),
    ("networking", "Networking", &["network", "tcp", "http", "api"]),
];

/// One topic with its display label and the phrases that indicate it.
#[derive(Debug, Clone)]
pub struct LexiconEntry {
    topic: Topic,
    label: String,
    phrases: Vec<Vec<String>>,
}

impl LexiconEntry {
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Earliest token position at which any phrase of this entry matches.
    pub(crate) fn first_match(&self, tokens: &[String]) -> Option<usize> {
        self.phrases
            .iter()
            .filter_map(|phrase| find_phrase(tokens, phrase))
            .min()
    }
}

/// Ordered, extensible set of topic entries.
///
/// Entry order is the tie-break when two topics are first mentioned at the
/// same position.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
}

impl Lexicon {
    /// Empty lexicon.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lexicon preloaded with the built-in vocabulary.
    pub fn builtin() -> Self {
        let mut lexicon = Self::empty();
        for (name, label, phrases) in BUILTIN {
            if let Ok(topic) = Topic::new(name) {
                lexicon.add(topic, *label, phrases.iter().copied());
            }
        }
        lexicon
    }

    /// Adds phrases for a topic. Phrases for a topic already present are
    /// appended to its entry. Blank phrases are ignored.
    pub fn add<'a>(
        &mut self,
        topic: Topic,
        label: impl Into<String>,
        phrases: impl IntoIterator<Item = &'a str>,
    ) -> &mut Self {
        let tokenized: Vec<Vec<String>> = phrases
            .into_iter()
            .map(tokenize)
            .filter(|tokens| !tokens.is_empty())
            .collect();

        match self.entries.iter_mut().find(|e| e.topic == topic) {
            Some(entry) => entry.phrases.extend(tokenized),
            None => self.entries.push(LexiconEntry {
                topic,
                label: label.into(),
                phrases: tokenized,
            }),
        }
        self
    }

    /// Builder-style variant of [`Lexicon::add`].
    pub fn with<'a>(
        mut self,
        topic: Topic,
        label: impl Into<String>,
        phrases: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.add(topic, label, phrases);
        self
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display label for a topic, falling back to title case for topics the
    /// lexicon does not know.
    pub fn label_for(&self, topic: &Topic) -> String {
        self.entries
            .iter()
            .find(|e| &e.topic == topic)
            .map(|e| e.label.clone())
            .unwrap_or_else(|| topic.title())
    }
}

/// Lowercase alphanumeric words, in order.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

fn find_phrase(tokens: &[String], phrase: &[String]) -> Option<usize> {
    if phrase.is_empty() || tokens.len() < phrase.len() {
        return None;
    }
    (0..=tokens.len() - phrase.len()).find(|&start| {
        phrase
            .iter()
            .zip(&tokens[start..])
            .all(|(keyword, token)| token_matches(token, keyword))
    })
}

/// Exact word match, tolerating a plain `s`/`es` plural.
fn token_matches(token: &str, keyword: &str) -> bool {
    if token == keyword {
        return true;
    }
    match token.strip_prefix(keyword) {
        Some(rest) => rest == "s" || rest == "es",
        None => false,
    }
}
