//! Article data structures for the news feed engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Fixed set of article categories.
///
/// Unknown category strings degrade to [`Category::General`] rather than
/// failing deserialization; a feed with a defaulted category beats no feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Category {
    #[default]
    General,
    World,
    Politics,
    Business,
    Technology,
    Science,
    Health,
    Sports,
    Entertainment,
}

impl Category {
    /// All enumerated categories, in display order.
    pub const ALL: [Category; 9] = [
        Category::General,
        Category::World,
        Category::Politics,
        Category::Business,
        Category::Technology,
        Category::Science,
        Category::Health,
        Category::Sports,
        Category::Entertainment,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::World => "world",
            Category::Politics => "politics",
            Category::Business => "business",
            Category::Technology => "technology",
            Category::Science => "science",
            Category::Health => "health",
            Category::Sports => "sports",
            Category::Entertainment => "entertainment",
        }
    }

    /// Parse a category name, falling back to `General` for anything
    /// outside the enumeration.
    pub fn parse_or_general(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "world" => Category::World,
            "politics" => Category::Politics,
            "business" => Category::Business,
            "technology" | "tech" => Category::Technology,
            "science" => Category::Science,
            "health" => Category::Health,
            "sports" => Category::Sports,
            "entertainment" => Category::Entertainment,
            _ => Category::General,
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Category::parse_or_general(&s)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment label attached by the analysis step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// Sentiment classification with a numeric score in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    /// Score in [-1, 1]; clamped on construction.
    pub score: f64,
}

impl Sentiment {
    pub fn new(label: SentimentLabel, score: f64) -> Self {
        Self {
            label,
            score: score.clamp(-1.0, 1.0),
        }
    }
}

/// Source of a news article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    /// Name of the news source (e.g., "Reuters", "Bloomberg")
    pub name: String,
    /// Stable source identifier, if the provider supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// URL of the source's website
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ArticleSource {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            url: None,
        }
    }
}

/// A news article as the ranking core sees it.
///
/// Identity is the canonical URL; `id` is derived from it and is what
/// dedup/seen-tracking key on. Relevance is kept in 0-100 at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Unique identifier (hash of URL)
    #[serde(default)]
    pub id: String,
    /// Canonical article URL
    pub url: String,
    /// Article title
    pub title: String,
    /// Brief summary/excerpt
    #[serde(default)]
    pub description: String,
    /// Full article content, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Publication date; missing or unparseable dates stay `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Source information
    pub source: ArticleSource,
    /// Category; absent means the article was never categorized. Scoring
    /// falls back to "general", grouping buckets under "uncategorized".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Free-form topic tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Sentiment from the analysis step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    /// Relevance score (0-100), heuristic or analysis-supplied
    #[serde(default = "default_relevance")]
    pub relevance_score: f64,
    /// Whether this article is flagged as breaking news
    #[serde(default)]
    pub is_breaking_news: bool,
    /// Engagement counters maintained by the storage collaborator
    #[serde(default)]
    pub read_count: u64,
    #[serde(default)]
    pub save_count: u64,
    #[serde(default)]
    pub share_count: u64,
    /// When the external analysis last ran on this article
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
}

fn default_relevance() -> f64 {
    50.0
}

impl Article {
    /// Create an article from the minimum a provider hands us.
    pub fn new(url: impl Into<String>, title: impl Into<String>, source: ArticleSource) -> Self {
        let url = url.into();
        Self {
            id: article_id(&url),
            url,
            title: title.into(),
            description: String::new(),
            content: None,
            published_at: None,
            source,
            category: None,
            tags: Vec::new(),
            sentiment: None,
            relevance_score: default_relevance(),
            is_breaking_news: false,
            read_count: 0,
            save_count: 0,
            share_count: 0,
            analyzed_at: None,
        }
    }

    /// Set the relevance score, clamping into 0-100.
    pub fn set_relevance(&mut self, score: f64) {
        self.relevance_score = score.clamp(0.0, 100.0);
    }

    /// Concatenated searchable text: title + description + content.
    pub fn full_text(&self) -> String {
        let mut text = format!("{} {}", self.title, self.description);
        if let Some(content) = &self.content {
            text.push(' ');
            text.push_str(content);
        }
        text
    }

    /// Age in whole hours, if the publish date is known.
    pub fn age_hours(&self, now: DateTime<Utc>) -> Option<f64> {
        self.published_at
            .map(|published| (now - published).num_minutes() as f64 / 60.0)
    }

    /// Category used for scoring; "general" when none was assigned.
    pub fn category_or_general(&self) -> Category {
        self.category.unwrap_or_default()
    }

    /// Ensure `id` matches the canonical URL; used after deserializing
    /// records that carry no id.
    pub fn ensure_id(&mut self) {
        if self.id.is_empty() && !self.url.is_empty() {
            self.id = article_id(&self.url);
        }
    }
}

/// Derive a stable article id from its canonical URL.
pub fn article_id(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(&hasher.finalize()[..8])
}

/// A page of ranked articles returned to the display layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    /// Ranked articles for this page
    pub items: Vec<Article>,
    /// Total number of results available before pagination
    pub total_count: usize,
    /// Offset cursor for the next page, if more results exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<usize>,
}
