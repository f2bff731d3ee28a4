//! Injected configuration for the scoring pipeline.
//!
//! Keyword dictionaries and source ratings live here as data so the scorer
//! stays a pure function of (article, context, config) and tests can swap
//! tables freely.

use std::collections::HashMap;

use feed_core::Category;

/// Weights for the composite score. Must sum to 1.0 for the composite to
/// stay within [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub recency: f64,
    pub relevance: f64,
    pub source_quality: f64,
    pub popularity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            recency: 0.3,
            relevance: 0.4,
            source_quality: 0.2,
            popularity: 0.1,
        }
    }
}

/// Configuration for the scorer and breaking-news detector.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub weights: ScoreWeights,
    /// Per-category keyword dictionaries for relevance matching
    pub category_keywords: HashMap<Category, Vec<String>>,
    /// Known domain -> quality rating (1-10)
    pub source_ratings: HashMap<String, u8>,
    /// Title keywords that mark urgency
    pub urgency_keywords: Vec<String>,
    /// Recency score above which a keyword match flags breaking news
    pub breaking_recency_threshold: f64,
    /// Weighted composite above which an article is breaking outright
    pub breaking_score_threshold: f64,
    /// Additive-scale equivalent of the score threshold
    pub breaking_base_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            category_keywords: default_category_keywords(),
            source_ratings: default_source_ratings(),
            urgency_keywords: ["breaking", "urgent", "just in", "alert", "update"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            breaking_recency_threshold: 0.85,
            breaking_score_threshold: 0.9,
            breaking_base_threshold: 90.0,
        }
    }
}

impl ScoringConfig {
    /// Keywords for one category; empty slice when the table has none.
    pub fn keywords_for(&self, category: Category) -> &[String] {
        self.category_keywords
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Curated keyword dictionary per category, used for relevance matching
/// against title + description + content.
fn default_category_keywords() -> HashMap<Category, Vec<String>> {
    HashMap::from([
        (
            Category::World,
            keywords(&[
                "united nations", "diplomacy", "treaty", "border", "embassy", "sanctions",
                "summit", "foreign minister", "refugee", "ceasefire",
            ]),
        ),
        (
            Category::Politics,
            keywords(&[
                "election", "senate", "congress", "parliament", "president", "campaign",
                "legislation", "vote", "governor", "policy",
            ]),
        ),
        (
            Category::Business,
            keywords(&[
                "earnings", "stocks", "market", "merger", "inflation", "startup", "revenue",
                "investor", "ipo", "federal reserve",
            ]),
        ),
        (
            Category::Technology,
            keywords(&[
                "software", "artificial intelligence", "startup", "chip", "smartphone",
                "cybersecurity", "cloud", "robotics", "silicon valley", "app",
            ]),
        ),
        (
            Category::Science,
            keywords(&[
                "research", "study", "nasa", "climate", "physics", "spacecraft", "genome",
                "telescope", "laboratory", "discovery",
            ]),
        ),
        (
            Category::Health,
            keywords(&[
                "vaccine", "hospital", "fda", "outbreak", "clinical trial", "mental health",
                "virus", "treatment", "nutrition", "pandemic",
            ]),
        ),
        (
            Category::Sports,
            keywords(&[
                "championship", "playoffs", "tournament", "league", "coach", "transfer",
                "olympics", "world cup", "season", "finals",
            ]),
        ),
        (
            Category::Entertainment,
            keywords(&[
                "box office", "album", "premiere", "festival", "celebrity", "streaming",
                "oscar", "grammy", "concert", "trailer",
            ]),
        ),
    ])
}

/// Domain -> quality rating (1-10) for well-known outlets.
fn default_source_ratings() -> HashMap<String, u8> {
    [
        ("reuters.com", 9),
        ("apnews.com", 9),
        ("bbc.com", 9),
        ("bbc.co.uk", 9),
        ("nytimes.com", 8),
        ("washingtonpost.com", 8),
        ("theguardian.com", 8),
        ("wsj.com", 8),
        ("bloomberg.com", 8),
        ("npr.org", 8),
        ("cnbc.com", 7),
        ("cnn.com", 7),
        ("politico.com", 7),
        ("axios.com", 7),
        ("thehill.com", 6),
        ("cbsnews.com", 7),
        ("abcnews.go.com", 7),
        ("technologyreview.com", 8),
        ("nature.com", 9),
        ("espn.com", 7),
        ("variety.com", 6),
        ("buzzfeed.com", 3),
        ("dailymail.co.uk", 3),
    ]
    .into_iter()
    .map(|(domain, rating)| (domain.to_string(), rating))
    .collect()
}

/// Tunables for the personalization passes.
#[derive(Debug, Clone)]
pub struct PersonalizerConfig {
    /// Bonus for articles in a top historically-read category
    pub category_boost: f64,
    /// Bonus for articles from a top historically-read source
    pub source_boost: f64,
    /// How many top categories/sources from history earn boosts
    pub history_top_n: usize,
    /// Share of the list above which a category/source is dominant
    pub dominance_share: f64,
    /// Dominant-category occurrences allowed before penalties start
    pub category_allowance: usize,
    pub category_penalty: f64,
    /// Dominant-source occurrences allowed before penalties start
    pub source_allowance: usize,
    pub source_penalty: f64,
    /// Lists shorter than this skip diversification
    pub min_diversify_len: usize,
    /// A breaking article is guaranteed within the first N positions
    pub breaking_window: usize,
    /// Where the reinserted breaking article lands (zero-indexed)
    pub breaking_slot: usize,
}

impl Default for PersonalizerConfig {
    fn default() -> Self {
        Self {
            category_boost: 10.0,
            source_boost: 5.0,
            history_top_n: 5,
            dominance_share: 0.3,
            category_allowance: 3,
            category_penalty: 5.0,
            source_allowance: 2,
            source_penalty: 3.0,
            min_diversify_len: 5,
            breaking_window: 3,
            breaking_slot: 2,
        }
    }
}
