//! Article scoring.
//!
//! Two ranking strategies share one entry point. The weighted composite is
//! used on raw fetched articles; the bonus-additive scheme applies when an
//! external analysis already supplied a 0-100 relevance score. The caller
//! decides which applies - the scorer never re-guesses.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use feed_core::{Article, Category, UserProfile};
use serde::Serialize;
use url::Url;

use crate::config::ScoringConfig;

/// Which scoring scheme to apply to a batch of articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingStrategy {
    /// Composite of recency/relevance/source-quality/popularity, in [0, 1]
    Weighted,
    /// Analysis relevance (0-100) plus recency/interest/breaking bonuses
    Additive,
}

/// Named sub-scores kept alongside the composite for explainability.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreBreakdown {
    pub recency: f64,
    pub relevance: f64,
    pub source_quality: f64,
    pub popularity: f64,
}

/// An article annotated with its transient ranking score.
///
/// Exists only within a ranking pass; recomputed every request.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredArticle {
    pub article: Article,
    pub score: f64,
    pub strategy: RankingStrategy,
    /// Present for the weighted strategy only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}

/// Per-request user context the scorer reads from.
#[derive(Debug, Clone, Default)]
pub struct ScoreContext {
    pub preferred_categories: Vec<Category>,
    /// Explicit interest keywords, for the additive bonus
    pub interests: Vec<String>,
    /// Externally supplied popularity proxy per article id, in [0, 1]
    pub popularity: HashMap<String, f64>,
}

impl ScoreContext {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            preferred_categories: profile.preferences.categories.clone(),
            interests: profile.interests.clone(),
            popularity: HashMap::new(),
        }
    }
}

/// Recency decay over article age in hours.
///
/// Piecewise linear, anchored at the 2h/12h/24h/48h/72h breakpoints with a
/// 0.1 floor. Canonical for both strategies; fetch-time and display-time
/// ranking must never drift apart on recency.
pub fn recency_score(age_hours: Option<f64>) -> f64 {
    let Some(age) = age_hours else {
        return 0.5;
    };
    let age = age.max(0.0);
    let score = if age < 2.0 {
        1.0
    } else if age < 12.0 {
        0.9 - age / 120.0
    } else if age < 24.0 {
        0.8 - age / 240.0
    } else if age < 48.0 {
        0.7 - age / 480.0
    } else if age < 72.0 {
        0.5 - age / 720.0
    } else {
        (0.4 - age / 1000.0).max(0.1)
    };
    score.clamp(0.0, 1.0)
}

/// Relevance of an article to the user's preferred categories.
pub fn relevance_score(article: &Article, ctx: &ScoreContext, config: &ScoringConfig) -> f64 {
    if ctx.preferred_categories.is_empty() {
        return 0.5;
    }
    let category = article.category_or_general();
    if ctx.preferred_categories.contains(&category) {
        return 0.9;
    }

    let text = article.full_text().to_lowercase();
    if text.trim().is_empty() {
        return 0.3;
    }

    let mut score: f64 = 0.3;
    for preferred in &ctx.preferred_categories {
        for keyword in config.keywords_for(*preferred) {
            if text.contains(&keyword.to_lowercase()) {
                score += 0.1;
            }
        }
    }
    score.min(1.0)
}

/// Source quality from the domain rating table; unknown domains sit at 0.5.
pub fn source_quality_score(article: &Article, config: &ScoringConfig) -> f64 {
    let domain = source_domain(article);
    let Some(domain) = domain else {
        return 0.5;
    };
    match config.source_ratings.get(&domain) {
        Some(rating) => f64::from(*rating) / 10.0,
        None => 0.5,
    }
}

/// Externally supplied popularity proxy, defaulting to 0.5.
pub fn popularity_score(article: &Article, ctx: &ScoreContext) -> f64 {
    ctx.popularity
        .get(&article.id)
        .map(|p| p.clamp(0.0, 1.0))
        .unwrap_or(0.5)
}

/// Extract the rating-table key for an article's source: the host of the
/// source homepage, else the host of the article URL, else the source name
/// itself when it already looks like a domain.
fn source_domain(article: &Article) -> Option<String> {
    let from_url = |raw: &str| {
        Url::parse(raw)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
    };

    if let Some(source_url) = &article.source.url {
        if let Some(host) = from_url(source_url) {
            return Some(host);
        }
    }
    if let Some(host) = from_url(&article.url) {
        return Some(host);
    }
    let name = article.source.name.trim().to_lowercase();
    if name.contains('.') && !name.contains(' ') {
        return Some(name.trim_start_matches("www.").to_string());
    }
    None
}

/// Score one article under the given strategy.
pub fn score_article(
    article: Article,
    ctx: &ScoreContext,
    config: &ScoringConfig,
    strategy: RankingStrategy,
    now: DateTime<Utc>,
) -> ScoredArticle {
    match strategy {
        RankingStrategy::Weighted => {
            let breakdown = ScoreBreakdown {
                recency: recency_score(article.age_hours(now)),
                relevance: relevance_score(&article, ctx, config),
                source_quality: source_quality_score(&article, config),
                popularity: popularity_score(&article, ctx),
            };
            let w = &config.weights;
            let score = w.recency * breakdown.recency
                + w.relevance * breakdown.relevance
                + w.source_quality * breakdown.source_quality
                + w.popularity * breakdown.popularity;
            ScoredArticle {
                article,
                score,
                strategy,
                breakdown: Some(breakdown),
            }
        }
        RankingStrategy::Additive => {
            let mut score = article.relevance_score;

            if let Some(age) = article.age_hours(now) {
                score += if age < 2.0 {
                    20.0
                } else if age < 6.0 {
                    15.0
                } else if age < 12.0 {
                    10.0
                } else if age < 24.0 {
                    5.0
                } else {
                    0.0
                };
            }

            let text = article.full_text().to_lowercase();
            for interest in &ctx.interests {
                let interest = interest.trim().to_lowercase();
                if !interest.is_empty() && text.contains(&interest) {
                    score += 5.0;
                }
            }

            if article.is_breaking_news {
                score += 15.0;
            }

            ScoredArticle {
                article,
                score,
                strategy,
                breakdown: None,
            }
        }
    }
}

/// Score a batch and sort it descending. The sort is stable: equal scores
/// keep their input order.
pub fn rank(
    articles: Vec<Article>,
    ctx: &ScoreContext,
    config: &ScoringConfig,
    strategy: RankingStrategy,
    now: DateTime<Utc>,
) -> Vec<ScoredArticle> {
    let mut scored: Vec<ScoredArticle> = articles
        .into_iter()
        .map(|article| score_article(article, ctx, config, strategy, now))
        .collect();
    sort_descending(&mut scored);
    scored
}

/// Stable descending sort by score.
pub fn sort_descending(scored: &mut [ScoredArticle]) {
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}
