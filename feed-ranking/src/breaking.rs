//! Breaking-news detection.
//!
//! Pure function of already-computed scores plus title text. An article is
//! breaking if the external analysis flagged it, if it is very fresh and
//! carries an urgency keyword in the title, or if its score clears the
//! top-tier threshold.

use feed_core::Article;
use tracing::debug;

use crate::config::ScoringConfig;
use crate::scorer::{recency_score, RankingStrategy, ScoredArticle};

/// Decide whether a single article qualifies as breaking.
pub fn is_breaking(
    article: &Article,
    recency: f64,
    score: f64,
    strategy: RankingStrategy,
    config: &ScoringConfig,
) -> bool {
    if article.is_breaking_news {
        return true;
    }

    if recency > config.breaking_recency_threshold {
        let title = article.title.to_lowercase();
        if config
            .urgency_keywords
            .iter()
            .any(|keyword| title.contains(keyword.as_str()))
        {
            return true;
        }
    }

    let threshold = match strategy {
        RankingStrategy::Weighted => config.breaking_score_threshold,
        RankingStrategy::Additive => config.breaking_base_threshold,
    };
    score > threshold
}

/// Flag breaking articles across a scored batch, in place.
///
/// Only ever sets the flag; an analysis-supplied `true` is never cleared by
/// the heuristic.
pub fn detect(scored: &mut [ScoredArticle], config: &ScoringConfig, now: chrono::DateTime<chrono::Utc>) {
    let mut flagged = 0usize;
    for entry in scored.iter_mut() {
        let recency = entry
            .breakdown
            .map(|b| b.recency)
            .unwrap_or_else(|| recency_score(entry.article.age_hours(now)));
        if is_breaking(&entry.article, recency, entry.score, entry.strategy, config) {
            if !entry.article.is_breaking_news {
                flagged += 1;
            }
            entry.article.is_breaking_news = true;
        }
    }
    if flagged > 0 {
        debug!("Flagged {} articles as breaking news", flagged);
    }
}
