//! Feed personalization.
//!
//! Five passes in fixed order: topic filtering, category boost, source
//! boost, diversification, breaking-news placement. Every pass fails open:
//! if a step errors the list continues unchanged by that step, so a bad
//! preference payload degrades the feed instead of killing the request.

use std::collections::HashMap;

use feed_core::{FeedResult, UserProfile};
use tracing::{debug, warn};

use crate::config::PersonalizerConfig;
use crate::interests;
use crate::scorer::{sort_descending, ScoredArticle};

/// Run the full personalization pipeline over a ranked list.
pub fn personalize(
    scored: Vec<ScoredArticle>,
    profile: &UserProfile,
    config: &PersonalizerConfig,
) -> Vec<ScoredArticle> {
    let top_categories: Vec<String> =
        interests::top_categories(&profile.reading_history, config.history_top_n)
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();
    let top_sources = interests::top_sources(&profile.reading_history, config.history_top_n);

    let list = apply_step("topic filter", scored, |list| {
        filter_avoided_topics(list, &profile.preferences.topics_to_avoid)
    });
    let list = apply_step("category boost", list, |list| {
        boost_categories(list, &top_categories, config.category_boost)
    });
    let list = apply_step("source boost", list, |list| {
        boost_sources(list, &top_sources, config.source_boost)
    });
    let list = apply_step("diversification", list, |list| diversify(list, config));
    apply_step("breaking placement", list, |list| {
        Ok(ensure_breaking_visible(list, config))
    })
}

/// Run one personalization step, keeping the incoming order when it fails.
fn apply_step<F>(name: &str, list: Vec<ScoredArticle>, step: F) -> Vec<ScoredArticle>
where
    F: FnOnce(Vec<ScoredArticle>) -> FeedResult<Vec<ScoredArticle>>,
{
    let fallback = list.clone();
    match step(list) {
        Ok(next) => next,
        Err(e) => {
            warn!("Personalization step '{name}' failed, continuing without it: {e}");
            fallback
        }
    }
}

/// Step 1: drop articles containing any avoided term anywhere in
/// title/description/content. Empty avoid list is a no-op.
fn filter_avoided_topics(
    list: Vec<ScoredArticle>,
    topics_to_avoid: &[String],
) -> FeedResult<Vec<ScoredArticle>> {
    let terms: Vec<String> = topics_to_avoid
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if terms.is_empty() {
        return Ok(list);
    }

    let before = list.len();
    let kept: Vec<ScoredArticle> = list
        .into_iter()
        .filter(|entry| {
            let text = entry.article.full_text().to_lowercase();
            !terms.iter().any(|term| text.contains(term.as_str()))
        })
        .collect();
    if kept.len() != before {
        debug!("Topic filter removed {} articles", before - kept.len());
    }
    Ok(kept)
}

/// Step 2: boost articles in the user's most-read categories, then re-sort.
fn boost_categories(
    mut list: Vec<ScoredArticle>,
    top_categories: &[String],
    boost: f64,
) -> FeedResult<Vec<ScoredArticle>> {
    if top_categories.is_empty() {
        return Ok(list);
    }
    for entry in &mut list {
        let category = entry.article.category_or_general();
        if top_categories.iter().any(|c| c.as_str() == category.as_str()) {
            entry.score += boost;
        }
    }
    sort_descending(&mut list);
    Ok(list)
}

/// Step 3: smaller boost for the user's most-read sources, then re-sort.
fn boost_sources(
    mut list: Vec<ScoredArticle>,
    top_sources: &[String],
    boost: f64,
) -> FeedResult<Vec<ScoredArticle>> {
    if top_sources.is_empty() {
        return Ok(list);
    }
    let top_lower: Vec<String> = top_sources.iter().map(|s| s.to_lowercase()).collect();
    for entry in &mut list {
        if top_lower.contains(&entry.article.source.name.to_lowercase()) {
            entry.score += boost;
        }
    }
    sort_descending(&mut list);
    Ok(list)
}

/// Step 4: penalize over-represented categories and sources.
///
/// A category or source holding more than `dominance_share` of the list is
/// dominant; occurrences beyond the allowance (in scan order) take a
/// penalty. Lists under `min_diversify_len` are too small to diversify.
fn diversify(
    mut list: Vec<ScoredArticle>,
    config: &PersonalizerConfig,
) -> FeedResult<Vec<ScoredArticle>> {
    let len = list.len();
    if len < config.min_diversify_len {
        return Ok(list);
    }

    let mut category_counts: HashMap<String, usize> = HashMap::new();
    let mut source_counts: HashMap<String, usize> = HashMap::new();
    for entry in &list {
        *category_counts
            .entry(entry.article.category_or_general().as_str().to_string())
            .or_default() += 1;
        *source_counts
            .entry(entry.article.source.name.to_lowercase())
            .or_default() += 1;
    }

    let share = |count: usize| count as f64 / len as f64;
    let dominant_categories: Vec<&String> = category_counts
        .iter()
        .filter(|(_, &count)| share(count) > config.dominance_share)
        .map(|(name, _)| name)
        .collect();
    let dominant_sources: Vec<&String> = source_counts
        .iter()
        .filter(|(_, &count)| share(count) > config.dominance_share)
        .map(|(name, _)| name)
        .collect();

    if dominant_categories.is_empty() && dominant_sources.is_empty() {
        return Ok(list);
    }
    debug!(
        "Diversifying: {} dominant categories, {} dominant sources",
        dominant_categories.len(),
        dominant_sources.len()
    );

    let mut category_seen: HashMap<String, usize> = HashMap::new();
    let mut source_seen: HashMap<String, usize> = HashMap::new();
    for entry in &mut list {
        let category = entry.article.category_or_general().as_str().to_string();
        if dominant_categories.iter().any(|c| **c == category) {
            let seen = category_seen.entry(category).or_default();
            *seen += 1;
            if *seen > config.category_allowance {
                entry.score -= config.category_penalty;
            }
        }

        let source = entry.article.source.name.to_lowercase();
        if dominant_sources.iter().any(|s| **s == source) {
            let seen = source_seen.entry(source).or_default();
            *seen += 1;
            if *seen > config.source_allowance {
                entry.score -= config.source_penalty;
            }
        }
    }

    sort_descending(&mut list);
    Ok(list)
}

/// Step 5: guarantee one breaking article near the top.
///
/// If breaking news exists but none sits in the first `breaking_window`
/// positions, the single highest-scored breaking article moves to
/// `breaking_slot` (index 2, not 0 - top-ranked non-breaking content keeps
/// its lead). At most one reinsertion per pass.
fn ensure_breaking_visible(
    mut list: Vec<ScoredArticle>,
    config: &PersonalizerConfig,
) -> Vec<ScoredArticle> {
    let window = config.breaking_window.min(list.len());
    if list[..window]
        .iter()
        .any(|entry| entry.article.is_breaking_news)
    {
        return list;
    }

    let best_breaking = list
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.article.is_breaking_news)
        .max_by(|(_, a), (_, b)| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(index, _)| index);

    if let Some(index) = best_breaking {
        let entry = list.remove(index);
        let slot = config.breaking_slot.min(list.len());
        debug!(
            "Moving breaking article '{}' to position {}",
            entry.article.title, slot
        );
        list.insert(slot, entry);
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::scorer::{RankingStrategy, ScoredArticle};
    use chrono::Utc;
    use feed_core::{Article, ArticleSource, Category, FeedError, ReadingHistoryEntry};

    fn scored(title: &str, category: Category, source: &str, score: f64) -> ScoredArticle {
        let mut article = Article::new(
            format!("https://example.com/{}", title.replace(' ', "-")),
            title,
            ArticleSource::named(source),
        );
        article.category = Some(category);
        ScoredArticle {
            article,
            score,
            strategy: RankingStrategy::Additive,
            breakdown: None,
        }
    }

    fn history_entry(category: Category, source: &str) -> ReadingHistoryEntry {
        ReadingHistoryEntry {
            article_id: "id".to_string(),
            url: "https://example.com".to_string(),
            title: "t".to_string(),
            category,
            source: source.to_string(),
            tags: Vec::new(),
            read_at: Utc::now(),
            seconds_spent: 10,
            completed: true,
        }
    }

    #[test]
    fn test_topic_avoidance() {
        let profile = {
            let mut p = feed_core::UserProfile::new("u1");
            p.preferences.topics_to_avoid = vec!["election".to_string()];
            p
        };
        let mut tainted = scored("Market rally continues", Category::Business, "A", 50.0);
        tainted.article.description = "Ahead of the Election results".to_string();
        let list = vec![
            scored("Election night coverage", Category::Politics, "A", 90.0),
            tainted,
            scored("New telescope images", Category::Science, "B", 40.0),
        ];
        let out = personalize(list, &profile, &PersonalizerConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].article.title, "New telescope images");
    }

    #[test]
    fn test_category_and_source_boosts() {
        let mut profile = feed_core::UserProfile::new("u1");
        for _ in 0..3 {
            profile.push_history(history_entry(Category::Sports, "ESPN"));
        }
        let list = vec![
            scored("Political roundup", Category::Politics, "Politico", 52.0),
            scored("Cup final preview", Category::Sports, "ESPN", 50.0),
        ];
        let out = personalize(list, &profile, &PersonalizerConfig::default());
        // 50 + 10 (category) + 5 (source) = 65 beats 52
        assert_eq!(out[0].article.title, "Cup final preview");
        assert!((out[0].score - 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_diversification_penalizes_dominant_category() {
        let profile = feed_core::UserProfile::new("u1");
        let mut list = Vec::new();
        for n in 0..5 {
            list.push(scored(
                &format!("sports {n}"),
                Category::Sports,
                &format!("src{n}"),
                80.0,
            ));
        }
        for n in 0..5 {
            list.push(scored(
                &format!("other {n}"),
                Category::World,
                &format!("other-src{n}"),
                70.0,
            ));
        }
        let out = personalize(list, &profile, &PersonalizerConfig::default());

        let sports_scores: Vec<f64> = out
            .iter()
            .filter(|e| e.article.category == Some(Category::Sports))
            .map(|e| e.score)
            .collect();
        // First three sports occurrences keep 80, the 4th and 5th drop to 75
        let untouched = sports_scores.iter().filter(|s| (**s - 80.0).abs() < 1e-9).count();
        let penalized = sports_scores.iter().filter(|s| (**s - 75.0).abs() < 1e-9).count();
        assert_eq!(untouched, 3);
        assert_eq!(penalized, 2);
    }

    #[test]
    fn test_small_lists_skip_diversification() {
        let profile = feed_core::UserProfile::new("u1");
        let list = vec![
            scored("a", Category::Sports, "S", 80.0),
            scored("b", Category::Sports, "S", 79.0),
            scored("c", Category::Sports, "S", 78.0),
            scored("d", Category::Sports, "S", 77.0),
        ];
        let out = personalize(list, &profile, &PersonalizerConfig::default());
        assert!(out.iter().all(|e| e.score >= 77.0));
    }

    #[test]
    fn test_breaking_moved_to_third_position() {
        let profile = feed_core::UserProfile::new("u1");
        let mut list = vec![
            scored("first", Category::World, "s1", 90.0),
            scored("second", Category::Politics, "s2", 85.0),
            scored("third", Category::Business, "s3", 80.0),
            scored("fourth", Category::Science, "s4", 75.0),
            scored("fifth", Category::Health, "s5", 70.0),
        ];
        list[4].article.is_breaking_news = true;

        let out = personalize(list, &profile, &PersonalizerConfig::default());
        assert_eq!(out[2].article.title, "fifth");
        // Non-breaking relative order unchanged apart from the removal
        let rest: Vec<&str> = out
            .iter()
            .filter(|e| !e.article.is_breaking_news)
            .map(|e| e.article.title.as_str())
            .collect();
        assert_eq!(rest, vec!["first", "second", "third", "fourth"]);
    }

    #[test]
    fn test_breaking_already_visible_untouched() {
        let profile = feed_core::UserProfile::new("u1");
        let mut list = vec![
            scored("first", Category::World, "s1", 90.0),
            scored("second", Category::Politics, "s2", 85.0),
            scored("third", Category::Business, "s3", 80.0),
            scored("fourth", Category::Science, "s4", 75.0),
            scored("fifth", Category::Health, "s5", 70.0),
        ];
        list[1].article.is_breaking_news = true;
        let titles_before: Vec<String> =
            list.iter().map(|e| e.article.title.clone()).collect();

        let out = personalize(list, &profile, &PersonalizerConfig::default());
        let titles_after: Vec<String> =
            out.iter().map(|e| e.article.title.clone()).collect();
        assert_eq!(titles_before, titles_after);
    }

    #[test]
    fn test_only_highest_scored_breaking_moves() {
        let profile = feed_core::UserProfile::new("u1");
        let mut list = vec![
            scored("first", Category::World, "s1", 90.0),
            scored("second", Category::Politics, "s2", 85.0),
            scored("third", Category::Business, "s3", 80.0),
            scored("break-high", Category::Science, "s4", 75.0),
            scored("break-low", Category::Health, "s5", 70.0),
        ];
        list[3].article.is_breaking_news = true;
        list[4].article.is_breaking_news = true;

        let out = personalize(list, &profile, &PersonalizerConfig::default());
        assert_eq!(out[2].article.title, "break-high");
        // The second breaking article stays where its score put it
        assert_eq!(out[4].article.title, "break-low");
    }

    #[test]
    fn test_failed_step_falls_back_to_input() {
        let list = vec![scored("only", Category::World, "s", 50.0)];
        let out = apply_step("doomed", list, |_| {
            Err(FeedError::internal("synthetic failure"))
        });
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].article.title, "only");
    }
}
