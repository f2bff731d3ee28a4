//! Per-request feed generation.
//!
//! Stateless orchestration of the ranking crate: dedup, score, detect
//! breaking news, personalize, paginate. Each request computes over its own
//! local copies; there is no shared mutable state, so concurrent feed
//! builds need no locking.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use feed_core::{Article, FeedPage, UserProfile};
use feed_ranking::{
    breaking, dedup_by_url, group_by_category, personalize, rank, PersonalizerConfig,
    RankingStrategy, ScoreContext, ScoringConfig,
};
use tracing::{debug, instrument};

/// Feed generation pipeline with injected scoring configuration.
pub struct FeedPipeline {
    scoring: ScoringConfig,
    personalizer: PersonalizerConfig,
}

impl Default for FeedPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedPipeline {
    pub fn new() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            personalizer: PersonalizerConfig::default(),
        }
    }

    pub fn with_config(scoring: ScoringConfig, personalizer: PersonalizerConfig) -> Self {
        Self {
            scoring,
            personalizer,
        }
    }

    /// Pick a strategy for a batch: the additive scheme only applies when
    /// an external analysis has stamped every article. Callers that know
    /// better pass an explicit strategy to [`FeedPipeline::build_feed`].
    pub fn choose_strategy(articles: &[Article]) -> RankingStrategy {
        if !articles.is_empty() && articles.iter().all(|a| a.analyzed_at.is_some()) {
            RankingStrategy::Additive
        } else {
            RankingStrategy::Weighted
        }
    }

    /// Build a personalized, paginated feed for one user.
    #[instrument(skip(self, raw, profile), fields(user = %profile.user_id, raw = raw.len()))]
    pub fn build_feed(
        &self,
        raw: Vec<Article>,
        profile: &UserProfile,
        strategy: Option<RankingStrategy>,
        now: DateTime<Utc>,
    ) -> FeedPage {
        let articles = dedup_by_url(raw);
        let strategy = strategy.unwrap_or_else(|| Self::choose_strategy(&articles));
        debug!(
            "Ranking {} articles with {:?} strategy",
            articles.len(),
            strategy
        );

        let ctx = ScoreContext::from_profile(profile);
        let mut scored = rank(articles, &ctx, &self.scoring, strategy, now);
        breaking::detect(&mut scored, &self.scoring, now);
        let personalized = personalize(scored, profile, &self.personalizer);

        let total_count = personalized.len();
        let limit = profile.preferences.max_articles.max(1);
        let items: Vec<Article> = personalized
            .into_iter()
            .take(limit)
            .map(|entry| entry.article)
            .collect();
        let next_cursor = (total_count > items.len()).then_some(items.len());

        debug!(
            "Feed built: {} of {} articles returned",
            items.len(),
            total_count
        );
        FeedPage {
            items,
            total_count,
            next_cursor,
        }
    }

    /// Build the feed and partition it into per-category buckets for
    /// display.
    pub fn grouped_feed(
        &self,
        raw: Vec<Article>,
        profile: &UserProfile,
        strategy: Option<RankingStrategy>,
        now: DateTime<Utc>,
    ) -> BTreeMap<String, Vec<Article>> {
        let page = self.build_feed(raw, profile, strategy, now);
        group_by_category(&page.items)
    }
}
