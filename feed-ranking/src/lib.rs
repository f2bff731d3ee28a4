//! Scoring and personalization for the news feed engine
//!
//! This crate holds the synchronous, CPU-bound ranking pipeline: URL
//! deduplication, composite/additive scoring, breaking-news detection,
//! interest extraction from reading history, personalization passes, and
//! category grouping. Everything here is a pure function of its inputs and
//! the injected configuration; the async service layer in `feed-service`
//! wires it to the outside world.

pub mod breaking;
pub mod config;
pub mod dedup;
pub mod grouper;
pub mod interests;
pub mod personalizer;
pub mod scorer;

pub use breaking::{detect, is_breaking};
pub use config::{PersonalizerConfig, ScoreWeights, ScoringConfig};
pub use dedup::dedup_by_url;
pub use grouper::{group_by_category, UNCATEGORIZED};
pub use personalizer::personalize;
pub use scorer::{
    rank, recency_score, score_article, sort_descending, RankingStrategy, ScoreBreakdown,
    ScoreContext, ScoredArticle,
};
