//! Core types for the news feed ranking engine
//!
//! This crate defines the shared data structures used across the engine:
//! articles and their sources, user profiles and reading history, and the
//! abstract collaborator contracts the service layer calls through.

pub mod article;
pub mod contracts;
pub mod error;
pub mod profile;

pub use article::{
    article_id, Article, ArticleSource, Category, FeedPage, Sentiment, SentimentLabel,
};
pub use contracts::{
    AnalysisBackend, ArticleFilter, ArticleProvider, ArticleStore, FetchQuery, ProfileStore,
};
pub use error::{FeedError, FeedResult};
pub use profile::{ReadingHistoryEntry, UserPreferences, UserProfile, HISTORY_CAP};
