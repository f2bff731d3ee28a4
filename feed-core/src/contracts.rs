//! Collaborator contracts the ranking core calls through.
//!
//! Concrete transports (HTTP providers, databases, LLM clients) live outside
//! this workspace; the service layer only sees these traits. Every contract
//! either returns a complete result or an explicit error, never partial
//! garbage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Article, Category, FeedResult, UserProfile};

/// Query handed to an article provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchQuery {
    /// Free-text search query, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Restrict to these categories; empty means all
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Maximum articles to return
    #[serde(default = "default_fetch_limit")]
    pub limit: usize,
}

fn default_fetch_limit() -> usize {
    100
}

/// Filter for reading articles back from the store.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub category: Option<Category>,
    pub published_after: Option<DateTime<Utc>>,
    pub breaking_only: bool,
    pub limit: Option<usize>,
}

/// Upstream source of raw articles (RSS aggregator, news API, ...).
#[async_trait]
pub trait ArticleProvider: Send + Sync {
    async fn fetch(&self, query: &FetchQuery) -> FeedResult<Vec<Article>>;
}

/// Persistence collaborator. The core reads and writes value objects only;
/// retention/expiry of stored articles is the store's concern.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn upsert(&self, article: &Article) -> FeedResult<()>;
    async fn find(&self, filter: &ArticleFilter) -> FeedResult<Vec<Article>>;
}

/// Read-only access to user profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: &str) -> FeedResult<UserProfile>;
}

/// Raw completion backend for the optional AI analysis path.
///
/// The analysis client wraps this with prompt construction and tolerant
/// response parsing; any error here degrades to heuristic scoring.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> FeedResult<String>;
}
