//! Error types for the feed engine

use thiserror::Error;

/// Engine-wide error type
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Profile error: {0}")]
    Profile(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FeedError {
    pub fn provider(msg: impl Into<String>) -> Self {
        FeedError::Provider(msg.into())
    }

    pub fn analysis(msg: impl Into<String>) -> Self {
        FeedError::Analysis(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        FeedError::Parse(msg.into())
    }

    pub fn profile(msg: impl Into<String>) -> Self {
        FeedError::Profile(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        FeedError::Storage(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        FeedError::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        FeedError::Internal(msg.into())
    }
}

/// Result type alias for feed operations
pub type FeedResult<T> = Result<T, FeedError>;
