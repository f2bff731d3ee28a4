//! User profile, preferences, and reading history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Category;

/// Maximum reading-history entries retained per user.
pub const HISTORY_CAP: usize = 100;

/// Per-user feed preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// Preferred categories
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Preferred source names
    #[serde(default)]
    pub sources: Vec<String>,
    /// Maximum articles per generated feed
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
    /// How often the background refresh should run
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_minutes: u64,
    /// Terms whose presence anywhere in an article excludes it
    #[serde(default)]
    pub topics_to_avoid: Vec<String>,
    #[serde(default)]
    pub notifications_enabled: bool,
}

fn default_max_articles() -> usize {
    20
}

fn default_refresh_interval() -> u64 {
    30
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            sources: Vec::new(),
            max_articles: default_max_articles(),
            refresh_interval_minutes: default_refresh_interval(),
            topics_to_avoid: Vec::new(),
            notifications_enabled: false,
        }
    }
}

/// One read action, snapshotted at read time.
///
/// Immutable once created, except that a later read of the same article may
/// update `seconds_spent` and `completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingHistoryEntry {
    /// Id of the article that was read
    pub article_id: String,
    pub url: String,
    pub title: String,
    pub category: Category,
    /// Source name at read time
    pub source: String,
    /// Tag snapshot; interest extraction aggregates over these
    #[serde(default)]
    pub tags: Vec<String>,
    pub read_at: DateTime<Utc>,
    #[serde(default)]
    pub seconds_spent: u64,
    #[serde(default)]
    pub completed: bool,
}

/// A user profile snapshot as handed to the core by the profile store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub preferences: UserPreferences,
    /// Explicit interest tags the user picked
    #[serde(default)]
    pub interests: Vec<String>,
    /// Reading history, most recent first
    #[serde(default)]
    pub reading_history: Vec<ReadingHistoryEntry>,
    /// Saved article ids
    #[serde(default)]
    pub saved_articles: Vec<String>,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            preferences: UserPreferences::default(),
            interests: Vec::new(),
            reading_history: Vec::new(),
            saved_articles: Vec::new(),
        }
    }

    /// Record a read, keeping the history most-recent-first and bounded.
    /// Once past [`HISTORY_CAP`] the oldest entries drop off.
    pub fn push_history(&mut self, entry: ReadingHistoryEntry) {
        self.reading_history.insert(0, entry);
        self.reading_history.truncate(HISTORY_CAP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> ReadingHistoryEntry {
        ReadingHistoryEntry {
            article_id: format!("id-{n}"),
            url: format!("https://example.com/{n}"),
            title: format!("Article {n}"),
            category: Category::General,
            source: "Example".to_string(),
            tags: Vec::new(),
            read_at: Utc::now(),
            seconds_spent: 30,
            completed: false,
        }
    }

    #[test]
    fn test_history_most_recent_first() {
        let mut profile = UserProfile::new("u1");
        profile.push_history(entry(1));
        profile.push_history(entry(2));
        assert_eq!(profile.reading_history[0].article_id, "id-2");
        assert_eq!(profile.reading_history[1].article_id, "id-1");
    }

    #[test]
    fn test_history_cap_evicts_oldest() {
        let mut profile = UserProfile::new("u1");
        for n in 0..HISTORY_CAP + 1 {
            profile.push_history(entry(n));
        }
        assert_eq!(profile.reading_history.len(), HISTORY_CAP);
        // Entry 0 was the oldest and must be gone
        assert!(profile
            .reading_history
            .iter()
            .all(|e| e.article_id != "id-0"));
        assert_eq!(
            profile.reading_history[0].article_id,
            format!("id-{HISTORY_CAP}")
        );
    }
}
