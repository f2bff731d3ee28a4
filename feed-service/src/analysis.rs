//! AI-backed article analysis boundary.
//!
//! Wraps an [`AnalysisBackend`] with prompt construction and tolerant
//! response parsing. Every failure mode here - backend unreachable, reply
//! not JSON, ids that match nothing - degrades to the heuristic scoring
//! path; analysis never takes the pipeline down with it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use feed_core::{
    AnalysisBackend, Article, FeedError, FeedResult, Sentiment, SentimentLabel, UserProfile,
};
use feed_ranking::interests;
use tracing::{debug, instrument, warn};

/// Configuration for the analysis client
#[derive(Debug, Clone)]
pub struct AnalysisClientConfig {
    /// Truncate article text sent in prompts to this many characters
    pub max_prompt_chars: usize,
    /// Maximum tags accepted per article from a reply
    pub max_tags: usize,
}

impl Default for AnalysisClientConfig {
    fn default() -> Self {
        Self {
            max_prompt_chars: 500,
            max_tags: 8,
        }
    }
}

/// Per-article analysis outcome after parsing and clamping.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub article_id: String,
    pub relevance_score: f64,
    pub tags: Vec<String>,
    pub sentiment: Option<Sentiment>,
    pub is_breaking_news: bool,
}

/// Raw JSON shape expected from the model, one entry per article.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticleAnalysis {
    id: String,
    relevance_score: f64,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    sentiment: Option<String>,
    #[serde(default)]
    sentiment_score: Option<f64>,
    #[serde(default)]
    is_breaking_news: bool,
}

/// Client for the optional external analysis step
pub struct AnalysisClient {
    backend: Arc<dyn AnalysisBackend>,
    config: AnalysisClientConfig,
}

impl AnalysisClient {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            backend,
            config: AnalysisClientConfig::default(),
        }
    }

    pub fn with_config(backend: Arc<dyn AnalysisBackend>, config: AnalysisClientConfig) -> Self {
        Self { backend, config }
    }

    /// Analyze a batch of articles. `None` means the analysis is
    /// unavailable and the caller should keep heuristic scores.
    #[instrument(skip(self, articles), fields(batch = articles.len()))]
    pub async fn analyze(&self, articles: &[Article]) -> Option<Vec<AnalysisResult>> {
        if articles.is_empty() {
            return Some(Vec::new());
        }

        let user_prompt = self.build_user_prompt(articles);
        let response = match self
            .backend
            .complete(ANALYSIS_SYSTEM_PROMPT, &user_prompt)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Analysis backend unavailable, falling back to heuristics: {e}");
                return None;
            }
        };

        match self.parse_response(&response) {
            Ok(results) => {
                debug!("Parsed {} analysis results", results.len());
                Some(results)
            }
            Err(e) => {
                warn!("Unparseable analysis reply, falling back to heuristics: {e}");
                None
            }
        }
    }

    /// Analyze and write the results back onto the articles. Returns true
    /// when analysis ran; false means nothing was touched.
    pub async fn analyze_and_apply(&self, articles: &mut [Article], now: DateTime<Utc>) -> bool {
        match self.analyze(articles).await {
            Some(results) => {
                apply_results(articles, &results, now);
                true
            }
            None => false,
        }
    }

    /// Suggest interest tags for a user. Merges model suggestions with the
    /// frequency-derived tags; on any failure the deterministic result
    /// stands alone.
    #[instrument(skip(self, profile), fields(user = %profile.user_id))]
    pub async fn suggest_interests(&self, profile: &UserProfile) -> Vec<String> {
        let derived = interests::top_tags(&profile.reading_history);
        if profile.reading_history.is_empty() {
            return derived;
        }

        let recent_titles: Vec<&str> = profile
            .reading_history
            .iter()
            .take(20)
            .map(|entry| entry.title.as_str())
            .collect();
        let user_prompt = format!(
            "Recently read articles:\n{}\n\nCurrent interest tags: {:?}\n\n\
             Suggest up to 5 additional topical interest tags for this reader.",
            recent_titles.join("\n"),
            derived,
        );

        let suggested = match self
            .backend
            .complete(INTEREST_SYSTEM_PROMPT, &user_prompt)
            .await
        {
            Ok(response) => match parse_string_array(&response) {
                Ok(tags) => tags,
                Err(e) => {
                    warn!("Unparseable interest suggestions, keeping derived tags: {e}");
                    return derived;
                }
            },
            Err(e) => {
                warn!("Interest suggestion call failed, keeping derived tags: {e}");
                return derived;
            }
        };

        let mut merged = derived;
        for tag in suggested {
            let tag = tag.trim().to_string();
            if tag.is_empty() {
                continue;
            }
            if !merged.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
                merged.push(tag);
            }
        }
        merged
    }

    fn build_user_prompt(&self, articles: &[Article]) -> String {
        let listing: String = articles
            .iter()
            .map(|article| {
                let text: String = article
                    .full_text()
                    .chars()
                    .take(self.config.max_prompt_chars)
                    .collect();
                format!(
                    "- id: {}\n  title: {}\n  source: {}\n  text: {}",
                    article.id, article.title, article.source.name, text
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("## Articles\n{listing}\n\nAnalyze every article listed above.")
    }

    fn parse_response(&self, response: &str) -> FeedResult<Vec<AnalysisResult>> {
        let json = extract_json(response)?;
        let raw: Vec<RawArticleAnalysis> = serde_json::from_str(&json)
            .map_err(|e| FeedError::parse(format!("Failed to parse analysis reply: {e}")))?;

        Ok(raw
            .into_iter()
            .map(|entry| {
                let sentiment = entry.sentiment.as_deref().map(|label| {
                    let label = match label.to_lowercase().as_str() {
                        "positive" => SentimentLabel::Positive,
                        "negative" => SentimentLabel::Negative,
                        _ => SentimentLabel::Neutral,
                    };
                    Sentiment::new(label, entry.sentiment_score.unwrap_or(0.0))
                });
                AnalysisResult {
                    article_id: entry.id,
                    relevance_score: entry.relevance_score.clamp(0.0, 100.0),
                    tags: entry.tags.into_iter().take(self.config.max_tags).collect(),
                    sentiment,
                    is_breaking_news: entry.is_breaking_news,
                }
            })
            .collect())
    }
}

/// Write analysis results back onto matching articles.
pub fn apply_results(articles: &mut [Article], results: &[AnalysisResult], now: DateTime<Utc>) {
    for result in results {
        let Some(article) = articles.iter_mut().find(|a| a.id == result.article_id) else {
            debug!("Analysis result for unknown article id {}", result.article_id);
            continue;
        };
        article.set_relevance(result.relevance_score);
        if !result.tags.is_empty() {
            article.tags = result.tags.clone();
        }
        if result.sentiment.is_some() {
            article.sentiment = result.sentiment;
        }
        if result.is_breaking_news {
            article.is_breaking_news = true;
        }
        article.analyzed_at = Some(now);
    }
}

const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are a news analysis assistant.

For each article you receive, assess how relevant and significant it is for a
general news reader, extract topical tags, classify sentiment, and decide
whether it is breaking news.

Respond with valid JSON: an array with one object per article, in this exact
format:
[
  {
    "id": "the article id from the list",
    "relevanceScore": 0-100,
    "tags": ["up to 8 short topical tags"],
    "sentiment": "positive|neutral|negative",
    "sentimentScore": -1.0 to 1.0,
    "isBreakingNews": true or false
  }
]

Guidelines:
- relevanceScore reflects newsworthiness for a broad audience, not quality
- mark isBreakingNews only for urgent, time-critical developments
- tags are lowercase noun phrases ("interest rates", "championship")"#;

const INTEREST_SYSTEM_PROMPT: &str = r#"You suggest reading interests.

Given recently read article titles and the reader's current interest tags,
suggest additional topical tags they are likely to follow.

Respond with valid JSON: an array of lowercase tag strings, nothing else."#;

/// Extract JSON from a response that might contain markdown code blocks
fn extract_json(content: &str) -> FeedResult<String> {
    // Try to find JSON in code blocks first
    if let Some(start) = content.find("```json") {
        let start = start + 7;
        if let Some(end) = content[start..].find("```") {
            return Ok(content[start..start + end].trim().to_string());
        }
    }

    // Try plain code blocks
    if let Some(start) = content.find("```") {
        let start = start + 3;
        // Skip language identifier if present
        let start = content[start..]
            .find('\n')
            .map(|n| start + n + 1)
            .unwrap_or(start);
        if let Some(end) = content[start..].find("```") {
            return Ok(content[start..start + end].trim().to_string());
        }
    }

    // Try to find a raw JSON array or object
    for (open, close) in [('[', ']'), ('{', '}')] {
        if let Some(start) = content.find(open) {
            if let Some(end) = content.rfind(close) {
                if end > start {
                    return Ok(content[start..=end].to_string());
                }
            }
        }
    }

    Err(FeedError::parse("No JSON found in response"))
}

fn parse_string_array(response: &str) -> FeedResult<Vec<String>> {
    let json = extract_json(response)?;
    serde_json::from_str(&json)
        .map_err(|e| FeedError::parse(format!("Expected a JSON string array: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use feed_core::ArticleSource;
    use std::sync::Mutex;

    struct CannedBackend {
        replies: Mutex<Vec<FeedResult<String>>>,
    }

    impl CannedBackend {
        fn new(replies: Vec<FeedResult<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
            })
        }
    }

    #[async_trait]
    impl AnalysisBackend for CannedBackend {
        async fn complete(&self, _system: &str, _user: &str) -> FeedResult<String> {
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(FeedError::analysis("no canned reply")))
        }
    }

    fn article(url: &str) -> Article {
        Article::new(url, "A headline", ArticleSource::named("Example"))
    }

    #[test]
    fn test_extract_json_variants() {
        let fenced = "Sure!\n```json\n[{\"a\": 1}]\n```\nDone.";
        assert_eq!(extract_json(fenced).unwrap(), "[{\"a\": 1}]");

        let plain_fence = "```\n[1, 2]\n```";
        assert_eq!(extract_json(plain_fence).unwrap(), "[1, 2]");

        let bare = "here you go [\"x\", \"y\"] thanks";
        assert_eq!(extract_json(bare).unwrap(), "[\"x\", \"y\"]");

        assert!(extract_json("no json at all").is_err());
    }

    #[tokio::test]
    async fn test_analysis_applied_to_articles() {
        let mut articles = vec![article("https://example.com/1")];
        let id = articles[0].id.clone();
        let reply = format!(
            r#"```json
[{{"id": "{id}", "relevanceScore": 150, "tags": ["wildfire"], "sentiment": "negative", "sentimentScore": -0.7, "isBreakingNews": true}}]
```"#
        );
        let client = AnalysisClient::new(CannedBackend::new(vec![Ok(reply)]));

        let now = Utc::now();
        let applied = client.analyze_and_apply(&mut articles, now).await;
        assert!(applied);
        // Relevance clamped into 0-100
        assert_eq!(articles[0].relevance_score, 100.0);
        assert_eq!(articles[0].tags, vec!["wildfire"]);
        assert!(articles[0].is_breaking_news);
        assert_eq!(articles[0].analyzed_at, Some(now));
        assert_eq!(
            articles[0].sentiment.map(|s| s.label),
            Some(SentimentLabel::Negative)
        );
    }

    #[tokio::test]
    async fn test_malformed_reply_leaves_articles_untouched() {
        let mut articles = vec![article("https://example.com/1")];
        let client = AnalysisClient::new(CannedBackend::new(vec![Ok(
            "I could not analyze these articles, sorry.".to_string(),
        )]));

        let applied = client.analyze_and_apply(&mut articles, Utc::now()).await;
        assert!(!applied);
        assert_eq!(articles[0].relevance_score, 50.0);
        assert!(articles[0].analyzed_at.is_none());
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_gracefully() {
        let mut articles = vec![article("https://example.com/1")];
        let client = AnalysisClient::new(CannedBackend::new(vec![Err(FeedError::analysis(
            "connection refused",
        ))]));
        assert!(!client.analyze_and_apply(&mut articles, Utc::now()).await);
    }

    #[tokio::test]
    async fn test_interest_suggestions_merge_with_derived() {
        let mut profile = UserProfile::new("u1");
        for _ in 0..3 {
            profile.push_history(feed_core::ReadingHistoryEntry {
                article_id: "id".to_string(),
                url: "https://example.com".to_string(),
                title: "Chip shortage deepens".to_string(),
                category: feed_core::Category::Technology,
                source: "Example".to_string(),
                tags: vec!["semiconductors".to_string()],
                read_at: Utc::now(),
                seconds_spent: 60,
                completed: true,
            });
        }

        let client = AnalysisClient::new(CannedBackend::new(vec![Ok(
            r#"["supply chains", "Semiconductors"]"#.to_string(),
        )]));
        let tags = client.suggest_interests(&profile).await;
        assert_eq!(tags[0], "semiconductors");
        assert!(tags.contains(&"supply chains".to_string()));
        // Case-insensitive merge: no duplicate semiconductors entry
        assert_eq!(
            tags.iter()
                .filter(|t| t.eq_ignore_ascii_case("semiconductors"))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_interest_suggestions_fall_back_on_error() {
        let mut profile = UserProfile::new("u1");
        profile.push_history(feed_core::ReadingHistoryEntry {
            article_id: "id".to_string(),
            url: "https://example.com".to_string(),
            title: "t".to_string(),
            category: feed_core::Category::World,
            source: "Example".to_string(),
            tags: vec!["diplomacy".to_string()],
            read_at: Utc::now(),
            seconds_spent: 10,
            completed: false,
        });

        let client = AnalysisClient::new(CannedBackend::new(vec![Err(FeedError::analysis(
            "timeout",
        ))]));
        let tags = client.suggest_interests(&profile).await;
        assert_eq!(tags, vec!["diplomacy".to_string()]);
    }
}
