//! URL-based deduplication, run before any scoring.

use std::collections::HashSet;

use feed_core::Article;
use tracing::debug;

/// Keep the first occurrence of each canonical URL, preserving input order.
/// Records without a URL are dropped silently; a malformed entry is not
/// worth failing a feed over.
pub fn dedup_by_url(articles: Vec<Article>) -> Vec<Article> {
    let before = articles.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(before);
    let mut unique = Vec::with_capacity(before);

    for article in articles {
        if article.url.is_empty() {
            continue;
        }
        if seen.insert(article.url.clone()) {
            unique.push(article);
        }
    }

    if unique.len() != before {
        debug!(
            "Deduplicated {} articles down to {}",
            before,
            unique.len()
        );
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use feed_core::ArticleSource;

    fn article(url: &str, title: &str) -> Article {
        Article::new(url, title, ArticleSource::named("Example"))
    }

    #[test]
    fn test_first_occurrence_wins() {
        let input = vec![
            article("https://a.com/1", "first"),
            article("https://a.com/2", "second"),
            article("https://a.com/1", "duplicate of first"),
            article("https://a.com/3", "third"),
            article("https://a.com/2", "duplicate of second"),
        ];
        let out = dedup_by_url(input);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].title, "first");
        assert_eq!(out[1].title, "second");
        assert_eq!(out[2].title, "third");
    }

    #[test]
    fn test_empty_urls_dropped() {
        let input = vec![
            article("", "no url"),
            article("https://a.com/1", "real"),
            article("", "also no url"),
        ];
        let out = dedup_by_url(input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "real");
    }

    #[test]
    fn test_empty_input() {
        assert!(dedup_by_url(Vec::new()).is_empty());
    }
}
