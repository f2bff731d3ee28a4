//! Category grouping for display.

use std::collections::BTreeMap;

use feed_core::Article;

/// Bucket key for articles that never received a category.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Partition articles into per-category buckets, preserving the relative
/// order within each bucket. Pure and idempotent.
pub fn group_by_category(articles: &[Article]) -> BTreeMap<String, Vec<Article>> {
    let mut groups: BTreeMap<String, Vec<Article>> = BTreeMap::new();
    for article in articles {
        let key = article
            .category
            .map(|c| c.as_str().to_string())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        groups.entry(key).or_default().push(article.clone());
    }
    groups
}
