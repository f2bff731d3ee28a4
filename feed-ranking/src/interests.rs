//! Interest inference from reading history.
//!
//! Deterministic frequency aggregation; the LLM-backed suggestion path in
//! the service layer merges on top of this and never replaces it.

use std::collections::HashMap;

use feed_core::{Category, ReadingHistoryEntry};
use itertools::Itertools;

/// Most recent history entries considered for tag extraction.
pub const ANALYSIS_WINDOW: usize = 50;

/// How many top tags the extractor returns.
pub const TOP_TAGS: usize = 10;

/// Rank strings by descending frequency, ties broken by first appearance.
/// Counting is case-insensitive; the first-seen casing is returned.
fn ranked_by_frequency<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize, String)> = HashMap::new();
    for (position, item) in items.enumerate() {
        let trimmed = item.trim();
        if trimmed.is_empty() {
            continue;
        }
        let key = trimmed.to_lowercase();
        counts
            .entry(key)
            .and_modify(|(count, _, _)| *count += 1)
            .or_insert((1, position, trimmed.to_string()));
    }

    counts
        .into_values()
        .sorted_by(|(count_a, seen_a, _), (count_b, seen_b, _)| {
            count_b.cmp(count_a).then(seen_a.cmp(seen_b))
        })
        .map(|(_, _, display)| display)
        .collect()
}

/// Top tags across the most recent [`ANALYSIS_WINDOW`] reads.
/// Empty history yields an empty result.
pub fn top_tags(history: &[ReadingHistoryEntry]) -> Vec<String> {
    let window = &history[..history.len().min(ANALYSIS_WINDOW)];
    ranked_by_frequency(
        window
            .iter()
            .flat_map(|entry| entry.tags.iter().map(String::as_str)),
    )
    .into_iter()
    .take(TOP_TAGS)
    .collect()
}

/// Most-read categories across the full history, most frequent first.
pub fn top_categories(history: &[ReadingHistoryEntry], n: usize) -> Vec<Category> {
    let names: Vec<&str> = history.iter().map(|entry| entry.category.as_str()).collect();
    ranked_by_frequency(names.into_iter())
        .into_iter()
        .take(n)
        .map(|name| Category::parse_or_general(&name))
        .collect()
}

/// Most-read source names across the full history, most frequent first.
pub fn top_sources(history: &[ReadingHistoryEntry], n: usize) -> Vec<String> {
    ranked_by_frequency(history.iter().map(|entry| entry.source.as_str()))
        .into_iter()
        .take(n)
        .collect()
}
