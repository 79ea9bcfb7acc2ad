//! Search query normalization shared by every backend.
//!
//! PostgreSQL evaluates queries with `websearch_to_tsquery('english', …)`.
//! The in-memory backend approximates that with [`matches`]: every query word
//! must appear as a word in the body, case-insensitively, without stemming.

/// Trim query text; empty or whitespace-only input yields `None`.
///
/// Callers return an empty result for `None`; an empty query never matches
/// every note.
pub fn normalize_query(query: &str) -> Option<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Split text into lowercase alphanumeric words.
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
}

/// In-memory text predicate: all query words occur in `body`.
pub fn matches(body: &str, query: &str) -> bool {
    let Some(query) = normalize_query(query) else {
        return false;
    };
    let body_words: std::collections::HashSet<String> = words(body).collect();
    let mut query_words = words(query).peekable();
    if query_words.peek().is_none() {
        return false;
    }
    query_words.all(|w| body_words.contains(&w))
}
