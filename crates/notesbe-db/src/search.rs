//! Full-text search predicate.
//!
//! Owned-note search and shared-note search must match identically, so both
//! build their SQL from [`FTS_MATCH`]. The GIN index in the initial migration
//! is declared over the same `to_tsvector` expression.

/// Text search configuration used for both the index and the query.
pub const TEXT_SEARCH_CONFIG: &str = "english";

/// `WHERE` fragment matching `n.body` against bind parameter `$1`.
///
/// `websearch_to_tsquery` accepts arbitrary user input (quotes, `or`, `-word`)
/// without raising syntax errors.
pub const FTS_MATCH: &str =
    "to_tsvector('english', n.body) @@ websearch_to_tsquery('english', $1)";

/// Column list selected for every note query.
pub const NOTE_COLUMNS: &str = "n.id, n.owner_id, n.body, n.created_at, n.updated_at";

/// Search over one owner's notes. `$1` = query, `$2` = owner id.
pub fn owned_search_sql() -> String {
    format!(
        "SELECT {} FROM notes n WHERE n.owner_id = $2 AND {} ORDER BY n.id",
        NOTE_COLUMNS, FTS_MATCH
    )
}

/// Search over an explicit id set. `$1` = query, `$2` = BIGINT[] of ids.
pub fn scoped_search_sql() -> String {
    format!(
        "SELECT {} FROM notes n WHERE n.id = ANY($2) AND {} ORDER BY n.id",
        NOTE_COLUMNS, FTS_MATCH
    )
}
