//! Structured logging field names for notesbe.
//!
//! All crates use these names for structured `tracing` fields so log
//! aggregation can query the same keys across the API, access and storage
//! layers.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Storage failure surfaced to a caller as a 500 |
//! | WARN  | Rejected share, rate limit hit |
//! | INFO  | Lifecycle events (startup, migrations), mutations |
//! | DEBUG | Visibility decisions, search result sizes, rejected tokens |
//! | TRACE | Per-row detail |
//!
//! Passwords, password hashes and bearer tokens are never logged.

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID set by the request-id layer (UUIDv7).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "access", "database"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "users", "notes", "shares", "pool", "resolver"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "create", "list_visible", "grant", "search_visible"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Acting user.
pub const USER_ID: &str = "user_id";

/// Note being operated on.
pub const NOTE_ID: &str = "note_id";

/// Receiving user of a share grant.
pub const RECEIVER_ID: &str = "receiver_id";

/// Length in bytes of the search query. The text itself is never logged.
pub const QUERY_LEN: &str = "query_len";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a listing or search.
pub const RESULT_COUNT: &str = "result_count";

/// Number of notes visible through share grants.
pub const SHARED_COUNT: &str = "shared_count";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Rows touched by a conditional update/delete.
pub const ROWS_AFFECTED: &str = "rows_affected";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
