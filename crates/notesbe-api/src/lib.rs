//! # notesbe-api
//!
//! HTTP surface for notesbe: signup/login with bearer tokens, note CRUD,
//! sharing and full-text search. Handlers only translate HTTP to
//! [`notesbe_core::AccessResolver`] calls and errors back to status codes.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod token;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub use auth::RequireUser;
pub use config::{LogConfig, RateLimitConfig, ServerConfig};
pub use error::ApiError;
pub use state::AppState;
pub use token::{Claims, IssuedToken, TokenError, TokenIssuer};

use handlers::{
    auth::{login, signup},
    health_check,
    notes::{create_note, delete_note, get_note, list_notes, share_note, update_note},
    ping,
    search::search_notes,
};
use middleware::{rate_limit_middleware, MakeRequestUuidV7};

/// Per-request span carrying the correlation id set by the request-id layer.
fn request_span(request: &axum::http::Request<axum::body::Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Maximum accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the application router with its middleware stack.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/health", get(health_check))
        // Auth
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        // Notes
        .route("/api/notes", get(list_notes).post(create_note))
        .route(
            "/api/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/api/notes/:id/share", post(share_note))
        // Search
        .route("/api/search", get(search_notes))
        // Middleware (outermost last)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
