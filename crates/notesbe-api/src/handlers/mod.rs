//! HTTP handlers.

pub mod auth;
pub mod notes;
pub mod search;

use axum::{response::IntoResponse, Json};

/// Liveness probe.
pub async fn ping() -> &'static str {
    "ping\n"
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
