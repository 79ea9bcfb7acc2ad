//! Authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

use notesbe_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// Header older clients send the raw token in.
pub const LEGACY_TOKEN_HEADER: &str = "authtoken";

/// Extractor that requires a valid bearer token.
///
/// The user id comes only from the verified token.
///
/// ```ignore
/// async fn my_handler(user: RequireUser) -> impl IntoResponse {
///     format!("hello {}", user.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireUser {
    pub user_id: UserId,
}

/// Pull the raw token from `Authorization: Bearer` or the legacy header.
fn presented_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        return value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty());
    }
    headers
        .get(LEGACY_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = presented_token(&parts.headers) else {
            return Err(ApiError::Unauthorized(
                "Authentication required".to_string(),
            ));
        };

        match state.tokens.verify(token) {
            Ok(user_id) => Ok(RequireUser { user_id }),
            Err(e) => {
                tracing::debug!(
                    subsystem = "api",
                    component = "auth",
                    error = %e,
                    "Token rejected"
                );
                Err(e.into())
            }
        }
    }
}
