//! HTTP error mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};

use notesbe_core::Error;

/// Error returned by handlers; renders as `{"error": "<message>"}`.
#[derive(Debug)]
pub enum ApiError {
    /// Storage, configuration or internal failure. Logged, never echoed.
    Internal(Error),
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            // A caller must not learn whether a note exists but is not theirs
            Error::NoteNotFound(id) | Error::NoteNotOwned { note_id: id, .. } => {
                ApiError::NotFound(format!("Note {} not found", id))
            }
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::ReceiverNotFound(id) => ApiError::NotFound(format!("User {} not found", id)),
            Error::InvalidCredentials => {
                ApiError::Unauthorized("Invalid username or password".to_string())
            }
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Error::DuplicateUsername(name) => {
                ApiError::Conflict(format!("Username {} is already taken", name))
            }
            err @ Error::AlreadyShared { .. } => ApiError::Conflict(err.to_string()),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            err => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
