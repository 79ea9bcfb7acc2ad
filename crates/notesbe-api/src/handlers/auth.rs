//! Signup and login.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use notesbe_core::{validate_credentials, Error, UserId};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub user_id: UserId,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// Register a new user.
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_credentials(&body.username, &body.password)?;
    let user_id = state.users.create(&body.username, &body.password).await?;

    info!(
        subsystem = "api",
        component = "auth",
        op = "signup",
        user_id,
        "User registered"
    );
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user_id,
            username: body.username,
        }),
    ))
}

/// Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    validate_credentials(&body.username, &body.password)?;
    let user_id = state
        .users
        .authenticate(&body.username, &body.password)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                Error::InvalidCredentials
            } else {
                e
            }
        })?;

    let issued = state.tokens.issue(user_id)?;
    info!(
        subsystem = "api",
        component = "auth",
        op = "login",
        user_id,
        "Token issued"
    );
    Ok(Json(LoginResponse {
        token: issued.token,
        user_id,
        expires_at: issued.expires_at,
    }))
}
