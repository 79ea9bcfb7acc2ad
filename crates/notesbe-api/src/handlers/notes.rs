//! Note CRUD and sharing.
//!
//! Every handler delegates to the access resolver with the caller's id
//! taken from the verified token.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use notesbe_core::{Note, NoteId, ShareGrant, UserId};

use crate::auth::RequireUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NoteBodyRequest {
    #[serde(default, alias = "note")]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ShareNoteRequest {
    pub receiver_id: UserId,
}

/// Owned notes, then notes shared with the caller.
pub async fn list_notes(
    State(state): State<AppState>,
    user: RequireUser,
) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(state.access.list_visible(user.user_id).await?))
}

pub async fn create_note(
    State(state): State<AppState>,
    user: RequireUser,
    Json(req): Json<NoteBodyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.access.create(user.user_id, &req.body).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn get_note(
    State(state): State<AppState>,
    user: RequireUser,
    Path(id): Path<NoteId>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(state.access.fetch_for_read(id, user.user_id).await?))
}

/// Owner only; a share receiver gets the same 404 as a stranger.
pub async fn update_note(
    State(state): State<AppState>,
    user: RequireUser,
    Path(id): Path<NoteId>,
    Json(req): Json<NoteBodyRequest>,
) -> Result<Json<Note>, ApiError> {
    Ok(Json(state.access.update(id, user.user_id, &req.body).await?))
}

pub async fn delete_note(
    State(state): State<AppState>,
    user: RequireUser,
    Path(id): Path<NoteId>,
) -> Result<StatusCode, ApiError> {
    state.access.delete(id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn share_note(
    State(state): State<AppState>,
    user: RequireUser,
    Path(id): Path<NoteId>,
    Json(req): Json<ShareNoteRequest>,
) -> Result<(StatusCode, Json<ShareGrant>), ApiError> {
    let grant = state
        .access
        .share(id, user.user_id, req.receiver_id)
        .await?;
    Ok((StatusCode::CREATED, Json(grant)))
}
