//! Full-text search over visible notes.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use notesbe_core::Note;

use crate::auth::RequireUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default, alias = "query")]
    pub q: String,
}

/// Matches among owned notes first, then among shared notes.
/// A blank query returns an empty list.
pub async fn search_notes(
    State(state): State<AppState>,
    user: RequireUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(
        state.access.search_visible(user.user_id, &params.q).await?,
    ))
}
