//! Domain models: users, notes and share grants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Auto-assigned user identifier.
pub type UserId = i64;

/// Auto-assigned note identifier.
pub type NoteId = i64;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Argon2id PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

/// A note. `owner_id` never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub owner_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read-only access to `note_id` granted by its owner to `receiver_id`.
///
/// Identity is `(note_id, receiver_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareGrant {
    pub note_id: NoteId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl ShareGrant {
    /// Reject grants whose sender and receiver are the same user.
    ///
    /// Owned and shared notes must stay disjoint for every user, so an
    /// owner sharing with itself is refused rather than silently ignored.
    pub fn check_parties(sender_id: UserId, receiver_id: UserId) -> Result<()> {
        if sender_id == receiver_id {
            return Err(Error::InvalidInput(
                "a note cannot be shared with its owner".to_string(),
            ));
        }
        Ok(())
    }
}

/// Validate signup/login credentials before they reach storage.
pub fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(Error::InvalidInput(
            "username and password are required".to_string(),
        ));
    }
    Ok(())
}

/// Validate a note body for create/update.
pub fn validate_note_body(body: &str) -> Result<()> {
    if body.trim().is_empty() {
        return Err(Error::InvalidInput("Note body cannot be empty".to_string()));
    }
    Ok(())
}
