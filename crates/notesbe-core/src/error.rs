//! Error types for notesbe.

use thiserror::Error;

use crate::models::{NoteId, UserId};

/// Result type alias using notesbe's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for notesbe operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Storage operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found, or not visible to the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// Note absent, or owned by someone else
    #[error("Note not found: {0}")]
    NoteNotFound(NoteId),

    /// Share receiver does not exist
    #[error("Receiver not found: {0}")]
    ReceiverNotFound(UserId),

    /// Sender tried to share a note it does not own
    #[error("Note {note_id} is not owned by user {user_id}")]
    NoteNotOwned { note_id: NoteId, user_id: UserId },

    /// Username already registered
    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    /// Login with unknown username or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Grant for this (note, receiver) pair already exists
    #[error("Note {note_id} is already shared with user {receiver_id}")]
    AlreadyShared {
        note_id: NoteId,
        receiver_id: UserId,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing or invalid bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for every variant that means "the caller cannot see this note".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::NoteNotFound(_) | Error::NoteNotOwned { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_note_not_found() {
        let err = Error::NoteNotFound(42);
        assert_eq!(err.to_string(), "Note not found: 42");
    }

    #[test]
    fn test_error_display_already_shared() {
        let err = Error::AlreadyShared {
            note_id: 10,
            receiver_id: 2,
        };
        assert_eq!(err.to_string(), "Note 10 is already shared with user 2");
    }

    #[test]
    fn test_error_display_note_not_owned() {
        let err = Error::NoteNotOwned {
            note_id: 10,
            user_id: 3,
        };
        assert_eq!(err.to_string(), "Note 10 is not owned by user 3");
    }

    #[test]
    fn test_error_display_invalid_credentials_does_not_name_field() {
        let msg = Error::InvalidCredentials.to_string();
        assert_eq!(msg, "Invalid credentials");
        assert!(!msg.contains("password"));
        assert!(!msg.contains("username"));
    }

    #[test]
    fn test_is_not_found_covers_visibility_variants() {
        assert!(Error::NotFound("x".to_string()).is_not_found());
        assert!(Error::NoteNotFound(1).is_not_found());
        assert!(Error::NoteNotOwned {
            note_id: 1,
            user_id: 2
        }
        .is_not_found());
        assert!(!Error::ReceiverNotFound(1).is_not_found());
        assert!(!Error::InvalidCredentials.is_not_found());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_sqlx_error() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(err.to_string().starts_with("Database error:"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
