//! Core traits for notesbe storage backends.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// IDENTITY STORE
// =============================================================================

/// Repository for user accounts and credential checks.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Register a user. Fails with `DuplicateUsername` if the name is taken.
    async fn create(&self, username: &str, password: &str) -> Result<UserId>;

    /// Resolve credentials to a user id.
    ///
    /// Unknown username and wrong password both yield `Error::NotFound`.
    async fn authenticate(&self, username: &str, password: &str) -> Result<UserId>;

    /// Check if a user exists.
    async fn exists(&self, id: UserId) -> Result<bool>;
}

// =============================================================================
// NOTE STORE
// =============================================================================

/// Repository for owner-scoped note CRUD.
///
/// Every mutating method matches on `owner_id`; share grants never
/// authorize a write.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a note, stamping `created_at == updated_at`.
    async fn insert(&self, owner_id: UserId, body: &str) -> Result<Note>;

    /// Fetch a note owned by `owner_id`.
    ///
    /// Missing notes and notes owned by someone else both yield `NoteNotFound`.
    async fn fetch_owned(&self, id: NoteId, owner_id: UserId) -> Result<Note>;

    /// Fetch notes by id with no ownership filter, ordered by id.
    ///
    /// Callers must have established visibility beforehand.
    async fn fetch_many(&self, ids: &[NoteId]) -> Result<Vec<Note>>;

    /// List notes owned by `owner_id` in insertion order.
    async fn list_owned(&self, owner_id: UserId) -> Result<Vec<Note>>;

    /// Replace the body of an owned note. Zero matching rows yields `NoteNotFound`.
    async fn update_owned(&self, id: NoteId, owner_id: UserId, body: &str) -> Result<Note>;

    /// Delete an owned note. Zero matching rows yields `NoteNotFound`.
    async fn delete_owned(&self, id: NoteId, owner_id: UserId) -> Result<()>;

    /// Full-text search over notes owned by `owner_id`.
    async fn search_owned(&self, owner_id: UserId, query: &str) -> Result<Vec<Note>>;

    /// Full-text search restricted to `ids`, using the same predicate as
    /// [`NoteRepository::search_owned`].
    async fn search_among(&self, ids: &[NoteId], query: &str) -> Result<Vec<Note>>;
}

// =============================================================================
// SHARE LEDGER
// =============================================================================

/// Repository for read-only share grants.
#[async_trait]
pub trait ShareRepository: Send + Sync {
    /// Grant `receiver_id` read access to `note_id`.
    ///
    /// Checks, atomically: sender and receiver differ, the receiver exists
    /// (`ReceiverNotFound`), the sender owns the note (`NoteNotOwned`) and no
    /// grant exists yet for the pair (`AlreadyShared`).
    async fn grant(
        &self,
        note_id: NoteId,
        sender_id: UserId,
        receiver_id: UserId,
    ) -> Result<ShareGrant>;

    /// Ids of every note granted to `receiver_id`, regardless of sender.
    async fn list_shared_note_ids(&self, receiver_id: UserId) -> Result<BTreeSet<NoteId>>;

    /// Check whether `receiver_id` holds a grant for `note_id`.
    async fn is_shared_with(&self, note_id: NoteId, receiver_id: UserId) -> Result<bool>;
}
