//! Access resolution over the note store and the share ledger.
//!
//! Every note operation reached from the HTTP layer goes through
//! [`AccessResolver`]. Reads succeed for owners and share receivers; writes
//! succeed for owners only. A caller without visibility always gets the same
//! `NoteNotFound` as for a note that does not exist.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{validate_note_body, Note, NoteId, ShareGrant, UserId};
use crate::query::normalize_query;
use crate::traits::{NoteRepository, ShareRepository};

/// Composes [`NoteRepository`] and [`ShareRepository`] into per-user views.
#[derive(Clone)]
pub struct AccessResolver {
    notes: Arc<dyn NoteRepository>,
    shares: Arc<dyn ShareRepository>,
}

impl AccessResolver {
    /// Create a resolver over the given note store and share ledger.
    pub fn new(notes: Arc<dyn NoteRepository>, shares: Arc<dyn ShareRepository>) -> Self {
        Self { notes, shares }
    }

    /// Notes the user owns, followed by notes shared with the user.
    ///
    /// Both groups are ordered by id. The groups are disjoint because a
    /// grant can never target the note's owner.
    pub async fn list_visible(&self, user_id: UserId) -> Result<Vec<Note>> {
        let start = Instant::now();
        let mut visible = self.notes.list_owned(user_id).await?;
        let owned_count = visible.len();

        let shared_ids = self.shares.list_shared_note_ids(user_id).await?;
        if !shared_ids.is_empty() {
            let ids: Vec<NoteId> = shared_ids.into_iter().collect();
            visible.extend(self.notes.fetch_many(&ids).await?);
        }

        debug!(
            subsystem = "access",
            component = "resolver",
            op = "list_visible",
            user_id,
            result_count = visible.len(),
            shared_count = visible.len() - owned_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed visible notes"
        );
        Ok(visible)
    }

    /// Full-text search over owned notes, then over shared notes.
    ///
    /// Both passes use the store's single text predicate, so a note matches
    /// the same way whichever access path makes it visible. Empty query text
    /// returns no notes.
    pub async fn search_visible(&self, user_id: UserId, query: &str) -> Result<Vec<Note>> {
        let Some(query) = normalize_query(query) else {
            debug!(
                subsystem = "access",
                component = "resolver",
                op = "search_visible",
                user_id,
                "Empty query, returning no results"
            );
            return Ok(Vec::new());
        };

        let start = Instant::now();
        let mut hits = self.notes.search_owned(user_id, query).await?;
        let owned_hits = hits.len();

        let shared_ids = self.shares.list_shared_note_ids(user_id).await?;
        if !shared_ids.is_empty() {
            let ids: Vec<NoteId> = shared_ids.into_iter().collect();
            hits.extend(self.notes.search_among(&ids, query).await?);
        }

        debug!(
            subsystem = "access",
            component = "resolver",
            op = "search_visible",
            user_id,
            query_len = query.len(),
            result_count = hits.len(),
            shared_count = hits.len() - owned_hits,
            duration_ms = start.elapsed().as_millis() as u64,
            "Searched visible notes"
        );
        Ok(hits)
    }

    /// Fetch a note the user owns or holds a share grant for.
    pub async fn fetch_for_read(&self, note_id: NoteId, user_id: UserId) -> Result<Note> {
        match self.notes.fetch_owned(note_id, user_id).await {
            Ok(note) => return Ok(note),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        if !self.shares.is_shared_with(note_id, user_id).await? {
            debug!(
                subsystem = "access",
                component = "resolver",
                op = "fetch_for_read",
                user_id,
                note_id,
                "Note neither owned nor shared"
            );
            return Err(Error::NoteNotFound(note_id));
        }

        // A concurrent delete between the grant check and the fetch leaves nothing
        self.notes
            .fetch_many(&[note_id])
            .await?
            .into_iter()
            .next()
            .ok_or(Error::NoteNotFound(note_id))
    }

    /// Succeeds only if the user owns the note; sharing never authorizes a write.
    pub async fn authorize_mutation(&self, note_id: NoteId, user_id: UserId) -> Result<()> {
        self.notes
            .fetch_owned(note_id, user_id)
            .await
            .map(|_| ())
            .map_err(|e| {
                if e.is_not_found() {
                    Error::NoteNotFound(note_id)
                } else {
                    e
                }
            })
    }

    /// Create a note owned by `owner_id`.
    pub async fn create(&self, owner_id: UserId, body: &str) -> Result<Note> {
        validate_note_body(body)?;
        let note = self.notes.insert(owner_id, body).await?;
        info!(
            subsystem = "access",
            component = "resolver",
            op = "create",
            user_id = owner_id,
            note_id = note.id,
            "Note created"
        );
        Ok(note)
    }

    /// Replace the body of a note the user owns.
    ///
    /// The store applies this as one conditional statement, so there is no
    /// window between the ownership check and the write.
    pub async fn update(&self, note_id: NoteId, user_id: UserId, body: &str) -> Result<Note> {
        validate_note_body(body)?;
        let note = self.notes.update_owned(note_id, user_id, body).await?;
        info!(
            subsystem = "access",
            component = "resolver",
            op = "update",
            user_id,
            note_id,
            "Note updated"
        );
        Ok(note)
    }

    /// Delete a note the user owns. Its share grants go with it.
    pub async fn delete(&self, note_id: NoteId, user_id: UserId) -> Result<()> {
        self.notes.delete_owned(note_id, user_id).await?;
        info!(
            subsystem = "access",
            component = "resolver",
            op = "delete",
            user_id,
            note_id,
            "Note deleted"
        );
        Ok(())
    }

    /// Grant `receiver_id` read access to a note owned by `sender_id`.
    pub async fn share(
        &self,
        note_id: NoteId,
        sender_id: UserId,
        receiver_id: UserId,
    ) -> Result<ShareGrant> {
        match self.shares.grant(note_id, sender_id, receiver_id).await {
            Ok(grant) => {
                info!(
                    subsystem = "access",
                    component = "resolver",
                    op = "share",
                    user_id = sender_id,
                    note_id,
                    receiver_id,
                    "Note shared"
                );
                Ok(grant)
            }
            Err(e) => {
                warn!(
                    subsystem = "access",
                    component = "resolver",
                    op = "share",
                    user_id = sender_id,
                    note_id,
                    receiver_id,
                    error = %e,
                    "Share rejected"
                );
                Err(e)
            }
        }
    }
}
