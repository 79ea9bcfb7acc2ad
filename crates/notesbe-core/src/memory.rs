//! In-memory storage backend for deterministic testing.
//!
//! [`MemoryStore`] implements all three repository traits over one
//! mutex-guarded state, so a single lock gives the same atomicity the
//! PostgreSQL backend gets from transactions and constraints.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use notesbe_core::{AccessResolver, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let resolver = AccessResolver::new(Arc::new(store.clone()), Arc::new(store));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Error, Result};
use crate::models::*;
use crate::password::{hash_password, verify_credential};
use crate::query::{matches, normalize_query};
use crate::traits::{NoteRepository, ShareRepository, UserRepository};

/// Mock storage backend shared by clones.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    /// Argon2 verifications performed by `authenticate`.
    password_checks: Arc<AtomicUsize>,
}

#[derive(Default)]
struct MemoryState {
    next_user_id: UserId,
    next_note_id: NoteId,
    users: BTreeMap<UserId, User>,
    notes: BTreeMap<NoteId, Note>,
    /// Keyed by (note_id, receiver_id).
    shares: BTreeMap<(NoteId, UserId), ShareGrant>,
}

impl MemoryState {
    fn alloc_user_id(&mut self) -> UserId {
        self.next_user_id += 1;
        self.next_user_id
    }

    fn alloc_note_id(&mut self) -> NoteId {
        self.next_note_id += 1;
        self.next_note_id
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))
    }

    /// Number of share grants currently stored.
    pub fn share_count(&self) -> Result<usize> {
        Ok(self.lock()?.shares.len())
    }

    /// Number of password verifications run so far, successful or not.
    pub fn password_checks(&self) -> usize {
        self.password_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, username: &str, password: &str) -> Result<UserId> {
        let password_hash = hash_password(password)?;
        let mut state = self.lock()?;
        if state.users.values().any(|u| u.username == username) {
            return Err(Error::DuplicateUsername(username.to_string()));
        }
        let id = state.alloc_user_id();
        state.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                password_hash,
            },
        );
        Ok(id)
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<UserId> {
        let user = {
            let state = self.lock()?;
            state
                .users
                .values()
                .find(|u| u.username == username)
                .cloned()
        };
        self.password_checks.fetch_add(1, Ordering::SeqCst);
        let stored_hash = user.as_ref().map(|u| u.password_hash.as_str());
        let verified = verify_credential(password, stored_hash)?;
        match user {
            Some(user) if verified => Ok(user.id),
            _ => Err(Error::NotFound(
                "no user matches the supplied credentials".to_string(),
            )),
        }
    }

    async fn exists(&self, id: UserId) -> Result<bool> {
        Ok(self.lock()?.users.contains_key(&id))
    }
}

#[async_trait]
impl NoteRepository for MemoryStore {
    async fn insert(&self, owner_id: UserId, body: &str) -> Result<Note> {
        let mut state = self.lock()?;
        if !state.users.contains_key(&owner_id) {
            return Err(Error::NotFound(format!("User {} not found", owner_id)));
        }
        let now = Utc::now();
        let id = state.alloc_note_id();
        let note = Note {
            id,
            owner_id,
            body: body.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.notes.insert(id, note.clone());
        Ok(note)
    }

    async fn fetch_owned(&self, id: NoteId, owner_id: UserId) -> Result<Note> {
        self.lock()?
            .notes
            .get(&id)
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .ok_or(Error::NoteNotFound(id))
    }

    async fn fetch_many(&self, ids: &[NoteId]) -> Result<Vec<Note>> {
        let state = self.lock()?;
        let wanted: BTreeSet<NoteId> = ids.iter().copied().collect();
        Ok(wanted
            .iter()
            .filter_map(|id| state.notes.get(id).cloned())
            .collect())
    }

    async fn list_owned(&self, owner_id: UserId) -> Result<Vec<Note>> {
        Ok(self
            .lock()?
            .notes
            .values()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update_owned(&self, id: NoteId, owner_id: UserId, body: &str) -> Result<Note> {
        let mut state = self.lock()?;
        match state.notes.get_mut(&id) {
            Some(note) if note.owner_id == owner_id => {
                note.body = body.to_string();
                note.updated_at = Utc::now();
                Ok(note.clone())
            }
            _ => Err(Error::NoteNotFound(id)),
        }
    }

    async fn delete_owned(&self, id: NoteId, owner_id: UserId) -> Result<()> {
        let mut state = self.lock()?;
        match state.notes.get(&id) {
            Some(note) if note.owner_id == owner_id => {
                state.notes.remove(&id);
                // Cascade, as the share_records foreign key does
                state.shares.retain(|(note_id, _), _| *note_id != id);
                Ok(())
            }
            _ => Err(Error::NoteNotFound(id)),
        }
    }

    async fn search_owned(&self, owner_id: UserId, query: &str) -> Result<Vec<Note>> {
        let Some(query) = normalize_query(query) else {
            return Ok(Vec::new());
        };
        Ok(self
            .lock()?
            .notes
            .values()
            .filter(|n| n.owner_id == owner_id && matches(&n.body, query))
            .cloned()
            .collect())
    }

    async fn search_among(&self, ids: &[NoteId], query: &str) -> Result<Vec<Note>> {
        let Some(query) = normalize_query(query) else {
            return Ok(Vec::new());
        };
        let state = self.lock()?;
        let wanted: BTreeSet<NoteId> = ids.iter().copied().collect();
        Ok(wanted
            .iter()
            .filter_map(|id| state.notes.get(id))
            .filter(|n| matches(&n.body, query))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ShareRepository for MemoryStore {
    async fn grant(
        &self,
        note_id: NoteId,
        sender_id: UserId,
        receiver_id: UserId,
    ) -> Result<ShareGrant> {
        ShareGrant::check_parties(sender_id, receiver_id)?;
        let mut state = self.lock()?;
        if !state.users.contains_key(&receiver_id) {
            return Err(Error::ReceiverNotFound(receiver_id));
        }
        if !state
            .notes
            .get(&note_id)
            .is_some_and(|n| n.owner_id == sender_id)
        {
            return Err(Error::NoteNotOwned {
                note_id,
                user_id: sender_id,
            });
        }
        if state.shares.contains_key(&(note_id, receiver_id)) {
            return Err(Error::AlreadyShared {
                note_id,
                receiver_id,
            });
        }
        let grant = ShareGrant {
            note_id,
            sender_id,
            receiver_id,
            created_at: Utc::now(),
        };
        state.shares.insert((note_id, receiver_id), grant.clone());
        Ok(grant)
    }

    async fn list_shared_note_ids(&self, receiver_id: UserId) -> Result<BTreeSet<NoteId>> {
        Ok(self
            .lock()?
            .shares
            .keys()
            .filter(|(_, r)| *r == receiver_id)
            .map(|(note_id, _)| *note_id)
            .collect())
    }

    async fn is_shared_with(&self, note_id: NoteId, receiver_id: UserId) -> Result<bool> {
        Ok(self.lock()?.shares.contains_key(&(note_id, receiver_id)))
    }
}
