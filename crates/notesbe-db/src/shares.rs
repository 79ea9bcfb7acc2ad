//! Share ledger implementation.
//!
//! A grant is one row in `share_records` keyed by `(note_id, receiver_id)`.
//! Grants are read-only: nothing in the note repository consults this table
//! when matching rows for update or delete.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use notesbe_core::{Error, NoteId, Result, ShareGrant, ShareRepository, UserId};

/// PostgreSQL implementation of ShareRepository.
pub struct PgShareRepository {
    pool: Pool<Postgres>,
}

impl PgShareRepository {
    /// Create a new PgShareRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareRepository for PgShareRepository {
    async fn grant(
        &self,
        note_id: NoteId,
        sender_id: UserId,
        receiver_id: UserId,
    ) -> Result<ShareGrant> {
        ShareGrant::check_parties(sender_id, receiver_id)?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let receiver_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(receiver_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if !receiver_exists {
            return Err(Error::ReceiverNotFound(receiver_id));
        }

        // Lock the note row so a concurrent delete cannot slip in before the insert
        let owned = sqlx::query("SELECT 1 FROM notes WHERE id = $1 AND owner_id = $2 FOR SHARE")
            .bind(note_id)
            .bind(sender_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;
        if owned.is_none() {
            return Err(Error::NoteNotOwned {
                note_id,
                user_id: sender_id,
            });
        }

        let row = sqlx::query(
            "INSERT INTO share_records (note_id, sender_id, receiver_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (note_id, receiver_id) DO NOTHING
             RETURNING created_at",
        )
        .bind(note_id)
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let Some(row) = row else {
            return Err(Error::AlreadyShared {
                note_id,
                receiver_id,
            });
        };

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "shares",
            op = "grant",
            note_id,
            user_id = sender_id,
            receiver_id,
            "Inserted share grant"
        );
        Ok(ShareGrant {
            note_id,
            sender_id,
            receiver_id,
            created_at: row.get("created_at"),
        })
    }

    async fn list_shared_note_ids(&self, receiver_id: UserId) -> Result<BTreeSet<NoteId>> {
        let ids: Vec<NoteId> =
            sqlx::query_scalar("SELECT note_id FROM share_records WHERE receiver_id = $1")
                .bind(receiver_id)
                .fetch_all(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(ids.into_iter().collect())
    }

    async fn is_shared_with(&self, note_id: NoteId, receiver_id: UserId) -> Result<bool> {
        let shared: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM share_records WHERE note_id = $1 AND receiver_id = $2)",
        )
        .bind(note_id)
        .bind(receiver_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(shared)
    }
}
