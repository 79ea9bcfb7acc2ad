//! Note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::{debug, trace};

use notesbe_core::{normalize_query, Error, Note, NoteId, NoteRepository, Result, UserId};

use crate::search::{owned_search_sql, scoped_search_sql, NOTE_COLUMNS};

/// PostgreSQL implementation of NoteRepository.
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Map a database row to a Note.
pub(crate) fn map_row_to_note(row: PgRow) -> Note {
    Note {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        body: row.get("body"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, owner_id: UserId, body: &str) -> Result<Note> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO notes AS n (owner_id, body, created_at, updated_at)
             VALUES ($1, $2, $3, $3)
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(owner_id)
        .bind(body)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let note = map_row_to_note(row);
        debug!(
            subsystem = "database",
            component = "notes",
            op = "insert",
            user_id = owner_id,
            note_id = note.id,
            "Inserted note"
        );
        Ok(note)
    }

    async fn fetch_owned(&self, id: NoteId, owner_id: UserId) -> Result<Note> {
        sqlx::query(&format!(
            "SELECT {} FROM notes n WHERE n.id = $1 AND n.owner_id = $2",
            NOTE_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .map(map_row_to_note)
        .ok_or(Error::NoteNotFound(id))
    }

    async fn fetch_many(&self, ids: &[NoteId]) -> Result<Vec<Note>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(&format!(
            "SELECT {} FROM notes n WHERE n.id = ANY($1) ORDER BY n.id",
            NOTE_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        trace!(
            subsystem = "database",
            component = "notes",
            op = "fetch_many",
            requested = ids.len(),
            result_count = rows.len(),
            "Fetched notes by id"
        );
        Ok(rows.into_iter().map(map_row_to_note).collect())
    }

    async fn list_owned(&self, owner_id: UserId) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM notes n WHERE n.owner_id = $1 ORDER BY n.id",
            NOTE_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_row_to_note).collect())
    }

    async fn update_owned(&self, id: NoteId, owner_id: UserId, body: &str) -> Result<Note> {
        // Single conditional statement: no separate existence check to race with
        let row = sqlx::query(&format!(
            "UPDATE notes AS n SET body = $1, updated_at = $2
             WHERE n.id = $3 AND n.owner_id = $4
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(body)
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        let note = row.map(map_row_to_note).ok_or(Error::NoteNotFound(id))?;
        debug!(
            subsystem = "database",
            component = "notes",
            op = "update",
            user_id = owner_id,
            note_id = id,
            "Updated note"
        );
        Ok(note)
    }

    async fn delete_owned(&self, id: NoteId, owner_id: UserId) -> Result<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "notes",
            op = "delete",
            user_id = owner_id,
            note_id = id,
            rows_affected = result.rows_affected(),
            "Delete note"
        );
        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn search_owned(&self, owner_id: UserId, query: &str) -> Result<Vec<Note>> {
        let Some(query) = normalize_query(query) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(&owned_search_sql())
            .bind(query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_row_to_note).collect())
    }

    async fn search_among(&self, ids: &[NoteId], query: &str) -> Result<Vec<Note>> {
        let Some(query) = normalize_query(query) else {
            return Ok(Vec::new());
        };
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(&scoped_search_sql())
            .bind(query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_row_to_note).collect())
    }
}
