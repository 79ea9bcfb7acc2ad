//! User repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};

use notesbe_core::password::{hash_password, verify_credential};
use notesbe_core::{Error, Result, UserId, UserRepository};

/// PostgreSQL implementation of UserRepository.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Run CPU-bound Argon2 work off the async executor.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Internal(format!("password task failed: {}", e)))?
}

fn credentials_not_found() -> Error {
    Error::NotFound("no user matches the supplied credentials".to_string())
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, username: &str, password: &str) -> Result<UserId> {
        let password = password.to_string();
        let password_hash = blocking(move || hash_password(&password)).await?;

        let row = sqlx::query(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(username)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return Error::DuplicateUsername(username.to_string());
                }
            }
            Error::Database(e)
        })?;

        let id: UserId = row.get("id");
        info!(
            subsystem = "database",
            component = "users",
            op = "create",
            user_id = id,
            "User created"
        );
        Ok(id)
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<UserId> {
        let row = sqlx::query("SELECT id, password_hash FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        let user: Option<(UserId, String)> =
            row.map(|r| (r.get("id"), r.get("password_hash")));
        let stored_hash = user.as_ref().map(|(_, hash)| hash.clone());
        let password = password.to_string();
        // Unknown usernames still cost one verification, against a stand-in hash
        let verified =
            blocking(move || verify_credential(&password, stored_hash.as_deref())).await?;

        match user {
            Some((id, _)) if verified => Ok(id),
            Some((id, _)) => {
                debug!(
                    subsystem = "database",
                    component = "users",
                    op = "authenticate",
                    user_id = id,
                    "Password mismatch"
                );
                Err(credentials_not_found())
            }
            None => {
                debug!(
                    subsystem = "database",
                    component = "users",
                    op = "authenticate",
                    "Unknown username"
                );
                Err(credentials_not_found())
            }
        }
    }

    async fn exists(&self, id: UserId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(exists)
    }
}
