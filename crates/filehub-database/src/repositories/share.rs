//! Share repository implementation.

use chrono::Utc;
use sqlx::SqliteConnection;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use filehub_core::result::AppResult;
use filehub_entity::share::{CreateShare, Share};

use crate::connection::DatabasePool;
use crate::error::db_err;

/// Repository for share rows and the download counter.
#[derive(Debug, Clone)]
pub struct ShareRepository {
    pool: SqlitePool,
}

impl ShareRepository {
    /// Create a new share repository.
    pub fn new(db: &DatabasePool) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Find a share by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>("SELECT * FROM shares WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find share"))
    }

    /// Find a share by token, whatever its state.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>("SELECT * FROM shares WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find share by token"))
    }

    /// Whether a token is already in use.
    pub async fn token_exists(&self, conn: &mut SqliteConnection, token: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM shares WHERE token = $1")
            .bind(token)
            .fetch_one(&mut *conn)
            .await
            .map(|count| count > 0)
            .map_err(db_err("Failed to check share token"))
    }

    /// List shares created by a user, newest first.
    pub async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Share>> {
        sqlx::query_as::<_, Share>(
            "SELECT * FROM shares WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list shares"))
    }

    /// Insert a share row.
    pub async fn create(&self, conn: &mut SqliteConnection, data: &CreateShare) -> AppResult<Share> {
        sqlx::query_as::<_, Share>(
            "INSERT INTO shares (id, file_id, owner_id, token, password_hash, expires_at, \
             max_downloads, download_count, is_active, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 0, 1, $8) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.file_id)
        .bind(data.owner_id)
        .bind(&data.token)
        .bind(&data.password_hash)
        .bind(data.expires_at)
        .bind(data.max_downloads)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to create share"))
    }

    /// Switch a share off. Repeating the call is harmless.
    pub async fn deactivate(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>(
            "UPDATE shares SET is_active = 0 WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to revoke share"))
    }

    /// Count one download if the share is active, unexpired, and under its cap.
    ///
    /// The cap is checked by the store in the same statement that
    /// increments, so concurrent callers can never push the count past
    /// `max_downloads`. Returns `None` when no download was counted.
    pub async fn try_increment_download(&self, id: Uuid) -> AppResult<Option<Share>> {
        sqlx::query_as::<_, Share>(
            "UPDATE shares SET download_count = download_count + 1, last_accessed_at = $2 \
             WHERE id = $1 AND is_active = 1 AND (expires_at IS NULL OR expires_at > $2) \
             AND (max_downloads IS NULL OR download_count < max_downloads) RETURNING *",
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to record download"))
    }

    /// Give back a counted download whose bytes could not be served.
    pub async fn decrement_download(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE shares SET download_count = download_count - 1 \
             WHERE id = $1 AND download_count > 0",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to restore download count"))?;
        Ok(())
    }
}
