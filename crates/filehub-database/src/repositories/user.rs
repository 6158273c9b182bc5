//! User repository: account rows and the quota counters.

use chrono::Utc;
use sqlx::SqliteConnection;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use filehub_core::result::AppResult;
use filehub_entity::user::{User, UserRole};

use crate::connection::DatabasePool;
use crate::error::db_err;

/// Ledger figures returned by an atomic adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct LedgerRow {
    /// Counter value after the adjustment.
    pub storage_used_bytes: i64,
    /// The user's quota.
    pub storage_quota_bytes: i64,
}

/// Stored counter next to the live bytes it should equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct UsageAudit {
    /// The user.
    pub user_id: Uuid,
    /// Value of `storage_used_bytes`.
    pub recorded_bytes: i64,
    /// Sum of `size_bytes` over the user's live files.
    pub actual_bytes: i64,
}

/// Repository for user rows and quota counters.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(db: &DatabasePool) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find user"))
    }

    /// Provision an account mirrored from the auth service.
    pub async fn create(
        &self,
        username: &str,
        role: UserRole,
        storage_quota_bytes: i64,
    ) -> AppResult<User> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, role, storage_quota_bytes, storage_used_bytes, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, 0, $5, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(role)
        .bind(storage_quota_bytes)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to create user"))
    }

    /// Take the write lock on behalf of `user_id`.
    ///
    /// Returns `false` for an unknown user.
    pub async fn touch(&self, conn: &mut SqliteConnection, user_id: Uuid) -> AppResult<bool> {
        sqlx::query("UPDATE users SET updated_at = updated_at WHERE id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(db_err("Failed to lock user"))
    }

    /// Add `delta` to the user's counter in one statement and return the result.
    ///
    /// The store evaluates `used + delta`, so concurrent adjustments never
    /// lose an update. Returns `None` for an unknown user.
    pub async fn adjust_used(
        &self,
        conn: &mut SqliteConnection,
        user_id: Uuid,
        delta: i64,
    ) -> AppResult<Option<LedgerRow>> {
        sqlx::query_as::<_, LedgerRow>(
            "UPDATE users SET storage_used_bytes = storage_used_bytes + $2, updated_at = $3 \
             WHERE id = $1 RETURNING storage_used_bytes, storage_quota_bytes",
        )
        .bind(user_id)
        .bind(delta)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to adjust storage usage"))
    }

    /// Reset a negative counter to zero.
    pub async fn clamp_used(&self, conn: &mut SqliteConnection, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET storage_used_bytes = 0 WHERE id = $1 AND storage_used_bytes < 0",
        )
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(db_err("Failed to clamp storage usage"))?;
        Ok(())
    }

    /// Compare every user's counter with the bytes of their live files.
    pub async fn audit_usage(&self) -> AppResult<Vec<UsageAudit>> {
        sqlx::query_as::<_, UsageAudit>(
            "SELECT u.id AS user_id, u.storage_used_bytes AS recorded_bytes, \
             COALESCE((SELECT SUM(f.size_bytes) FROM files f \
                       WHERE f.owner_id = u.id AND f.is_deleted = 0), 0) AS actual_bytes \
             FROM users u ORDER BY u.created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to audit storage usage"))
    }

    /// IDs of every user.
    pub async fn list_ids(&self) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to list users"))
    }
}
