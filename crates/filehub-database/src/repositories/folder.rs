//! Folder repository implementation.
//!
//! Subtree queries match on the materialized path with
//! `substr(path, 1, length(prefix)) = prefix`, so `%` and `_` in folder
//! names carry no special meaning. Path rewrites select their rows by
//! walking `parent_id` instead.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use filehub_core::result::AppResult;
use filehub_entity::folder::{CreateFolder, Folder};

use crate::connection::DatabasePool;
use crate::error::db_err;

/// Repository for folder rows and path maintenance.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: SqlitePool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(db: &DatabasePool) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Find a folder by ID, trashed or not.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find folder"))
    }

    /// Find a live folder belonging to `owner_id`.
    pub async fn find_live(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE id = $1 AND owner_id = $2 AND is_deleted = 0",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find folder"))
    }

    /// Take the write lock and return a live folder belonging to `owner_id`.
    ///
    /// Issued as a no-op `UPDATE` so the enclosing transaction holds the
    /// database write lock from its first statement.
    pub async fn lock_live(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        owner_id: Uuid,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET updated_at = updated_at \
             WHERE id = $1 AND owner_id = $2 AND is_deleted = 0 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to lock folder"))
    }

    /// Fetch a live folder inside a transaction.
    pub async fn find_live_in(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        owner_id: Uuid,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE id = $1 AND owner_id = $2 AND is_deleted = 0",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to find folder"))
    }

    /// Whether a live folder already occupies `path`.
    pub async fn path_taken(
        &self,
        conn: &mut SqliteConnection,
        owner_id: Uuid,
        path: &str,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM folders WHERE owner_id = $1 AND path = $2 AND is_deleted = 0",
        )
        .bind(owner_id)
        .bind(path)
        .fetch_one(&mut *conn)
        .await
        .map(|count| count > 0)
        .map_err(db_err("Failed to check folder path"))
    }

    /// Insert a folder row.
    pub async fn create(&self, conn: &mut SqliteConnection, data: &CreateFolder) -> AppResult<Folder> {
        let now = Utc::now();
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (id, owner_id, parent_id, name, path, is_deleted, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, 0, $6, $6) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.owner_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(&data.path)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to create folder"))
    }

    /// Set a folder's parent, name, and path.
    pub async fn relocate(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        path: &str,
    ) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET parent_id = $2, name = $3, path = $4, updated_at = $5 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(parent_id)
        .bind(name)
        .bind(path)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to update folder"))
    }

    /// Replace `old_prefix` with `new_prefix` on `folder_id` and every
    /// folder beneath it, trashed descendants included.
    ///
    /// The subtree is found by walking `parent_id`, not by path prefix, so a
    /// trashed subtree left behind by an older folder of the same name is
    /// not touched.
    pub async fn rewrite_subtree(
        &self,
        conn: &mut SqliteConnection,
        owner_id: Uuid,
        folder_id: Uuid,
        old_prefix: &str,
        new_prefix: &str,
    ) -> AppResult<u64> {
        sqlx::query(
            "WITH RECURSIVE subtree(id) AS ( \
                 SELECT id FROM folders WHERE id = $2 AND owner_id = $1 \
                 UNION ALL \
                 SELECT f.id FROM folders f JOIN subtree s ON f.parent_id = s.id \
             ) \
             UPDATE folders SET path = $4 || substr(path, length($3) + 1), updated_at = $5 \
             WHERE id IN (SELECT id FROM subtree) AND substr(path, 1, length($3)) = $3",
        )
        .bind(owner_id)
        .bind(folder_id)
        .bind(old_prefix)
        .bind(new_prefix)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await
        .map(|r| r.rows_affected())
        .map_err(db_err("Failed to rewrite folder paths"))
    }

    /// Trash every live folder at or under `prefix`.
    pub async fn soft_delete_subtree(
        &self,
        conn: &mut SqliteConnection,
        owner_id: Uuid,
        prefix: &str,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        sqlx::query(
            "UPDATE folders SET is_deleted = 1, deleted_at = $3, updated_at = $3 \
             WHERE owner_id = $1 AND is_deleted = 0 AND substr(path, 1, length($2)) = $2",
        )
        .bind(owner_id)
        .bind(prefix)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map(|r| r.rows_affected())
        .map_err(db_err("Failed to delete folder subtree"))
    }

    /// Live direct children of `parent_id` (`None` = the owner's root).
    pub async fn find_children(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND parent_id IS $2 AND is_deleted = 0 \
             ORDER BY name ASC",
        )
        .bind(owner_id)
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list child folders"))
    }
}
