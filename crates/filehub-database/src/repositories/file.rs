//! File and file-version repository implementation.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use filehub_core::result::AppResult;
use filehub_entity::file::{CreateFile, CreateFileVersion, File, FileVersion};

use crate::connection::DatabasePool;
use crate::error::db_err;

/// Repository for file rows, their versions, and derived queries.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: SqlitePool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(db: &DatabasePool) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Find a file by ID, trashed or not.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find file"))
    }

    /// Find a live file belonging to `owner_id`.
    pub async fn find_live(&self, id: Uuid, owner_id: Uuid) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE id = $1 AND owner_id = $2 AND is_deleted = 0",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find file"))
    }

    /// Take the write lock and return a live file belonging to `owner_id`.
    pub async fn lock_live(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        owner_id: Uuid,
    ) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET updated_at = updated_at \
             WHERE id = $1 AND owner_id = $2 AND is_deleted = 0 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to lock file"))
    }

    /// Whether a live file named `name` already sits in the folder.
    pub async fn name_taken(
        &self,
        conn: &mut SqliteConnection,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM files WHERE owner_id = $1 AND folder_id IS $2 \
             AND name = $3 AND is_deleted = 0",
        )
        .bind(owner_id)
        .bind(folder_id)
        .bind(name)
        .fetch_one(&mut *conn)
        .await
        .map(|count| count > 0)
        .map_err(db_err("Failed to check file name"))
    }

    /// Insert a file row at version 1.
    pub async fn create(&self, conn: &mut SqliteConnection, data: &CreateFile) -> AppResult<File> {
        let now = Utc::now();
        sqlx::query_as::<_, File>(
            "INSERT INTO files (id, owner_id, folder_id, name, storage_key, mime_type, size_bytes, \
             content_hash, version_number, metadata, is_deleted, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1, '{}', 0, $9, $9) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.owner_id)
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(&data.storage_key)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(&data.content_hash)
        .bind(now)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to create file"))
    }

    /// Append a version row.
    pub async fn create_version(
        &self,
        conn: &mut SqliteConnection,
        data: &CreateFileVersion,
    ) -> AppResult<FileVersion> {
        sqlx::query_as::<_, FileVersion>(
            "INSERT INTO file_versions (id, file_id, version_number, storage_key, size_bytes, \
             content_hash, created_by, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.file_id)
        .bind(data.version_number)
        .bind(&data.storage_key)
        .bind(data.size_bytes)
        .bind(&data.content_hash)
        .bind(data.created_by)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to create file version"))
    }

    /// Point the file row at a newly appended version.
    pub async fn set_current_version(
        &self,
        conn: &mut SqliteConnection,
        version: &FileVersion,
        mime_type: &str,
    ) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET version_number = $2, storage_key = $3, size_bytes = $4, \
             content_hash = $5, mime_type = $6, updated_at = $7 WHERE id = $1 RETURNING *",
        )
        .bind(version.file_id)
        .bind(version.version_number)
        .bind(&version.storage_key)
        .bind(version.size_bytes)
        .bind(&version.content_hash)
        .bind(mime_type)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to update file version"))
    }

    /// Rename a file.
    pub async fn rename(&self, conn: &mut SqliteConnection, id: Uuid, name: &str) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET name = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to rename file"))
    }

    /// Move a file to another folder (`None` = root).
    pub async fn move_to(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "UPDATE files SET folder_id = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(folder_id)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to move file"))
    }

    /// Trash a live file and return its size, or `None` if it was not live.
    pub async fn mark_deleted(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<i64>> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE files SET is_deleted = 1, deleted_at = $3, updated_at = $3 \
             WHERE id = $1 AND owner_id = $2 AND is_deleted = 0 RETURNING size_bytes",
        )
        .bind(id)
        .bind(owner_id)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err("Failed to delete file"))
    }

    /// Remove a file row. Versions and shares go with it.
    pub async fn delete_row(&self, conn: &mut SqliteConnection, id: Uuid) -> AppResult<bool> {
        sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(db_err("Failed to purge file"))
    }

    /// All versions of a file, newest first.
    pub async fn find_versions(&self, file_id: Uuid) -> AppResult<Vec<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = $1 ORDER BY version_number DESC",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list file versions"))
    }

    /// Every storage key the file references, current version included.
    pub async fn storage_keys(&self, file_id: Uuid) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT storage_key FROM files WHERE id = $1 \
             UNION SELECT storage_key FROM file_versions WHERE file_id = $1",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list storage keys"))
    }

    /// Live files directly in a folder (`None` = the owner's root).
    pub async fn find_in_folder(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE owner_id = $1 AND folder_id IS $2 AND is_deleted = 0 \
             ORDER BY name ASC",
        )
        .bind(owner_id)
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list files"))
    }

    /// Live files inside any live folder at or under `prefix`.
    pub async fn find_in_subtree(
        &self,
        conn: &mut SqliteConnection,
        owner_id: Uuid,
        prefix: &str,
    ) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT f.* FROM files f JOIN folders d ON d.id = f.folder_id \
             WHERE d.owner_id = $1 AND d.is_deleted = 0 AND substr(d.path, 1, length($2)) = $2 \
             AND f.is_deleted = 0 ORDER BY f.created_at",
        )
        .bind(owner_id)
        .bind(prefix)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list files in subtree"))
    }

    /// Live files of `owner_id` whose content hash occurs more than once.
    ///
    /// Ordered by hash, then oldest first within a hash.
    pub async fn find_duplicated(&self, owner_id: Uuid) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE owner_id = $1 AND is_deleted = 0 AND content_hash IN ( \
                SELECT content_hash FROM files WHERE owner_id = $1 AND is_deleted = 0 \
                GROUP BY content_hash HAVING COUNT(*) > 1 \
             ) ORDER BY content_hash, created_at, id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to find duplicate files"))
    }

    /// All trashed files, oldest deletion first.
    pub async fn find_trashed(&self) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE is_deleted = 1 ORDER BY deleted_at")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to list trashed files"))
    }

    /// Every storage key referenced by any of the owner's files or versions.
    pub async fn referenced_keys(&self, owner_id: Uuid) -> AppResult<HashSet<String>> {
        let keys = sqlx::query_scalar::<_, String>(
            "SELECT storage_key FROM files WHERE owner_id = $1 \
             UNION SELECT v.storage_key FROM file_versions v \
             JOIN files f ON f.id = v.file_id WHERE f.owner_id = $1",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list referenced storage keys"))?;
        Ok(keys.into_iter().collect())
    }

    /// Whether any file or version references `storage_key`.
    pub async fn is_key_referenced(&self, storage_key: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, i64>(
            "SELECT (SELECT COUNT(*) FROM files WHERE storage_key = $1) \
             + (SELECT COUNT(*) FROM file_versions WHERE storage_key = $1)",
        )
        .bind(storage_key)
        .fetch_one(&self.pool)
        .await
        .map(|count| count > 0)
        .map_err(db_err("Failed to check storage key"))
    }

    /// Store an annotation under `metadata.<name>`.
    pub async fn merge_metadata(
        &self,
        id: Uuid,
        name: &str,
        value: &serde_json::Value,
    ) -> AppResult<bool> {
        let path = format!("$.\"{}\"", name.replace('"', ""));
        sqlx::query("UPDATE files SET metadata = json_set(metadata, $2, json($3)) WHERE id = $1")
            .bind(id)
            .bind(path)
            .bind(value.to_string())
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(db_err("Failed to update file metadata"))
    }
}
