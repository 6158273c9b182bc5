//! File lifecycle after upload: soft delete, purge, rename, move, versions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use filehub_core::error::AppError;
use filehub_core::traits::StorageBackend;
use filehub_database::repositories::{FileRepository, FolderRepository};
use filehub_database::{DatabasePool, DbConnection, commit};
use filehub_entity::file::{File, FileVersion};
use filehub_entity::name::validate_name;

use crate::context::RequestContext;
use crate::quota::QuotaLedger;

/// Manages file metadata after upload.
#[derive(Debug, Clone)]
pub struct FileService {
    db: DatabasePool,
    file_repo: Arc<FileRepository>,
    folder_repo: Arc<FolderRepository>,
    ledger: Arc<QuotaLedger>,
    storage: Arc<dyn StorageBackend>,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        db: DatabasePool,
        file_repo: Arc<FileRepository>,
        folder_repo: Arc<FolderRepository>,
        ledger: Arc<QuotaLedger>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            db,
            file_repo,
            folder_repo,
            ledger,
            storage,
        }
    }

    /// Get a live file owned by the caller.
    pub async fn get_file(&self, ctx: &RequestContext, file_id: Uuid) -> Result<File, AppError> {
        self.file_repo
            .find_live(file_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))
    }

    /// Move a file to the trash and release its bytes from the ledger.
    ///
    /// The bytes stay in the backend until the file is purged. Returns the
    /// number of bytes released.
    pub async fn soft_delete(&self, ctx: &RequestContext, file_id: Uuid) -> Result<i64, AppError> {
        let mut tx = self.db.begin().await?;
        let released = self
            .soft_delete_in(&mut tx, ctx.user_id, file_id, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        commit(tx).await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            bytes = released,
            "File moved to trash"
        );
        Ok(released)
    }

    /// Trash one live file and release its bytes inside the caller's transaction.
    ///
    /// Returns `None` if the file is not live or not owned by `owner_id`.
    pub(crate) async fn soft_delete_in(
        &self,
        conn: &mut DbConnection,
        owner_id: Uuid,
        file_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>, AppError> {
        let Some(size) = self
            .file_repo
            .mark_deleted(conn, file_id, owner_id, now)
            .await?
        else {
            return Ok(None);
        };
        self.ledger.adjust(conn, owner_id, -size).await?;
        Ok(Some(size))
    }

    /// Permanently remove a file: its bytes for every version, then its rows.
    ///
    /// A live file is trashed first so its quota is released exactly once.
    /// Safe to retry after a partial failure.
    pub async fn purge(&self, ctx: &RequestContext, file_id: Uuid) -> Result<(), AppError> {
        self.purge_owned(ctx.user_id, file_id).await
    }

    /// Purge on behalf of `owner_id`. Used by the trash purger.
    pub async fn purge_owned(&self, owner_id: Uuid, file_id: Uuid) -> Result<(), AppError> {
        let file = self
            .file_repo
            .find_by_id(file_id)
            .await?
            .filter(|f| f.owner_id == owner_id)
            .ok_or_else(|| AppError::not_found("File not found"))?;

        if !file.is_deleted {
            let mut tx = self.db.begin().await?;
            self.soft_delete_in(&mut tx, owner_id, file_id, Utc::now())
                .await?;
            commit(tx).await?;
        }

        let keys = self.file_repo.storage_keys(file_id).await?;
        for key in &keys {
            self.storage.delete(key).await?;
        }

        let mut tx = self.db.begin().await?;
        self.file_repo.delete_row(&mut tx, file_id).await?;
        commit(tx).await?;

        info!(
            user_id = %owner_id,
            file_id = %file_id,
            objects = keys.len(),
            "File purged"
        );
        Ok(())
    }

    /// Rename a file. Metadata only.
    pub async fn rename(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        new_name: &str,
    ) -> Result<File, AppError> {
        let name = validate_name(new_name)?;
        let mut tx = self.db.begin().await?;

        let file = self
            .file_repo
            .lock_live(&mut tx, file_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        if file.name == name {
            return Ok(file);
        }
        if self
            .file_repo
            .name_taken(&mut tx, ctx.user_id, file.folder_id, &name)
            .await?
        {
            return Err(AppError::conflict(format!(
                "A file named '{name}' already exists in this folder"
            )));
        }

        let renamed = self.file_repo.rename(&mut tx, file_id, &name).await?;
        commit(tx).await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            old_name = %file.name,
            new_name = %renamed.name,
            "File renamed"
        );
        Ok(renamed)
    }

    /// Move a file to another live folder of the same owner (`None` = root).
    pub async fn move_file(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> Result<File, AppError> {
        let mut tx = self.db.begin().await?;

        let file = self
            .file_repo
            .lock_live(&mut tx, file_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        if let Some(target) = folder_id {
            self.folder_repo
                .find_live_in(&mut tx, target, ctx.user_id)
                .await?
                .ok_or_else(|| AppError::not_found("Destination folder not found"))?;
        }
        if file.folder_id == folder_id {
            return Ok(file);
        }
        if self
            .file_repo
            .name_taken(&mut tx, ctx.user_id, folder_id, &file.name)
            .await?
        {
            return Err(AppError::conflict(format!(
                "A file named '{}' already exists in the destination folder",
                file.name
            )));
        }

        let moved = self.file_repo.move_to(&mut tx, file_id, folder_id).await?;
        commit(tx).await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            from = ?file.folder_id,
            to = ?folder_id,
            "File moved"
        );
        Ok(moved)
    }

    /// Every version of a file, newest first. Trashed files are included.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> Result<Vec<FileVersion>, AppError> {
        self.file_repo
            .find_by_id(file_id)
            .await?
            .filter(|f| f.owner_id == ctx.user_id)
            .ok_or_else(|| AppError::not_found("File not found"))?;
        self.file_repo.find_versions(file_id).await
    }
}
