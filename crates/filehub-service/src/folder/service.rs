//! Folder hierarchy operations over materialized paths.
//!
//! Every structural change runs in one transaction whose first statement
//! is a write, so SQLite hands it the write lock up front. Renames and
//! moves rewrite the whole subtree's path prefix in a single statement.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use filehub_core::error::AppError;
use filehub_database::repositories::{FileRepository, FolderRepository, UserRepository};
use filehub_database::{DatabasePool, DbConnection, commit};
use filehub_entity::folder::path::{ROOT_PATH, child_path, parent_path};
use filehub_entity::folder::{CreateFolder, Folder};
use filehub_entity::name::validate_name;

use crate::context::RequestContext;
use crate::file::FileService;

/// What a cascading folder delete touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderDeleteReport {
    /// Folders moved to the trash, the target included.
    pub folders_deleted: u64,
    /// Files moved to the trash.
    pub files_deleted: u64,
    /// Sum of the released file sizes.
    pub bytes_released: i64,
}

/// Manages the folder hierarchy.
#[derive(Debug, Clone)]
pub struct FolderService {
    db: DatabasePool,
    folder_repo: Arc<FolderRepository>,
    file_repo: Arc<FileRepository>,
    user_repo: Arc<UserRepository>,
    files: Arc<FileService>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        db: DatabasePool,
        folder_repo: Arc<FolderRepository>,
        file_repo: Arc<FileRepository>,
        user_repo: Arc<UserRepository>,
        files: Arc<FileService>,
    ) -> Self {
        Self {
            db,
            folder_repo,
            file_repo,
            user_repo,
            files,
        }
    }

    /// Create a folder under `parent_id` (`None` = the owner's root).
    pub async fn create(
        &self,
        ctx: &RequestContext,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Folder, AppError> {
        let name = validate_name(name)?;
        let mut tx = self.db.begin().await?;

        if !self.user_repo.touch(&mut tx, ctx.user_id).await? {
            return Err(AppError::not_found("User not found"));
        }
        let base = match parent_id {
            Some(id) => {
                self.folder_repo
                    .find_live_in(&mut tx, id, ctx.user_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Parent folder not found"))?
                    .path
            }
            None => ROOT_PATH.to_string(),
        };

        let path = child_path(&base, &name);
        self.ensure_path_free(&mut tx, ctx.user_id, &path).await?;

        let folder = self
            .folder_repo
            .create(
                &mut tx,
                &CreateFolder {
                    owner_id: ctx.user_id,
                    parent_id,
                    name,
                    path,
                },
            )
            .await?;
        commit(tx).await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            path = %folder.path,
            "Folder created"
        );
        Ok(folder)
    }

    /// Rename a folder and rewrite the paths of its whole subtree.
    pub async fn rename(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        new_name: &str,
    ) -> Result<Folder, AppError> {
        let name = validate_name(new_name)?;
        let mut tx = self.db.begin().await?;

        let folder = self.lock(&mut tx, ctx.user_id, folder_id).await?;
        if folder.name == name {
            return Ok(folder);
        }

        let new_path = child_path(parent_path(&folder.path), &name);
        self.ensure_path_free(&mut tx, ctx.user_id, &new_path).await?;

        let rewritten = self
            .folder_repo
            .rewrite_subtree(&mut tx, ctx.user_id, folder_id, &folder.path, &new_path)
            .await?;
        let renamed = self
            .folder_repo
            .relocate(&mut tx, folder_id, folder.parent_id, &name, &new_path)
            .await?;
        commit(tx).await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            old_path = %folder.path,
            new_path = %renamed.path,
            rewritten,
            "Folder renamed"
        );
        Ok(renamed)
    }

    /// Move a folder under `new_parent_id` (`None` = the owner's root).
    ///
    /// Moving a folder into itself or any of its descendants is a conflict.
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> Result<Folder, AppError> {
        let mut tx = self.db.begin().await?;

        let folder = self.lock(&mut tx, ctx.user_id, folder_id).await?;
        let base = match new_parent_id {
            Some(target_id) => {
                if target_id == folder_id {
                    return Err(AppError::conflict("Cannot move a folder into itself"));
                }
                let target = self
                    .folder_repo
                    .find_live_in(&mut tx, target_id, ctx.user_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Destination folder not found"))?;
                if folder.contains(&target) {
                    return Err(AppError::conflict(
                        "Cannot move a folder into one of its descendants",
                    ));
                }
                target.path
            }
            None => ROOT_PATH.to_string(),
        };
        if folder.parent_id == new_parent_id {
            return Ok(folder);
        }

        let new_path = child_path(&base, &folder.name);
        self.ensure_path_free(&mut tx, ctx.user_id, &new_path).await?;

        let rewritten = self
            .folder_repo
            .rewrite_subtree(&mut tx, ctx.user_id, folder_id, &folder.path, &new_path)
            .await?;
        let moved = self
            .folder_repo
            .relocate(&mut tx, folder_id, new_parent_id, &folder.name, &new_path)
            .await?;
        commit(tx).await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            old_path = %folder.path,
            new_path = %moved.path,
            rewritten,
            "Folder moved"
        );
        Ok(moved)
    }

    /// Trash a folder, every folder beneath it, and every file inside them.
    ///
    /// Each file's bytes are released from the ledger one by one, inside the
    /// same transaction that trashes it.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> Result<FolderDeleteReport, AppError> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;

        let folder = self.lock(&mut tx, ctx.user_id, folder_id).await?;
        let contained = self
            .file_repo
            .find_in_subtree(&mut tx, ctx.user_id, &folder.path)
            .await?;

        let mut report = FolderDeleteReport::default();
        for file in &contained {
            if let Some(released) = self
                .files
                .soft_delete_in(&mut tx, ctx.user_id, file.id, now)
                .await?
            {
                report.files_deleted += 1;
                report.bytes_released += released;
            }
        }
        report.folders_deleted = self
            .folder_repo
            .soft_delete_subtree(&mut tx, ctx.user_id, &folder.path, now)
            .await?;
        commit(tx).await?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder_id,
            path = %folder.path,
            folders = report.folders_deleted,
            files = report.files_deleted,
            bytes = report.bytes_released,
            "Folder moved to trash"
        );
        Ok(report)
    }

    async fn lock(
        &self,
        conn: &mut DbConnection,
        owner_id: Uuid,
        folder_id: Uuid,
    ) -> Result<Folder, AppError> {
        self.folder_repo
            .lock_live(conn, folder_id, owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))
    }

    async fn ensure_path_free(
        &self,
        conn: &mut DbConnection,
        owner_id: Uuid,
        path: &str,
    ) -> Result<(), AppError> {
        if self.folder_repo.path_taken(conn, owner_id, path).await? {
            return Err(AppError::conflict(format!(
                "A folder already exists at '{path}'"
            )));
        }
        Ok(())
    }
}
