//! File upload service: new files and new versions of existing files.
//!
//! Bytes are written to the backend before any transaction opens. The
//! transaction then charges the ledger as its first statement, inserts the
//! rows, and commits. Any failure before commit rolls back and removes the
//! bytes again. A failed commit leaves the bytes as a logged orphan for the
//! sweeper, never a row without bytes.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, info, warn};
use uuid::Uuid;

use filehub_core::error::AppError;
use filehub_core::traits::StorageBackend;
use filehub_database::repositories::{FileRepository, FolderRepository};
use filehub_database::{DatabasePool, DbConnection, commit};
use filehub_entity::file::{CreateFile, CreateFileVersion, File};
use filehub_entity::name::validate_name;
use filehub_storage::mime::resolve_content_type;

use super::hash::content_hash;
use crate::annotation::AnnotationDispatcher;
use crate::context::RequestContext;
use crate::quota::QuotaLedger;

/// Parameters for uploading a new file.
#[derive(Debug, Clone)]
pub struct UploadParams {
    /// Target folder (`None` = the owner's root).
    pub folder_id: Option<Uuid>,
    /// Display name.
    pub file_name: String,
    /// Declared content type, if the client sent one.
    pub content_type: Option<String>,
    /// File content bytes.
    pub data: Bytes,
}

/// Parameters for replacing a file's content with a new version.
#[derive(Debug, Clone)]
pub struct VersionParams {
    /// Declared content type, if the client sent one.
    pub content_type: Option<String>,
    /// New content bytes.
    pub data: Bytes,
}

/// Handles uploads of new files and new versions.
#[derive(Debug, Clone)]
pub struct UploadService {
    db: DatabasePool,
    file_repo: Arc<FileRepository>,
    folder_repo: Arc<FolderRepository>,
    ledger: Arc<QuotaLedger>,
    storage: Arc<dyn StorageBackend>,
    annotations: Arc<AnnotationDispatcher>,
    max_upload_size_bytes: u64,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        db: DatabasePool,
        file_repo: Arc<FileRepository>,
        folder_repo: Arc<FolderRepository>,
        ledger: Arc<QuotaLedger>,
        storage: Arc<dyn StorageBackend>,
        annotations: Arc<AnnotationDispatcher>,
        max_upload_size_bytes: u64,
    ) -> Self {
        Self {
            db,
            file_repo,
            folder_repo,
            ledger,
            storage,
            annotations,
            max_upload_size_bytes,
        }
    }

    /// Upload a new file.
    pub async fn upload(&self, ctx: &RequestContext, params: UploadParams) -> Result<File, AppError> {
        let owner_id = ctx.user_id;
        let name = validate_name(&params.file_name)?;
        let size = self.check_size(&params.data)?;

        if let Some(folder_id) = params.folder_id {
            self.folder_repo
                .find_live(folder_id, owner_id)
                .await?
                .ok_or_else(|| AppError::not_found("Target folder not found"))?;
        }
        self.ledger.ensure_headroom(owner_id, size).await?;

        let content_hash = content_hash(params.data.clone()).await?;
        let mime_type = resolve_content_type(params.content_type.as_deref(), &name);

        let storage_key = self
            .storage
            .put(owner_id, params.data.clone(), &mime_type)
            .await?;

        let record = CreateFile {
            owner_id,
            folder_id: params.folder_id,
            name,
            storage_key: storage_key.clone(),
            mime_type,
            size_bytes: size,
            content_hash,
        };

        let mut tx = match self.db.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                self.discard(&storage_key).await;
                return Err(e);
            }
        };
        let file = match self.insert_new(&mut tx, &record).await {
            Ok(file) => file,
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    warn!(storage_key = %storage_key, error = %rb, "Rollback failed");
                }
                self.discard(&storage_key).await;
                return Err(e);
            }
        };
        if let Err(e) = commit(tx).await {
            error!(
                user_id = %owner_id,
                storage_key = %storage_key,
                bytes = size,
                error = %e,
                "Upload commit failed; stored bytes are orphaned"
            );
            return Err(e);
        }

        info!(
            user_id = %owner_id,
            file_id = %file.id,
            folder_id = ?file.folder_id,
            name = %file.name,
            bytes = file.size_bytes,
            "Upload completed"
        );
        self.annotations.dispatch(&file, params.data);
        Ok(file)
    }

    /// Store new content for an existing file as its next version.
    ///
    /// The ledger is charged the size difference against the current version.
    pub async fn upload_version(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        params: VersionParams,
    ) -> Result<File, AppError> {
        let owner_id = ctx.user_id;
        let size = self.check_size(&params.data)?;

        let current = self
            .file_repo
            .find_live(file_id, owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        self.ledger
            .ensure_headroom(owner_id, size - current.size_bytes)
            .await?;

        let content_hash = content_hash(params.data.clone()).await?;
        let mime_type = resolve_content_type(params.content_type.as_deref(), &current.name);

        let storage_key = self
            .storage
            .put(owner_id, params.data.clone(), &mime_type)
            .await?;

        let mut tx = match self.db.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                self.discard(&storage_key).await;
                return Err(e);
            }
        };
        let file = match self
            .insert_version(&mut tx, owner_id, file_id, &storage_key, size, content_hash, &mime_type)
            .await
        {
            Ok(file) => file,
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    warn!(storage_key = %storage_key, error = %rb, "Rollback failed");
                }
                self.discard(&storage_key).await;
                return Err(e);
            }
        };
        if let Err(e) = commit(tx).await {
            error!(
                user_id = %owner_id,
                file_id = %file_id,
                storage_key = %storage_key,
                bytes = size,
                error = %e,
                "Version commit failed; stored bytes are orphaned"
            );
            return Err(e);
        }

        info!(
            user_id = %owner_id,
            file_id = %file.id,
            version = file.version_number,
            bytes = file.size_bytes,
            "New version uploaded"
        );
        self.annotations.dispatch(&file, params.data);
        Ok(file)
    }

    fn check_size(&self, data: &Bytes) -> Result<i64, AppError> {
        let size = data.len() as u64;
        if size > self.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.max_upload_size_bytes
            )));
        }
        i64::try_from(size).map_err(|_| AppError::validation("File is too large"))
    }

    async fn insert_new(&self, conn: &mut DbConnection, record: &CreateFile) -> Result<File, AppError> {
        let owner_id = record.owner_id;

        let charge = self.ledger.adjust(conn, owner_id, record.size_bytes).await?;
        if !charge.ok {
            return Err(AppError::quota_exceeded(format!(
                "Storage quota exceeded: {} bytes requested",
                record.size_bytes
            )));
        }

        if let Some(folder_id) = record.folder_id {
            self.folder_repo
                .find_live_in(conn, folder_id, owner_id)
                .await?
                .ok_or_else(|| AppError::not_found("Target folder not found"))?;
        }
        if self
            .file_repo
            .name_taken(conn, owner_id, record.folder_id, &record.name)
            .await?
        {
            return Err(AppError::conflict(format!(
                "A file named '{}' already exists in this folder",
                record.name
            )));
        }

        let file = self.file_repo.create(conn, record).await?;
        self.file_repo
            .create_version(
                conn,
                &CreateFileVersion {
                    file_id: file.id,
                    version_number: file.version_number,
                    storage_key: file.storage_key.clone(),
                    size_bytes: file.size_bytes,
                    content_hash: file.content_hash.clone(),
                    created_by: owner_id,
                },
            )
            .await?;
        Ok(file)
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_version(
        &self,
        conn: &mut DbConnection,
        owner_id: Uuid,
        file_id: Uuid,
        storage_key: &str,
        size: i64,
        content_hash: String,
        mime_type: &str,
    ) -> Result<File, AppError> {
        let current = self
            .file_repo
            .lock_live(conn, file_id, owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        let delta = size - current.size_bytes;
        let charge = self.ledger.adjust(conn, owner_id, delta).await?;
        if !charge.ok {
            return Err(AppError::quota_exceeded(format!(
                "Storage quota exceeded: new version needs {delta} more bytes"
            )));
        }

        let version = self
            .file_repo
            .create_version(
                conn,
                &CreateFileVersion {
                    file_id,
                    version_number: current.version_number + 1,
                    storage_key: storage_key.to_string(),
                    size_bytes: size,
                    content_hash,
                    created_by: owner_id,
                },
            )
            .await?;
        self.file_repo
            .set_current_version(conn, &version, mime_type)
            .await
    }

    /// Remove bytes whose rows were never committed.
    async fn discard(&self, storage_key: &str) {
        if let Err(e) = self.storage.delete(storage_key).await {
            warn!(
                storage_key = %storage_key,
                error = %e,
                "Failed to remove bytes of an aborted upload; left for the orphan sweep"
            );
        }
    }
}
