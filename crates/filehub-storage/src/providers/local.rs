//! Local filesystem storage backend.
//!
//! Objects live at `{root}/{owner_id}/{object_id}`. Writes go to a hidden
//! temporary file first and are renamed into place, so a reader never sees
//! a partially written object.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use uuid::Uuid;

use filehub_core::error::{AppError, ErrorKind};
use filehub_core::result::AppResult;
use filehub_core::traits::storage::{
    ByteStream, StorageBackend, StorageObjectMeta, generate_key, validate_key,
};

const TEMP_PREFIX: &str = ".tmp-";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorageBackend {
    /// Root directory for all stored objects.
    root: PathBuf,
}

impl LocalStorageBackend {
    /// Create a new local backend rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Resolve a storage key to a path within the root.
    fn resolve(&self, storage_key: &str) -> AppResult<PathBuf> {
        validate_key(storage_key)?;
        Ok(self.root.join(storage_key))
    }

    async fn write_atomically(&self, storage_key: &str, data: &[u8]) -> AppResult<()> {
        let final_path = self.resolve(storage_key)?;
        let dir = final_path
            .parent()
            .ok_or_else(|| AppError::internal(format!("Key has no parent: {storage_key}")))?
            .to_path_buf();
        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::BackendUnavailable,
                format!("Failed to create directory: {}", dir.display()),
                e,
            )
        })?;

        let temp = TempFileGuard::new(dir.join(format!("{TEMP_PREFIX}{}", Uuid::new_v4())));
        let result = async {
            let mut file = fs::File::create(temp.path()).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            fs::rename(temp.path(), &final_path).await
        }
        .await;

        if let Err(e) = result {
            return Err(AppError::with_source(
                ErrorKind::BackendUnavailable,
                format!("Failed to write object: {storage_key}"),
                e,
            ));
        }
        temp.persisted();
        Ok(())
    }
}

/// Removes a half-written temp file when a write fails or its future is
/// dropped before the final rename.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// The temp file was renamed into place; nothing left to clean up.
    fn persisted(mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed abandoned temp file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove temp file"),
        }
    }
}

fn read_error(storage_key: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Object not found: {storage_key}"))
    } else {
        AppError::with_source(
            ErrorKind::BackendUnavailable,
            format!("Failed to read object: {storage_key}"),
            e,
        )
    }
}

#[async_trait]
impl StorageBackend for LocalStorageBackend {
    fn backend_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn put(&self, owner_id: Uuid, content: Bytes, content_type: &str) -> AppResult<String> {
        let storage_key = generate_key(owner_id);
        self.write_atomically(&storage_key, &content).await?;
        debug!(storage_key, bytes = content.len(), content_type, "Stored object");
        Ok(storage_key)
    }

    async fn get(&self, storage_key: &str) -> AppResult<Bytes> {
        let path = self.resolve(storage_key)?;
        let data = fs::read(&path)
            .await
            .map_err(|e| read_error(storage_key, e))?;
        Ok(Bytes::from(data))
    }

    async fn get_stream(&self, storage_key: &str) -> AppResult<ByteStream> {
        let path = self.resolve(storage_key)?;
        let file = fs::File::open(&path)
            .await
            .map_err(|e| read_error(storage_key, e))?;
        Ok(Box::pin(ReaderStream::new(file)))
    }

    async fn delete(&self, storage_key: &str) -> AppResult<()> {
        let path = self.resolve(storage_key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(storage_key, "Deleted object");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::BackendUnavailable,
                format!("Failed to delete object: {storage_key}"),
                e,
            )),
        }
    }

    async fn move_object(&self, from: &str, to: &str) -> AppResult<()> {
        let from_path = self.resolve(from)?;
        let to_path = self.resolve(to)?;
        if let Some(parent) = to_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::rename(&from_path, &to_path)
            .await
            .map_err(|e| read_error(from, e))
    }

    async fn signed_url(&self, _storage_key: &str, _ttl: Duration) -> AppResult<Option<String>> {
        Ok(None)
    }

    async fn list(&self, owner_id: Uuid) -> AppResult<Vec<StorageObjectMeta>> {
        let dir_path = self.root.join(owner_id.to_string());
        let mut dir = match fs::read_dir(&dir_path).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::BackendUnavailable,
                    format!("Failed to list objects for {owner_id}"),
                    e,
                ));
            }
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            // Temp files are listed so a write abandoned mid-flight is
            // still reclaimable as an orphan.
            if name.starts_with('.') && !name.starts_with(TEMP_PREFIX) {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            entries.push(StorageObjectMeta {
                key: format!("{owner_id}/{name}"),
                size_bytes: meta.len(),
                last_modified: meta.modified().ok().map(chrono::DateTime::<chrono::Utc>::from),
            });
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}
