//! Resolves a file to a redirect or a byte stream.

use std::sync::Arc;
use std::time::Duration;

use tracing::error;
use uuid::Uuid;

use filehub_core::error::{AppError, ErrorKind};
use filehub_core::traits::{ByteStream, StorageBackend};
use filehub_database::repositories::FileRepository;
use filehub_entity::file::File;

use crate::context::RequestContext;

/// How the content of a download is delivered.
pub enum DownloadBody {
    /// The backend serves the bytes itself at this time-limited URL.
    Redirect(String),
    /// The bytes, streamed through the API.
    Stream(ByteStream),
}

impl std::fmt::Debug for DownloadBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Redirect(url) => f.debug_tuple("Redirect").field(url).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A resolved download.
#[derive(Debug)]
pub struct FileDownload {
    /// File metadata for response headers.
    pub file: File,
    /// Where the bytes come from.
    pub body: DownloadBody,
}

/// Resolves file content for owners and share visitors.
#[derive(Debug, Clone)]
pub struct DownloadService {
    file_repo: Arc<FileRepository>,
    storage: Arc<dyn StorageBackend>,
    signed_url_ttl: Duration,
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(
        file_repo: Arc<FileRepository>,
        storage: Arc<dyn StorageBackend>,
        signed_url_ttl: Duration,
    ) -> Self {
        Self {
            file_repo,
            storage,
            signed_url_ttl,
        }
    }

    /// Resolve a live file owned by the caller.
    pub async fn resolve(&self, ctx: &RequestContext, file_id: Uuid) -> Result<FileDownload, AppError> {
        let file = self
            .file_repo
            .find_live(file_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;
        let body = self.open(&file).await?;
        Ok(FileDownload { file, body })
    }

    /// Open the current content of `file`.
    ///
    /// A live row whose bytes are missing is a data-integrity fault.
    pub async fn open(&self, file: &File) -> Result<DownloadBody, AppError> {
        if let Some(url) = self
            .storage
            .signed_url(&file.storage_key, self.signed_url_ttl)
            .await?
        {
            return Ok(DownloadBody::Redirect(url));
        }

        match self.storage.get_stream(&file.storage_key).await {
            Ok(stream) => Ok(DownloadBody::Stream(stream)),
            Err(e) if e.kind == ErrorKind::NotFound => {
                error!(
                    file_id = %file.id,
                    storage_key = %file.storage_key,
                    "File row references missing bytes"
                );
                Err(AppError::data_integrity(format!(
                    "Content of file {} is missing from storage",
                    file.id
                )))
            }
            Err(e) => Err(e),
        }
    }
}
