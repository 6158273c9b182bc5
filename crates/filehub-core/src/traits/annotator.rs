//! Best-effort content annotation.

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::result::AppResult;

/// Everything an annotator may look at for one uploaded file.
#[derive(Debug, Clone)]
pub struct AnnotationRequest {
    /// File being annotated.
    pub file_id: Uuid,
    /// Owner of the file.
    pub owner_id: Uuid,
    /// Display name at upload time.
    pub file_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Uploaded bytes.
    pub content: Bytes,
}

/// Produces opaque metadata for an uploaded file.
///
/// Annotators run after the upload has committed. Their failures are
/// logged and never surface to the uploader.
#[async_trait]
pub trait Annotator: Send + Sync + std::fmt::Debug + 'static {
    /// Key under which the result is stored in the file's metadata.
    fn name(&self) -> &str;

    /// Analyze the file and return a JSON document to merge into its metadata.
    async fn annotate(&self, request: &AnnotationRequest) -> AppResult<serde_json::Value>;
}
