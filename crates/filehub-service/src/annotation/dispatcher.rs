//! Fire-and-forget dispatch of uploaded files to the annotator.
//!
//! Dispatch happens after the upload transaction has committed. The
//! annotator runs on its own task under a timeout; its result is merged into
//! `files.metadata` and its failures are only logged.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use filehub_core::traits::{AnnotationRequest, Annotator};
use filehub_database::repositories::FileRepository;
use filehub_entity::file::File;

/// Spawns annotation tasks for committed uploads.
#[derive(Debug, Clone)]
pub struct AnnotationDispatcher {
    annotator: Option<Arc<dyn Annotator>>,
    file_repo: Arc<FileRepository>,
    timeout: Duration,
}

impl AnnotationDispatcher {
    /// Creates a dispatcher that sends every upload to `annotator`.
    pub fn new(annotator: Arc<dyn Annotator>, file_repo: Arc<FileRepository>, timeout: Duration) -> Self {
        Self {
            annotator: Some(annotator),
            file_repo,
            timeout,
        }
    }

    /// Creates a dispatcher that does nothing.
    pub fn disabled(file_repo: Arc<FileRepository>) -> Self {
        Self {
            annotator: None,
            file_repo,
            timeout: Duration::ZERO,
        }
    }

    /// Annotate `file` in the background.
    ///
    /// Returns the task handle so callers that care can await completion;
    /// upload paths drop it.
    pub fn dispatch(&self, file: &File, content: Bytes) -> Option<JoinHandle<()>> {
        let annotator = self.annotator.clone()?;
        let file_repo = self.file_repo.clone();
        let timeout = self.timeout;
        let request = AnnotationRequest {
            file_id: file.id,
            owner_id: file.owner_id,
            file_name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            content,
        };

        Some(tokio::spawn(async move {
            let file_id = request.file_id;
            let name = annotator.name().to_string();

            let value = match tokio::time::timeout(timeout, annotator.annotate(&request)).await {
                Ok(Ok(value)) => value,
                Ok(Err(e)) => {
                    warn!(file_id = %file_id, annotator = %name, error = %e, "Annotation failed");
                    return;
                }
                Err(_) => {
                    warn!(
                        file_id = %file_id,
                        annotator = %name,
                        timeout_secs = timeout.as_secs(),
                        "Annotation timed out"
                    );
                    return;
                }
            };

            match file_repo.merge_metadata(file_id, &name, &value).await {
                Ok(true) => info!(file_id = %file_id, annotator = %name, "Stored annotation"),
                Ok(false) => debug!(file_id = %file_id, "File gone before annotation landed"),
                Err(e) => warn!(file_id = %file_id, error = %e, "Failed to store annotation"),
            }
        }))
    }
}
