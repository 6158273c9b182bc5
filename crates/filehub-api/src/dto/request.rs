//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use filehub_core::error::AppError;
use filehub_service::share::CreateShareRequest;

/// Run `validator` rules and report the first failure as a validation error.
pub fn validate<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}

/// Rename a file or folder.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Move a file to another folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveFileRequest {
    /// Target folder (absent = the root).
    #[serde(default)]
    pub folder_id: Option<Uuid>,
}

/// Create a folder.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    /// Parent folder (absent = the root).
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Move a folder under a new parent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveFolderRequest {
    /// New parent folder (absent = the root).
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Share a file.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareBody {
    /// File to share.
    pub file_id: Uuid,
    /// Optional access password.
    #[validate(length(min = 1, max = 1024, message = "Password must not be empty"))]
    pub password: Option<String>,
    /// Expiry instant.
    pub expires_at: Option<DateTime<Utc>>,
    /// Download cap.
    #[validate(range(min = 1, message = "maxDownloads must be at least 1"))]
    pub max_downloads: Option<i64>,
}

impl From<CreateShareBody> for CreateShareRequest {
    fn from(body: CreateShareBody) -> Self {
        Self {
            file_id: body.file_id,
            password: body.password,
            expires_at: body.expires_at,
            max_downloads: body.max_downloads,
        }
    }
}

/// Soft-delete several files at once.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    /// Files to delete.
    #[validate(length(min = 1, max = 1000, message = "Provide 1-1000 file ids"))]
    pub file_ids: Vec<Uuid>,
}

/// Query string for the public share routes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareAccessQuery {
    /// Share password, if the visitor has one.
    pub password: Option<String>,
}
