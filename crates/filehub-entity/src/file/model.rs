//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// A file owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// The file owner.
    pub owner_id: Uuid,
    /// The containing folder (None for the owner's root).
    pub folder_id: Option<Uuid>,
    /// The file name (including extension).
    pub name: String,
    /// Backend key of the current version's bytes.
    #[serde(skip_serializing)]
    pub storage_key: String,
    /// MIME type of the file.
    pub mime_type: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// SHA-256 of the content, lowercase hex.
    pub content_hash: String,
    /// Current version number, starting at 1.
    pub version_number: i64,
    /// Annotations written by content analyzers.
    pub metadata: Json<serde_json::Value>,
    /// Whether the file is in the trash.
    pub is_deleted: bool,
    /// When the file was trashed.
    pub deleted_at: Option<DateTime<Utc>>,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }
}

/// Lowercase extension of a file name, if it has one.
pub fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(stem, ext)| (stem, ext.to_lowercase()))
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
        .map(|(_, ext)| ext)
}

/// Data required to create a new file record.
#[derive(Debug, Clone)]
pub struct CreateFile {
    /// The file owner.
    pub owner_id: Uuid,
    /// The folder to place the file in.
    pub folder_id: Option<Uuid>,
    /// The file name.
    pub name: String,
    /// Backend key of the uploaded bytes.
    pub storage_key: String,
    /// MIME type.
    pub mime_type: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// SHA-256 of the content.
    pub content_hash: String,
}
