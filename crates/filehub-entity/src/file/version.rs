//! File version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One immutable generation of a file's content.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileVersion {
    /// Unique version identifier.
    pub id: Uuid,
    /// The file this version belongs to.
    pub file_id: Uuid,
    /// Sequential version number.
    pub version_number: i64,
    /// Backend key of this version's bytes.
    #[serde(skip_serializing)]
    pub storage_key: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// SHA-256 of the content.
    pub content_hash: String,
    /// User who uploaded this version.
    pub created_by: Uuid,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a version row.
#[derive(Debug, Clone)]
pub struct CreateFileVersion {
    /// The file the version belongs to.
    pub file_id: Uuid,
    /// Sequential version number.
    pub version_number: i64,
    /// Backend key of the bytes.
    pub storage_key: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// SHA-256 of the content.
    pub content_hash: String,
    /// Uploading user.
    pub created_by: Uuid,
}
