//! Duplicate detection read models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::File;

/// Live files of one owner sharing a content hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Shared SHA-256.
    pub content_hash: String,
    /// Members, oldest first. Always at least two.
    pub files: Vec<File>,
    /// Bytes that would be freed by keeping only one copy.
    pub wasted_bytes: i64,
}

impl DuplicateGroup {
    /// Build a group from its members. Returns `None` for fewer than two.
    pub fn from_files(content_hash: String, files: Vec<File>) -> Option<Self> {
        if files.len() < 2 {
            return None;
        }
        let wasted_bytes = files.iter().skip(1).map(|f| f.size_bytes).sum();
        Some(Self {
            content_hash,
            files,
            wasted_bytes,
        })
    }
}

/// Outcome of a bulk duplicate deletion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkDeleteReport {
    /// Files moved to the trash.
    pub deleted: Vec<Uuid>,
    /// Files that could not be deleted, with the reason.
    pub failed: Vec<BulkDeleteFailure>,
    /// Sum of the sizes released from the quota.
    pub bytes_freed: i64,
}

/// One file a bulk deletion skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteFailure {
    /// The file.
    pub file_id: Uuid,
    /// Why it was skipped.
    pub reason: String,
}
