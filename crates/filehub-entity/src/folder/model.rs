//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::path;

/// A folder in an owner's hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// The folder owner.
    pub owner_id: Uuid,
    /// Parent folder ID (null for top-level folders).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Materialized path, e.g. `/documents/reports/`.
    pub path: String,
    /// Whether the folder is in the trash.
    pub is_deleted: bool,
    /// When the folder was trashed.
    pub deleted_at: Option<DateTime<Utc>>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a top-level folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether `other` is this folder or lies beneath it.
    pub fn contains(&self, other: &Folder) -> bool {
        path::is_within(&other.path, &self.path)
    }

    /// Number of folders between this one and the owner's root.
    pub fn depth(&self) -> usize {
        path::depth(&self.path)
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// The folder owner.
    pub owner_id: Uuid,
    /// Parent folder (None for top level).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Full materialized path.
    pub path: String,
}
