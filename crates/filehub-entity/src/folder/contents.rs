//! Read models for folder listings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::Folder;
use crate::file::File;

/// Direct children of one folder (or of the owner's root).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderContents {
    /// The listed folder, `None` for the root.
    pub folder: Option<Folder>,
    /// Live child folders, ordered by name.
    pub folders: Vec<Folder>,
    /// Live files, ordered by name.
    pub files: Vec<File>,
}

/// One step of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbEntry {
    /// Folder ID.
    pub id: Uuid,
    /// Folder name.
    pub name: String,
    /// Folder path.
    pub path: String,
}

impl From<&Folder> for BreadcrumbEntry {
    fn from(folder: &Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name.clone(),
            path: folder.path.clone(),
        }
    }
}
