//! Read-only folder navigation: listings and breadcrumbs.

use std::sync::Arc;

use uuid::Uuid;

use filehub_core::error::AppError;
use filehub_database::repositories::{FileRepository, FolderRepository};
use filehub_entity::folder::path::depth;
use filehub_entity::folder::{BreadcrumbEntry, FolderContents};

use crate::context::RequestContext;

/// Lists folder contents and resolves ancestor chains.
#[derive(Debug, Clone)]
pub struct TreeService {
    folder_repo: Arc<FolderRepository>,
    file_repo: Arc<FileRepository>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(folder_repo: Arc<FolderRepository>, file_repo: Arc<FileRepository>) -> Self {
        Self {
            folder_repo,
            file_repo,
        }
    }

    /// Direct child folders and files of `folder_id` (`None` = the root).
    pub async fn contents(
        &self,
        ctx: &RequestContext,
        folder_id: Option<Uuid>,
    ) -> Result<FolderContents, AppError> {
        let folder = match folder_id {
            Some(id) => Some(
                self.folder_repo
                    .find_live(id, ctx.user_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Folder not found"))?,
            ),
            None => None,
        };

        let folders = self
            .folder_repo
            .find_children(ctx.user_id, folder_id)
            .await?;
        let files = self.file_repo.find_in_folder(ctx.user_id, folder_id).await?;

        Ok(FolderContents {
            folder,
            folders,
            files,
        })
    }

    /// The chain of folders from the top level down to `folder_id`.
    ///
    /// Walks `parent_id` pointers. The walk is bounded by the depth the
    /// folder's path records; running past it means the stored parents
    /// disagree with the path.
    pub async fn breadcrumb(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> Result<Vec<BreadcrumbEntry>, AppError> {
        let folder = self
            .folder_repo
            .find_live(folder_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;

        let limit = depth(&folder.path);
        let mut trail = vec![BreadcrumbEntry::from(&folder)];
        let mut next = folder.parent_id;

        while let Some(parent_id) = next {
            if trail.len() >= limit {
                return Err(AppError::data_integrity(format!(
                    "Parent chain of folder {folder_id} is longer than its path '{}'",
                    folder.path
                )));
            }
            let parent = self
                .folder_repo
                .find_by_id(parent_id)
                .await?
                .filter(|p| p.owner_id == ctx.user_id)
                .ok_or_else(|| {
                    AppError::data_integrity(format!(
                        "Folder {folder_id} has a missing ancestor {parent_id}"
                    ))
                })?;
            next = parent.parent_id;
            trail.push(BreadcrumbEntry::from(&parent));
        }

        trail.reverse();
        Ok(trail)
    }
}
