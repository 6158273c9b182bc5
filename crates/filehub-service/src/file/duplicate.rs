//! Duplicate detection by content hash.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use filehub_core::error::AppError;
use filehub_database::repositories::FileRepository;
use filehub_entity::file::{BulkDeleteFailure, BulkDeleteReport, DuplicateGroup, File};

use super::service::FileService;
use crate::context::RequestContext;

/// Groups an owner's live files by identical content and clears out copies.
#[derive(Debug, Clone)]
pub struct DuplicateIndex {
    file_repo: Arc<FileRepository>,
    files: Arc<FileService>,
}

impl DuplicateIndex {
    /// Creates a new duplicate index.
    pub fn new(file_repo: Arc<FileRepository>, files: Arc<FileService>) -> Self {
        Self { file_repo, files }
    }

    /// Every content hash shared by two or more of the caller's live files.
    pub async fn groups(&self, ctx: &RequestContext) -> Result<Vec<DuplicateGroup>, AppError> {
        let files = self.file_repo.find_duplicated(ctx.user_id).await?;
        Ok(group_by_hash(files))
    }

    /// Soft-delete each listed file independently.
    ///
    /// One failure never stops the rest. Repeated ids are processed once.
    pub async fn bulk_delete(
        &self,
        ctx: &RequestContext,
        file_ids: &[Uuid],
    ) -> Result<BulkDeleteReport, AppError> {
        let mut seen = HashSet::new();
        let mut report = BulkDeleteReport::default();

        for &file_id in file_ids {
            if !seen.insert(file_id) {
                continue;
            }
            match self.files.soft_delete(ctx, file_id).await {
                Ok(released) => {
                    report.deleted.push(file_id);
                    report.bytes_freed += released;
                }
                Err(e) => report.failed.push(BulkDeleteFailure {
                    file_id,
                    reason: e.message,
                }),
            }
        }

        info!(
            user_id = %ctx.user_id,
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            bytes_freed = report.bytes_freed,
            "Bulk duplicate deletion finished"
        );
        Ok(report)
    }
}

/// Split files already ordered by hash into groups of two or more.
fn group_by_hash(files: Vec<File>) -> Vec<DuplicateGroup> {
    let mut groups = Vec::new();
    let mut current: Vec<File> = Vec::new();

    for file in files {
        if current
            .last()
            .is_some_and(|prev| prev.content_hash != file.content_hash)
        {
            let batch = std::mem::take(&mut current);
            groups.extend(DuplicateGroup::from_files(batch[0].content_hash.clone(), batch));
        }
        current.push(file);
    }
    if let Some(first) = current.first() {
        let hash = first.content_hash.clone();
        groups.extend(DuplicateGroup::from_files(hash, current));
    }
    groups
}
