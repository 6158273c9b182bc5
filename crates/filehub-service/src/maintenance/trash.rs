//! Permanent removal of files that have sat in the trash too long.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use filehub_core::error::AppError;
use filehub_database::repositories::FileRepository;

use crate::file::FileService;

/// Outcome of one trash purge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashPurgeReport {
    /// Trashed files past the retention period.
    pub expired: u64,
    /// Files purged.
    pub purged: u64,
    /// Purges that failed and will be retried on the next run.
    pub failures: u64,
}

/// Purges files soft-deleted longer ago than the retention period.
#[derive(Debug, Clone)]
pub struct TrashPurger {
    file_repo: Arc<FileRepository>,
    files: Arc<FileService>,
    retention: Duration,
}

impl TrashPurger {
    /// Creates a new purger.
    pub fn new(file_repo: Arc<FileRepository>, files: Arc<FileService>, retention: Duration) -> Self {
        Self {
            file_repo,
            files,
            retention,
        }
    }

    /// Purge every expired file once.
    pub async fn run(&self) -> Result<TrashPurgeReport, AppError> {
        let cutoff = Utc::now() - self.retention;
        let mut report = TrashPurgeReport::default();

        let expired = self
            .file_repo
            .find_trashed()
            .await?
            .into_iter()
            .filter(|f| f.deleted_at.is_some_and(|at| at <= cutoff));

        for file in expired {
            report.expired += 1;
            match self.files.purge_owned(file.owner_id, file.id).await {
                Ok(()) => report.purged += 1,
                Err(e) => {
                    warn!(file_id = %file.id, error = %e, "Failed to purge trashed file");
                    report.failures += 1;
                }
            }
        }

        info!(
            expired = report.expired,
            purged = report.purged,
            failures = report.failures,
            "Trash purge finished"
        );
        Ok(report)
    }
}
