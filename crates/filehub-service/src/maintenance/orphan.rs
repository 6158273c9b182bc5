//! Removal of stored bytes that no row references.
//!
//! Orphans come from uploads whose commit failed after the bytes were
//! written, and from compensating deletes that themselves failed.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use filehub_core::error::AppError;
use filehub_core::traits::{StorageBackend, StorageObjectMeta};
use filehub_database::repositories::{FileRepository, UserRepository};

/// Outcome of one orphan sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanSweepReport {
    /// Owners whose objects were listed.
    pub owners_scanned: u64,
    /// Objects examined.
    pub objects_scanned: u64,
    /// Unreferenced objects removed.
    pub orphans_deleted: u64,
    /// Bytes those objects held.
    pub bytes_reclaimed: u64,
    /// Listings or deletes that failed and were skipped.
    pub failures: u64,
}

/// Deletes backend objects older than a grace period that no file or
/// version row references.
#[derive(Debug, Clone)]
pub struct OrphanSweeper {
    user_repo: Arc<UserRepository>,
    file_repo: Arc<FileRepository>,
    storage: Arc<dyn StorageBackend>,
    grace: Duration,
}

impl OrphanSweeper {
    /// Creates a new sweeper.
    ///
    /// Objects younger than `grace` are left alone: their upload may still
    /// be about to commit.
    pub fn new(
        user_repo: Arc<UserRepository>,
        file_repo: Arc<FileRepository>,
        storage: Arc<dyn StorageBackend>,
        grace: Duration,
    ) -> Self {
        Self {
            user_repo,
            file_repo,
            storage,
            grace,
        }
    }

    /// Sweep every owner once.
    pub async fn run(&self) -> Result<OrphanSweepReport, AppError> {
        let cutoff = Utc::now() - self.grace;
        let mut report = OrphanSweepReport::default();

        for owner_id in self.user_repo.list_ids().await? {
            let objects = match self.storage.list(owner_id).await {
                Ok(objects) => objects,
                Err(e) => {
                    warn!(user_id = %owner_id, error = %e, "Failed to list stored objects");
                    report.failures += 1;
                    continue;
                }
            };
            report.owners_scanned += 1;
            report.objects_scanned += objects.len() as u64;

            let referenced = self.file_repo.referenced_keys(owner_id).await?;
            for object in objects
                .iter()
                .filter(|o| !referenced.contains(&o.key) && is_stale(o, cutoff))
            {
                // An upload may have committed since the snapshot above.
                if self.file_repo.is_key_referenced(&object.key).await? {
                    continue;
                }
                match self.storage.delete(&object.key).await {
                    Ok(()) => {
                        info!(
                            user_id = %owner_id,
                            storage_key = %object.key,
                            bytes = object.size_bytes,
                            "Deleted orphaned object"
                        );
                        report.orphans_deleted += 1;
                        report.bytes_reclaimed += object.size_bytes;
                    }
                    Err(e) => {
                        warn!(
                            storage_key = %object.key,
                            error = %e,
                            "Failed to delete orphaned object"
                        );
                        report.failures += 1;
                    }
                }
            }
        }

        info!(
            owners = report.owners_scanned,
            objects = report.objects_scanned,
            deleted = report.orphans_deleted,
            bytes = report.bytes_reclaimed,
            failures = report.failures,
            "Orphan sweep finished"
        );
        Ok(report)
    }
}

/// Objects without a modification time are never treated as stale.
fn is_stale(object: &StorageObjectMeta, cutoff: chrono::DateTime<Utc>) -> bool {
    object.last_modified.is_some_and(|modified| modified < cutoff)
}
