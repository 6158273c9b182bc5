//! Maintenance jobs: orphan sweep, trash purge, ledger audit.
//!
//! Run on a schedule by the worker and on demand by administrators.

pub mod audit;
pub mod orphan;
pub mod trash;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use filehub_core::error::AppError;

pub use audit::{QuotaAuditReport, QuotaAuditor, QuotaDrift};
pub use orphan::{OrphanSweepReport, OrphanSweeper};
pub use trash::{TrashPurgeReport, TrashPurger};

/// The maintenance jobs, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceJob {
    /// Delete unreferenced stored bytes.
    OrphanSweep,
    /// Purge files trashed longer than the retention period.
    TrashPurge,
    /// Compare ledger counters with live file sizes.
    QuotaAudit,
}

impl MaintenanceJob {
    /// Every job.
    pub const ALL: [MaintenanceJob; 3] = [Self::OrphanSweep, Self::TrashPurge, Self::QuotaAudit];

    /// Name used in routes, config, and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrphanSweep => "orphan_sweep",
            Self::TrashPurge => "trash_purge",
            Self::QuotaAudit => "quota_audit",
        }
    }
}

impl fmt::Display for MaintenanceJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaintenanceJob {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "orphan_sweep" => Ok(Self::OrphanSweep),
            "trash_purge" => Ok(Self::TrashPurge),
            "quota_audit" => Ok(Self::QuotaAudit),
            other => Err(AppError::not_found(format!(
                "Unknown maintenance job '{other}'"
            ))),
        }
    }
}

/// The result of running one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum MaintenanceReport {
    /// Orphan sweep outcome.
    OrphanSweep(OrphanSweepReport),
    /// Trash purge outcome.
    TrashPurge(TrashPurgeReport),
    /// Ledger audit outcome.
    QuotaAudit(QuotaAuditReport),
}

/// Runs maintenance jobs by name.
#[derive(Debug, Clone)]
pub struct Maintenance {
    orphans: OrphanSweeper,
    trash: TrashPurger,
    audit: QuotaAuditor,
}

impl Maintenance {
    /// Creates a runner over the three jobs.
    pub fn new(orphans: OrphanSweeper, trash: TrashPurger, audit: QuotaAuditor) -> Self {
        Self {
            orphans,
            trash,
            audit,
        }
    }

    /// Run one job to completion.
    pub async fn run(&self, job: MaintenanceJob) -> Result<MaintenanceReport, AppError> {
        Ok(match job {
            MaintenanceJob::OrphanSweep => MaintenanceReport::OrphanSweep(self.orphans.run().await?),
            MaintenanceJob::TrashPurge => MaintenanceReport::TrashPurge(self.trash.run().await?),
            MaintenanceJob::QuotaAudit => MaintenanceReport::QuotaAudit(self.audit.run().await?),
        })
    }
}
