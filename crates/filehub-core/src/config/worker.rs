//! Background maintenance configuration.

use serde::{Deserialize, Serialize};

/// Cron schedules and thresholds for the maintenance jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler is started.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Schedule for the orphaned-bytes sweep.
    #[serde(default = "default_orphan_sweep_cron")]
    pub orphan_sweep_cron: String,
    /// Objects younger than this are never treated as orphans.
    #[serde(default = "default_orphan_grace")]
    pub orphan_grace_minutes: i64,
    /// Schedule for purging expired trash.
    #[serde(default = "default_trash_purge_cron")]
    pub trash_purge_cron: String,
    /// Soft-deleted files older than this are purged.
    #[serde(default = "default_trash_retention")]
    pub trash_retention_days: i64,
    /// Schedule for the quota ledger audit.
    #[serde(default = "default_quota_audit_cron")]
    pub quota_audit_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            orphan_sweep_cron: default_orphan_sweep_cron(),
            orphan_grace_minutes: default_orphan_grace(),
            trash_purge_cron: default_trash_purge_cron(),
            trash_retention_days: default_trash_retention(),
            quota_audit_cron: default_quota_audit_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_orphan_sweep_cron() -> String {
    "0 30 3 * * *".to_string()
}

fn default_orphan_grace() -> i64 {
    60
}

fn default_trash_purge_cron() -> String {
    "0 0 4 * * *".to_string()
}

fn default_trash_retention() -> i64 {
    30
}

fn default_quota_audit_cron() -> String {
    "0 0 */6 * * *".to_string()
}
