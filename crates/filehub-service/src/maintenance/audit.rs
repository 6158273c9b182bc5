//! Ledger audit: stored counters against the live bytes they account for.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use filehub_core::error::{AppError, ErrorKind};
use filehub_database::repositories::UserRepository;

/// One user whose counter disagrees with their live files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaDrift {
    /// The user.
    pub user_id: Uuid,
    /// Value of the stored counter.
    pub recorded_bytes: i64,
    /// Sum of the user's live file sizes.
    pub actual_bytes: i64,
}

/// Outcome of one ledger audit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaAuditReport {
    /// Users compared.
    pub users_checked: u64,
    /// Users whose counter drifted.
    pub drifted: Vec<QuotaDrift>,
}

/// Reports drift between the ledger and the rows. Never repairs it.
#[derive(Debug, Clone)]
pub struct QuotaAuditor {
    user_repo: Arc<UserRepository>,
}

impl QuotaAuditor {
    /// Creates a new auditor.
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Audit every user once.
    pub async fn run(&self) -> Result<QuotaAuditReport, AppError> {
        let rows = self.user_repo.audit_usage().await?;
        let mut report = QuotaAuditReport {
            users_checked: rows.len() as u64,
            drifted: Vec::new(),
        };

        for row in rows.into_iter().filter(|r| r.recorded_bytes != r.actual_bytes) {
            error!(
                user_id = %row.user_id,
                recorded_bytes = row.recorded_bytes,
                actual_bytes = row.actual_bytes,
                kind = %ErrorKind::DataIntegrity,
                "Storage ledger drifted from live file sizes"
            );
            report.drifted.push(QuotaDrift {
                user_id: row.user_id,
                recorded_bytes: row.recorded_bytes,
                actual_bytes: row.actual_bytes,
            });
        }

        info!(
            users = report.users_checked,
            drifted = report.drifted.len(),
            "Quota audit finished"
        );
        Ok(report)
    }
}
