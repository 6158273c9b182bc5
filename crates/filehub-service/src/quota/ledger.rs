//! The quota ledger: the authoritative bytes-used counter per user.
//!
//! Adjustments are a single `used = used + delta` statement evaluated by the
//! store and always run inside the transaction that creates or removes the
//! rows they account for. A charge that lands over quota is reported with
//! `ok = false` and the caller rolls the whole transaction back.

use std::sync::Arc;

use tracing::error;
use uuid::Uuid;

use filehub_core::error::AppError;
use filehub_core::result::AppResult;
use filehub_database::DbConnection;
use filehub_database::repositories::UserRepository;
use filehub_entity::storage::StorageQuota;

/// Outcome of a ledger adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaAdjustment {
    /// `false` iff a positive delta pushed usage past the quota.
    pub ok: bool,
    /// Counter value after the adjustment.
    pub new_used: i64,
}

/// Reads and adjusts per-user storage counters.
#[derive(Debug, Clone)]
pub struct QuotaLedger {
    user_repo: Arc<UserRepository>,
}

impl QuotaLedger {
    /// Creates a new ledger.
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Apply `delta_bytes` to the user's counter inside `conn`'s transaction.
    ///
    /// Negative deltas always succeed. A counter that would go negative is an
    /// accounting fault: it is logged as such and reset to zero.
    pub async fn adjust(
        &self,
        conn: &mut DbConnection,
        user_id: Uuid,
        delta_bytes: i64,
    ) -> AppResult<QuotaAdjustment> {
        let row = self
            .user_repo
            .adjust_used(conn, user_id, delta_bytes)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        if delta_bytes > 0 && row.storage_used_bytes > row.storage_quota_bytes {
            return Ok(QuotaAdjustment {
                ok: false,
                new_used: row.storage_used_bytes,
            });
        }

        if row.storage_used_bytes < 0 {
            error!(
                user_id = %user_id,
                delta_bytes,
                used_bytes = row.storage_used_bytes,
                kind = %filehub_core::ErrorKind::DataIntegrity,
                "Storage ledger went negative; resetting to zero"
            );
            self.user_repo.clamp_used(conn, user_id).await?;
            return Ok(QuotaAdjustment {
                ok: true,
                new_used: 0,
            });
        }

        Ok(QuotaAdjustment {
            ok: true,
            new_used: row.storage_used_bytes,
        })
    }

    /// Current usage for a user.
    pub async fn usage(&self, user_id: Uuid) -> AppResult<StorageQuota> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .map(|user| user.quota())
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    /// Fail with `QuotaExceeded` if `additional_bytes` would not fit right now.
    ///
    /// A read outside any transaction. The binding check is the in-transaction
    /// [`adjust`](Self::adjust); this one only spares the backend a write that
    /// is bound to be rolled back.
    pub async fn ensure_headroom(&self, user_id: Uuid, additional_bytes: i64) -> AppResult<()> {
        let quota = self.usage(user_id).await?;
        if quota.would_exceed(additional_bytes) {
            return Err(exceeded(&quota, additional_bytes));
        }
        Ok(())
    }
}

/// The error reported when a charge does not fit.
pub(crate) fn exceeded(quota: &StorageQuota, additional_bytes: i64) -> AppError {
    AppError::quota_exceeded(format!(
        "Storage quota exceeded: {additional_bytes} bytes requested, {} of {} bytes available",
        quota.available_bytes, quota.total_bytes
    ))
}
