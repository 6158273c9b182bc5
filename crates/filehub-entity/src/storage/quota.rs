//! Storage quota value object.

use serde::{Deserialize, Serialize};

/// A user's quota figures at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageQuota {
    /// Total quota in bytes.
    pub total_bytes: i64,
    /// Currently used bytes.
    pub used_bytes: i64,
    /// Bytes left before the quota is reached (never negative).
    pub available_bytes: i64,
    /// Usage percentage (may exceed 100 after a concurrent over-admit).
    pub usage_percent: f64,
}

impl StorageQuota {
    /// Create a quota from total and used values.
    pub fn new(total_bytes: i64, used_bytes: i64) -> Self {
        let available_bytes = (total_bytes - used_bytes).max(0);
        let usage_percent = if total_bytes <= 0 {
            0.0
        } else {
            (used_bytes as f64 / total_bytes as f64) * 100.0
        };

        Self {
            total_bytes,
            used_bytes,
            available_bytes,
            usage_percent,
        }
    }

    /// Check if adding the given number of bytes would exceed the quota.
    ///
    /// Releases never exceed.
    pub fn would_exceed(&self, additional_bytes: i64) -> bool {
        additional_bytes > 0 && self.used_bytes.saturating_add(additional_bytes) > self.total_bytes
    }
}
