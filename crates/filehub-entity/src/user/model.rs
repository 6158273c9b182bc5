//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;
use crate::storage::StorageQuota;

/// An account as seen by the storage engine.
///
/// Accounts are provisioned by the external auth service; this engine only
/// maintains the quota counters.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// User role.
    pub role: UserRole,
    /// Maximum bytes the user may store.
    pub storage_quota_bytes: i64,
    /// Bytes currently charged to the user. Authoritative.
    pub storage_used_bytes: i64,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Current quota figures for this user.
    pub fn quota(&self) -> StorageQuota {
        StorageQuota::new(self.storage_quota_bytes, self.storage_used_bytes)
    }

    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
