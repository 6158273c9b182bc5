//! Share entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Derived access state of a share.
///
/// Never stored. Computed from the row and the current time on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareState {
    /// The link grants access (subject to its password, if any).
    Active,
    /// The owner switched the link off.
    Revoked,
    /// The expiry time has passed.
    Expired,
    /// The download limit has been reached.
    Exhausted,
}

/// A token granting anonymous access to one file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Share {
    /// Unique share identifier.
    pub id: Uuid,
    /// The shared file.
    pub file_id: Uuid,
    /// User who created the share.
    pub owner_id: Uuid,
    /// Opaque, URL-safe access token.
    pub token: String,
    /// Argon2 hash of the share password.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// When the share stops granting access.
    pub expires_at: Option<DateTime<Utc>>,
    /// Maximum number of downloads.
    pub max_downloads: Option<i64>,
    /// Downloads served so far.
    pub download_count: i64,
    /// Owner-controlled kill switch.
    pub is_active: bool,
    /// When the share was created.
    pub created_at: DateTime<Utc>,
    /// Last time the share served a download.
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl Share {
    /// Derive the share's state at `now`.
    ///
    /// Revocation wins over expiry, which wins over exhaustion.
    pub fn state_at(&self, now: DateTime<Utc>) -> ShareState {
        if !self.is_active {
            return ShareState::Revoked;
        }
        if self.expires_at.is_some_and(|expires_at| expires_at <= now) {
            return ShareState::Expired;
        }
        if self
            .max_downloads
            .is_some_and(|max| self.download_count >= max)
        {
            return ShareState::Exhausted;
        }
        ShareState::Active
    }

    /// Whether a password must be supplied.
    pub fn is_password_protected(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Downloads left before exhaustion, if limited.
    pub fn remaining_downloads(&self) -> Option<i64> {
        self.max_downloads
            .map(|max| (max - self.download_count).max(0))
    }
}

/// Data required to create a new share.
#[derive(Debug, Clone)]
pub struct CreateShare {
    /// The shared file.
    pub file_id: Uuid,
    /// User creating the share.
    pub owner_id: Uuid,
    /// Access token.
    pub token: String,
    /// Password hash, if protected.
    pub password_hash: Option<String>,
    /// Expiry time (None = never).
    pub expires_at: Option<DateTime<Utc>>,
    /// Max downloads (None = unlimited).
    pub max_downloads: Option<i64>,
}
