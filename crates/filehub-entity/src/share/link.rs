//! Share link value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::Share;

/// A created share together with its public URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLink {
    /// The share row.
    pub share: Share,
    /// The full URL for accessing the share.
    pub url: String,
    /// Whether the link is password-protected.
    pub is_password_protected: bool,
}

/// What an anonymous visitor sees for a valid token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicShareView {
    /// The share ID.
    pub share_id: Uuid,
    /// Shared file name.
    pub file_name: String,
    /// Shared file MIME type.
    pub mime_type: String,
    /// Shared file size.
    pub size_bytes: i64,
    /// When the link expires (if set).
    pub expires_at: Option<DateTime<Utc>>,
    /// Downloads left, if limited.
    pub remaining_downloads: Option<i64>,
}
