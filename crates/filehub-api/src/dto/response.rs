//! Response DTOs.

use serde::{Deserialize, Serialize};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Wrap a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Bytes returned to the owner by a soft delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Bytes released from the quota.
    pub bytes_released: i64,
}

/// Result of an on-demand maintenance trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceResponse {
    /// Job name.
    pub job: String,
    /// Whether the job ran; false when a previous run was still going.
    pub ran: bool,
    /// The job report, when it ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<serde_json::Value>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: "ok" or "degraded".
    pub status: String,
    /// Version.
    pub version: String,
    /// Database status.
    pub database: String,
    /// Storage backend status.
    pub storage: String,
    /// Storage backend type.
    pub storage_backend: String,
}
