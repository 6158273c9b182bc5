//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use filehub_core::error::{AppError, DenialReason, ErrorKind};

/// Result type returned by handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Whether the same request may succeed if sent again.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

/// An `AppError` on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status and machine code for an error kind.
    pub fn status_and_code(kind: &ErrorKind) -> (StatusCode, &'static str) {
        match kind {
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::Conflict => (StatusCode::BAD_REQUEST, "CONFLICT"),
            ErrorKind::QuotaExceeded => (StatusCode::BAD_REQUEST, "QUOTA_EXCEEDED"),
            ErrorKind::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ErrorKind::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ErrorKind::Denied(reason) => {
                let status = match reason {
                    DenialReason::NotFound => StatusCode::NOT_FOUND,
                    DenialReason::PasswordRequired | DenialReason::PasswordIncorrect => {
                        StatusCode::UNAUTHORIZED
                    }
                    DenialReason::Revoked | DenialReason::Expired | DenialReason::Exhausted => {
                        StatusCode::FORBIDDEN
                    }
                };
                (status, reason.code())
            }
            ErrorKind::BackendUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "BACKEND_UNAVAILABLE")
            }
            ErrorKind::TokenGenerationFailed => {
                (StatusCode::INTERNAL_SERVER_ERROR, "TOKEN_GENERATION_FAILED")
            }
            ErrorKind::DataIntegrity
            | ErrorKind::Database
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, error_code) = Self::status_and_code(&err.kind);

        let message = if status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::warn!(error = %err, "Storage backend unavailable");
            "Storage is temporarily unavailable, try again".to_string()
        } else if status.is_server_error() {
            tracing::error!(kind = %err.kind, error = %err, "Internal server error");
            "An internal error occurred".to_string()
        } else {
            err.message
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message,
            retryable: err.kind.is_retryable(),
        };

        (status, Json(body)).into_response()
    }
}
