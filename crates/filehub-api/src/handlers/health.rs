//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::ApiResponse;
use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health (no auth required)
///
/// Responds 503 when either the database or the storage backend is down.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database_ok = state.db.health_check().await.unwrap_or(false);
    let storage_ok = match state.storage.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(error = %e, "Storage health check failed");
            false
        }
    };

    let status = if database_ok && storage_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthResponse {
        status: if status == StatusCode::OK { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: up_or_down(database_ok),
        storage: up_or_down(storage_ok),
        storage_backend: state.storage.backend_type().to_string(),
    };

    (status, Json(ApiResponse::ok(body)))
}

fn up_or_down(ok: bool) -> String {
    let state = if ok { "up" } else { "down" };
    state.to_string()
}
