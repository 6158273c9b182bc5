//! Admin handlers: on-demand maintenance.

use axum::Json;
use axum::extract::{Path, State};

use filehub_core::error::AppError;
use filehub_service::maintenance::MaintenanceJob;

use crate::dto::ApiResponse;
use crate::dto::response::MaintenanceResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/admin/maintenance/{job}
pub async fn run_maintenance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(job): Path<String>,
) -> ApiResult<Json<ApiResponse<MaintenanceResponse>>> {
    auth.require_admin()?;
    let job: MaintenanceJob = job.parse()?;

    tracing::info!(user_id = %auth.user_id, job = %job, "Maintenance triggered by admin");
    let report = state.jobs.run(job).await?;

    let report = report
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| AppError::internal(format!("Report serialization failed: {e}")))?;

    Ok(Json(ApiResponse::ok(MaintenanceResponse {
        job: job.to_string(),
        ran: report.is_some(),
        report,
    })))
}
