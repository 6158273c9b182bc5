//! User self-service handlers.

use axum::Json;
use axum::extract::State;

use filehub_entity::storage::StorageQuota;

use crate::dto::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users/me/quota
pub async fn get_quota(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<StorageQuota>>> {
    let quota = state.services.ledger.usage(auth.user_id).await?;
    Ok(Json(ApiResponse::ok(quota)))
}
