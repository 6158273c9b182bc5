//! Share management and public access handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use uuid::Uuid;

use filehub_entity::share::{PublicShareView, Share, ShareLink};

use super::download::download_response;
use crate::dto::request::{CreateShareBody, ShareAccessQuery};
use crate::dto::{ApiResponse, validate};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/shares
pub async fn list_shares(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<ShareLink>>>> {
    let shares = state.services.shares.list_shares(&auth).await?;
    Ok(Json(ApiResponse::ok(shares)))
}

/// POST /api/shares
pub async fn create_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateShareBody>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ShareLink>>)> {
    validate(&req)?;
    let link = state.services.shares.create_share(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(link))))
}

/// DELETE /api/shares/{id}
pub async fn revoke_share(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Share>>> {
    let share = state.services.shares.revoke(&auth, id).await?;
    Ok(Json(ApiResponse::ok(share)))
}

/// GET /api/shares/public/{token} (no auth required)
pub async fn view_public(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<ShareAccessQuery>,
) -> ApiResult<Json<ApiResponse<PublicShareView>>> {
    let view = state
        .services
        .access
        .view(&token, query.password.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// GET /api/shares/public/{token}/download (no auth required)
pub async fn download_public(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<ShareAccessQuery>,
) -> ApiResult<Response> {
    let download = state
        .services
        .access
        .download(&token, query.password.as_deref())
        .await?;
    download_response(download)
}
