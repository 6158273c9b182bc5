//! Folder CRUD, contents, and breadcrumb handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use filehub_entity::folder::{BreadcrumbEntry, Folder, FolderContents};
use filehub_service::folder::FolderDeleteReport;

use crate::dto::request::{CreateFolderRequest, MoveFolderRequest, RenameRequest};
use crate::dto::{ApiResponse, validate};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateFolderRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Folder>>)> {
    validate(&req)?;
    let folder = state
        .services
        .folders
        .create(&auth, &req.name, req.parent_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(folder))))
}

/// PUT /api/folders/{id}/rename
pub async fn rename_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameRequest>,
) -> ApiResult<Json<ApiResponse<Folder>>> {
    validate(&req)?;
    let folder = state.services.folders.rename(&auth, id, &req.name).await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// PUT /api/folders/{id}/move
pub async fn move_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveFolderRequest>,
) -> ApiResult<Json<ApiResponse<Folder>>> {
    let folder = state
        .services
        .folders
        .move_folder(&auth, id, req.parent_id)
        .await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// DELETE /api/folders/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<FolderDeleteReport>>> {
    let report = state.services.folders.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// GET /api/folders/contents
pub async fn root_contents(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<FolderContents>>> {
    let contents = state.services.tree.contents(&auth, None).await?;
    Ok(Json(ApiResponse::ok(contents)))
}

/// GET /api/folders/{id}/contents
pub async fn folder_contents(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<FolderContents>>> {
    let contents = state.services.tree.contents(&auth, Some(id)).await?;
    Ok(Json(ApiResponse::ok(contents)))
}

/// GET /api/folders/{id}/breadcrumb
pub async fn breadcrumb(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<BreadcrumbEntry>>>> {
    let trail = state.services.tree.breadcrumb(&auth, id).await?;
    Ok(Json(ApiResponse::ok(trail)))
}
