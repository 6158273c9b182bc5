//! File upload, download, versions, rename, move, delete, and duplicate handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use uuid::Uuid;

use filehub_entity::file::{BulkDeleteReport, DuplicateGroup, File, FileVersion};
use filehub_service::file::{UploadParams, VersionParams};

use super::download::download_response;
use crate::dto::request::{BulkDeleteRequest, MoveFileRequest, RenameRequest};
use crate::dto::response::{DeleteResponse, MessageResponse};
use crate::dto::{ApiResponse, validate};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, UploadForm};
use crate::state::AppState;

/// POST /api/files/upload
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    form: UploadForm,
) -> ApiResult<(StatusCode, Json<ApiResponse<File>>)> {
    let file = state
        .services
        .uploads
        .upload(
            &auth,
            UploadParams {
                folder_id: form.folder_id,
                file_name: form.file_name,
                content_type: form.content_type,
                data: form.data,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(file))))
}

/// POST /api/files/{id}/versions
pub async fn upload_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    form: UploadForm,
) -> ApiResult<Json<ApiResponse<File>>> {
    let file = state
        .services
        .uploads
        .upload_version(
            &auth,
            id,
            VersionParams {
                content_type: form.content_type,
                data: form.data,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(file)))
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<File>>> {
    let file = state.services.files.get_file(&auth, id).await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// GET /api/files/{id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<FileVersion>>>> {
    let versions = state.services.files.list_versions(&auth, id).await?;
    Ok(Json(ApiResponse::ok(versions)))
}

/// GET /api/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let download = state.services.downloads.resolve(&auth, id).await?;
    download_response(download)
}

/// PUT /api/files/{id}/rename
pub async fn rename_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameRequest>,
) -> ApiResult<Json<ApiResponse<File>>> {
    validate(&req)?;
    let file = state.services.files.rename(&auth, id, &req.name).await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// PUT /api/files/{id}/move
pub async fn move_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveFileRequest>,
) -> ApiResult<Json<ApiResponse<File>>> {
    let file = state
        .services
        .files
        .move_file(&auth, id, req.folder_id)
        .await?;
    Ok(Json(ApiResponse::ok(file)))
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<DeleteResponse>>> {
    let bytes_released = state.services.files.soft_delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(DeleteResponse { bytes_released })))
}

/// DELETE /api/files/{id}/purge
pub async fn purge_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.services.files.purge(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("File purged"))))
}

/// GET /api/files/duplicates
pub async fn list_duplicates(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<DuplicateGroup>>>> {
    let groups = state.services.duplicates.groups(&auth).await?;
    Ok(Json(ApiResponse::ok(groups)))
}

/// POST /api/files/duplicates/delete
pub async fn delete_duplicates(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<BulkDeleteRequest>,
) -> ApiResult<Json<ApiResponse<BulkDeleteReport>>> {
    validate(&req)?;
    let report = state
        .services
        .duplicates
        .bulk_delete(&auth, &req.file_ids)
        .await?;
    Ok(Json(ApiResponse::ok(report)))
}
