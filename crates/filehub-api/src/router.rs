//! Route definitions for the FileHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Slack on top of the upload limit for multipart framing.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.config.storage.max_upload_size_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let api_routes = Router::new()
        .merge(file_routes())
        .merge(folder_routes())
        .merge(share_routes())
        .merge(user_routes())
        .merge(admin_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state.config.server);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// File upload, download, versions, rename, move, delete, duplicates
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/files/upload", post(handlers::file::upload_file))
        .route("/files/duplicates", get(handlers::file::list_duplicates))
        .route(
            "/files/duplicates/delete",
            post(handlers::file::delete_duplicates),
        )
        .route(
            "/files/{id}",
            get(handlers::file::get_file).delete(handlers::file::delete_file),
        )
        .route("/files/{id}/purge", delete(handlers::file::purge_file))
        .route("/files/{id}/download", get(handlers::file::download_file))
        .route(
            "/files/{id}/versions",
            get(handlers::file::list_versions).post(handlers::file::upload_version),
        )
        .route("/files/{id}/rename", put(handlers::file::rename_file))
        .route("/files/{id}/move", put(handlers::file::move_file))
}

/// Folder CRUD, contents, breadcrumb
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/folders", post(handlers::folder::create_folder))
        .route("/folders/contents", get(handlers::folder::root_contents))
        .route("/folders/{id}", delete(handlers::folder::delete_folder))
        .route("/folders/{id}/rename", put(handlers::folder::rename_folder))
        .route("/folders/{id}/move", put(handlers::folder::move_folder))
        .route(
            "/folders/{id}/contents",
            get(handlers::folder::folder_contents),
        )
        .route(
            "/folders/{id}/breadcrumb",
            get(handlers::folder::breadcrumb),
        )
}

/// Share management and public access
fn share_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/shares",
            get(handlers::share::list_shares).post(handlers::share::create_share),
        )
        .route("/shares/{id}", delete(handlers::share::revoke_share))
        .route("/shares/public/{token}", get(handlers::share::view_public))
        .route(
            "/shares/public/{token}/download",
            get(handlers::share::download_public),
        )
}

/// User self-service endpoints
fn user_routes() -> Router<AppState> {
    Router::new().route("/users/me/quota", get(handlers::user::get_quota))
}

/// Admin-only endpoints
fn admin_routes() -> Router<AppState> {
    Router::new().route(
        "/admin/maintenance/{job}",
        post(handlers::admin::run_maintenance),
    )
}

/// Health check endpoint (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
