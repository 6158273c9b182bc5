//! Application state shared across all handlers.

use std::sync::Arc;

use filehub_auth::JwtDecoder;
use filehub_core::config::AppConfig;
use filehub_core::traits::StorageBackend;
use filehub_database::DatabasePool;
use filehub_service::Services;
use filehub_worker::JobRunner;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// SQLite connection pool
    pub db: DatabasePool,
    /// The storage backend selected at startup
    pub storage: Arc<dyn StorageBackend>,

    // ── Auth ─────────────────────────────────────────────────
    /// Access token verifier
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// The service graph
    pub services: Services,
    /// Maintenance runner shared with the cron scheduler
    pub jobs: Arc<JobRunner>,
}
