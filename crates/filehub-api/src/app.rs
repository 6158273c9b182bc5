//! Application builder: wires router + middleware + state into an Axum app, and runs it.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::Notify;

use filehub_auth::JwtDecoder;
use filehub_core::config::AppConfig;
use filehub_core::error::AppError;
use filehub_database::DatabasePool;
use filehub_database::migration::run_migrations;
use filehub_service::Services;
use filehub_worker::{JobRunner, MaintenanceScheduler};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the FileHub server with the given configuration.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting FileHub server...");

    // ── Step 1: Database + migrations ────────────────────────────
    let db = DatabasePool::connect(&config.database).await?;
    run_migrations(&db).await?;

    // ── Step 2: Storage backend ──────────────────────────────────
    let storage = filehub_storage::build_backend(&config.storage).await?;

    // ── Step 3: Services ─────────────────────────────────────────
    let services = Services::build(&db, Arc::clone(&storage), &config)?;
    let jobs = Arc::new(JobRunner::new(Arc::clone(&services.maintenance)));

    // ── Step 4: Scheduled maintenance ────────────────────────────
    let mut scheduler = if config.worker.enabled {
        let scheduler = MaintenanceScheduler::new(Arc::clone(&jobs)).await?;
        scheduler.register_jobs(&config.worker).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Maintenance worker disabled");
        None
    };

    // ── Step 5: HTTP server ──────────────────────────────────────
    let state = AppState {
        config: Arc::new(config.clone()),
        db: db.clone(),
        storage,
        jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
        services,
        jobs,
    };
    let app = build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(%addr, "FileHub server listening");

    let stop = Arc::new(Notify::new());
    let server = axum::serve(listener, app).with_graceful_shutdown({
        let stop = Arc::clone(&stop);
        async move { stop.notified().await }
    });
    let mut server = tokio::spawn(server.into_future());

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let served = tokio::select! {
        joined = &mut server => joined,
        _ = shutdown_signal() => {
            tracing::info!(grace_seconds = grace.as_secs(), "Shutdown signal received, draining requests");
            stop.notify_one();
            match tokio::time::timeout(grace, &mut server).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::warn!("Grace period elapsed with requests still open");
                    server.abort();
                    Ok(Ok(()))
                }
            }
        }
    };

    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Scheduler did not shut down cleanly");
        }
    }
    db.close().await;

    match served {
        Ok(Ok(())) => {
            tracing::info!("FileHub server stopped");
            Ok(())
        }
        Ok(Err(e)) => Err(AppError::internal(format!("Server error: {e}"))),
        Err(e) => Err(AppError::internal(format!("Server task failed: {e}"))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
