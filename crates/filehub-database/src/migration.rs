//! Schema migrations embedded from the workspace `migrations/` directory.

use sqlx::migrate::Migrator;
use tracing::info;

use filehub_core::error::{AppError, ErrorKind};

use crate::connection::DatabasePool;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Bring the schema up to date. Applied migrations are skipped.
pub async fn run_migrations(db: &DatabasePool) -> Result<(), AppError> {
    MIGRATOR.run(db.pool()).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Schema migration failed: {e}"),
            e,
        )
    })?;

    let schema_version = MIGRATOR.iter().map(|m| m.version).max().unwrap_or_default();
    info!(
        migrations = MIGRATOR.iter().count(),
        schema_version, "Schema up to date"
    );
    Ok(())
}
