//! Mapping of sqlx errors into the application taxonomy.

use filehub_core::error::{AppError, ErrorKind};

/// SQLite result codes meaning another writer holds the lock.
const BUSY_CODES: &[&str] = &["5", "6", "261", "262", "517"];

/// Build a `map_err` closure that classifies a sqlx error.
///
/// Unique violations become `Conflict`. A lost race for the write lock also
/// becomes `Conflict`, with a message telling the caller to retry. Missing
/// rows become `NotFound`. Everything else is a `Database` error.
pub fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| classify(context, e)
}

fn classify(context: &str, e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::RowNotFound => AppError::with_source(ErrorKind::NotFound, context, e),
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::with_source(
            ErrorKind::Conflict,
            format!("{context}: already exists"),
            e,
        ),
        sqlx::Error::Database(db)
            if db.code().is_some_and(|code| BUSY_CODES.contains(&code.as_ref())) =>
        {
            AppError::with_source(
                ErrorKind::Conflict,
                format!("{context}: concurrent modification, retry the request"),
                e,
            )
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}

