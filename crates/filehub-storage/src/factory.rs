//! Backend selection at startup.

use std::sync::Arc;

use tracing::info;

use filehub_core::config::{StorageBackendKind, StorageConfig};
use filehub_core::result::AppResult;
use filehub_core::traits::storage::StorageBackend;

use crate::providers::LocalStorageBackend;
use crate::resilient::{ResilientBackend, RetryPolicy};

/// Build the configured backend, wrapped with timeouts and retries.
pub async fn build_backend(config: &StorageConfig) -> AppResult<Arc<dyn StorageBackend>> {
    let inner: Arc<dyn StorageBackend> = match config.backend {
        StorageBackendKind::Local => {
            Arc::new(LocalStorageBackend::new(&config.local.root_path).await?)
        }
        StorageBackendKind::S3 => build_s3(config).await?,
    };

    let policy = RetryPolicy::from_config(config);
    info!(
        backend = inner.backend_type(),
        timeout_secs = policy.timeout.as_secs(),
        retry_attempts = policy.attempts,
        "Storage backend ready"
    );
    Ok(Arc::new(ResilientBackend::new(inner, policy)))
}

#[cfg(feature = "s3")]
async fn build_s3(config: &StorageConfig) -> AppResult<Arc<dyn StorageBackend>> {
    let backend = crate::providers::S3StorageBackend::new(&config.s3).await?;
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "s3"))]
async fn build_s3(_config: &StorageConfig) -> AppResult<Arc<dyn StorageBackend>> {
    Err(filehub_core::AppError::configuration(
        "storage.backend = \"s3\" requires the `s3` feature",
    ))
}
