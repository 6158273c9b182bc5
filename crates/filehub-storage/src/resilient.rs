//! Timeout and retry wrapper around a storage backend.
//!
//! Every call is bounded by the operation timeout; an elapsed timer is
//! reported as `BackendUnavailable`. Reads and deletes are idempotent and
//! are retried on retryable errors. Writes are never retried, since a
//! timed-out `put` may still land and a retry would orphan a second object.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::warn;
use uuid::Uuid;

use filehub_core::config::StorageConfig;
use filehub_core::error::AppError;
use filehub_core::result::AppResult;
use filehub_core::traits::storage::{ByteStream, StorageBackend, StorageObjectMeta};

/// How often and how patiently idempotent calls are retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub attempts: u32,
    /// Base delay, multiplied by the retry number.
    pub backoff: Duration,
    /// Upper bound for a single attempt.
    pub timeout: Duration,
}

impl RetryPolicy {
    /// Build the policy from storage configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            attempts: config.retry_attempts,
            backoff: Duration::from_millis(config.retry_backoff_ms),
            timeout: Duration::from_secs(config.operation_timeout_seconds),
        }
    }
}

/// A storage backend with per-call timeouts and bounded retries.
#[derive(Debug, Clone)]
pub struct ResilientBackend {
    inner: Arc<dyn StorageBackend>,
    policy: RetryPolicy,
}

impl ResilientBackend {
    /// Wrap a backend.
    pub fn new(inner: Arc<dyn StorageBackend>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn bounded<T, Fut>(&self, op: &'static str, fut: Fut) -> AppResult<T>
    where
        Fut: Future<Output = AppResult<T>>,
    {
        match tokio::time::timeout(self.policy.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::backend_unavailable(format!(
                "Storage {op} timed out after {}s",
                self.policy.timeout.as_secs_f64()
            ))),
        }
    }

    async fn retried<T, F, Fut>(&self, op: &'static str, key: &str, call: F) -> AppResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match self.bounded(op, call()).await {
                Err(e) if e.kind.is_retryable() && attempt < self.policy.attempts => {
                    attempt += 1;
                    warn!(
                        backend = self.inner.backend_type(),
                        op,
                        storage_key = key,
                        attempt,
                        error = %e,
                        "Retrying storage call"
                    );
                    tokio::time::sleep(self.policy.backoff * attempt).await;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl StorageBackend for ResilientBackend {
    fn backend_type(&self) -> &str {
        self.inner.backend_type()
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.bounded("health_check", self.inner.health_check()).await
    }

    async fn put(&self, owner_id: Uuid, content: Bytes, content_type: &str) -> AppResult<String> {
        self.bounded("put", self.inner.put(owner_id, content, content_type))
            .await
    }

    async fn get(&self, storage_key: &str) -> AppResult<Bytes> {
        let inner = &self.inner;
        self.retried("get", storage_key, move || inner.get(storage_key))
            .await
    }

    async fn get_stream(&self, storage_key: &str) -> AppResult<ByteStream> {
        let inner = &self.inner;
        self.retried("get_stream", storage_key, move || inner.get_stream(storage_key))
            .await
    }

    async fn delete(&self, storage_key: &str) -> AppResult<()> {
        let inner = &self.inner;
        self.retried("delete", storage_key, move || inner.delete(storage_key))
            .await
    }

    async fn move_object(&self, from: &str, to: &str) -> AppResult<()> {
        self.bounded("move", self.inner.move_object(from, to)).await
    }

    async fn signed_url(&self, storage_key: &str, ttl: Duration) -> AppResult<Option<String>> {
        self.bounded("signed_url", self.inner.signed_url(storage_key, ttl))
            .await
    }

    async fn list(&self, owner_id: Uuid) -> AppResult<Vec<StorageObjectMeta>> {
        self.bounded("list", self.inner.list(owner_id)).await
    }
}
