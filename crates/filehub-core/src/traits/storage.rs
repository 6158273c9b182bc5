//! Storage backend trait for pluggable byte storage.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use uuid::Uuid;

use crate::error::AppError;
use crate::result::AppResult;

/// Metadata about a stored object.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StorageObjectMeta {
    /// Storage key of the object.
    pub key: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Last modified timestamp.
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
}

/// A byte stream type used for reading file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Uniform byte storage over a local directory or an object store.
///
/// Keys are opaque to callers and always scoped under the owner id, so
/// distinct owners never collide and an owner's objects can be listed as
/// one prefix. Exactly one implementation is selected at startup.
#[async_trait]
pub trait StorageBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g., "local", "s3").
    fn backend_type(&self) -> &str;

    /// Check whether the backend is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write bytes under a freshly generated key for `owner_id` and return the key.
    async fn put(&self, owner_id: Uuid, content: Bytes, content_type: &str) -> AppResult<String>;

    /// Read an object fully into memory. Fails with `NotFound` if absent.
    async fn get(&self, storage_key: &str) -> AppResult<Bytes>;

    /// Read an object as a byte stream. Fails with `NotFound` if absent.
    async fn get_stream(&self, storage_key: &str) -> AppResult<ByteStream>;

    /// Delete an object. Deleting an absent key succeeds.
    async fn delete(&self, storage_key: &str) -> AppResult<()>;

    /// Move an object to a new key.
    ///
    /// Backends without a native move copy then delete; a failed delete
    /// leaves a duplicate, never a loss.
    async fn move_object(&self, from: &str, to: &str) -> AppResult<()>;

    /// A time-limited URL serving the object directly, when supported.
    ///
    /// Returns `None` for backends that serve bytes through the API.
    async fn signed_url(&self, storage_key: &str, ttl: Duration) -> AppResult<Option<String>>;

    /// List every object stored under `owner_id`.
    async fn list(&self, owner_id: Uuid) -> AppResult<Vec<StorageObjectMeta>>;
}

/// Generate a new storage key scoped under the owner.
pub fn generate_key(owner_id: Uuid) -> String {
    format!("{owner_id}/{}", Uuid::now_v7())
}

/// Key prefix shared by all of an owner's objects.
pub fn owner_prefix(owner_id: Uuid) -> String {
    format!("{owner_id}/")
}

/// Reject keys that are not of the form `{owner_uuid}/{object}`.
///
/// Local storage maps keys onto paths, so anything that could escape the
/// root is refused here.
pub fn validate_key(storage_key: &str) -> AppResult<()> {
    let mut parts = storage_key.split('/');
    let (Some(owner), Some(object), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AppError::validation(format!(
            "Malformed storage key '{storage_key}'"
        )));
    };
    if Uuid::parse_str(owner).is_err()
        || object.is_empty()
        || object == "."
        || object == ".."
        || object.contains('\\')
    {
        return Err(AppError::validation(format!(
            "Malformed storage key '{storage_key}'"
        )));
    }
    Ok(())
}
