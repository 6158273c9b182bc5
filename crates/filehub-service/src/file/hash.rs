//! Content hashing.

use bytes::Bytes;
use sha2::{Digest, Sha256};

use filehub_core::error::AppError;

/// Lowercase hex SHA-256 of `content`, computed off the async runtime.
pub async fn content_hash(content: Bytes) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_bytes(&content))
        .await
        .map_err(|e| AppError::internal(format!("Hashing task failed: {e}")))
}

/// Lowercase hex SHA-256 of `content`.
pub fn hash_bytes(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}
