//! S3-compatible object storage backend (requires the `s3` feature).

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream as S3Body;
use bytes::Bytes;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};
use uuid::Uuid;

use filehub_core::config::S3StorageConfig;
use filehub_core::error::{AppError, ErrorKind};
use filehub_core::result::AppResult;
use filehub_core::traits::storage::{
    ByteStream, StorageBackend, StorageObjectMeta, generate_key, owner_prefix, validate_key,
};

/// S3-compatible storage backend.
#[derive(Debug, Clone)]
pub struct S3StorageBackend {
    client: Client,
    bucket: String,
}

impl S3StorageBackend {
    /// Build a client from static credentials and an optional custom endpoint.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("storage.s3.bucket must be set"));
        }

        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "filehub-static",
        );
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if !config.endpoint.is_empty() {
            loader = loader.endpoint_url(&config.endpoint);
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.force_path_style)
            .build();

        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initialized S3 storage backend"
        );

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        })
    }

    async fn fetch(&self, storage_key: &str) -> AppResult<S3Body> {
        validate_key(storage_key)?;
        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
        {
            Ok(output) => Ok(output.body),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    Err(AppError::not_found(format!("Object not found: {storage_key}")))
                } else {
                    Err(unavailable(
                        format!("Failed to read object: {storage_key}"),
                        service_error,
                    ))
                }
            }
        }
    }
}

fn unavailable<E>(message: String, err: E) -> AppError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let message = format!("{message}: {}", DisplayErrorContext(&err));
    AppError::with_source(ErrorKind::BackendUnavailable, message, err)
}

#[async_trait]
impl StorageBackend for S3StorageBackend {
    fn backend_type(&self) -> &str {
        "s3"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok())
    }

    async fn put(&self, owner_id: Uuid, content: Bytes, content_type: &str) -> AppResult<String> {
        let storage_key = generate_key(owner_id);
        let size = content.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&storage_key)
            .content_type(content_type)
            .body(S3Body::from(content))
            .send()
            .await
            .map_err(|e| unavailable(format!("Failed to write object: {storage_key}"), e))?;
        debug!(storage_key, bytes = size, "Stored object");
        Ok(storage_key)
    }

    async fn get(&self, storage_key: &str) -> AppResult<Bytes> {
        let body = self.fetch(storage_key).await?;
        let data = body
            .collect()
            .await
            .map_err(|e| unavailable(format!("Failed to read object body: {storage_key}"), e))?;
        Ok(data.into_bytes())
    }

    async fn get_stream(&self, storage_key: &str) -> AppResult<ByteStream> {
        let body = self.fetch(storage_key).await?;
        Ok(Box::pin(ReaderStream::new(body.into_async_read())))
    }

    async fn delete(&self, storage_key: &str) -> AppResult<()> {
        validate_key(storage_key)?;
        // S3 reports success for absent keys.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
            .map_err(|e| unavailable(format!("Failed to delete object: {storage_key}"), e))?;
        debug!(storage_key, "Deleted object");
        Ok(())
    }

    async fn move_object(&self, from: &str, to: &str) -> AppResult<()> {
        validate_key(from)?;
        validate_key(to)?;
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(format!("{}/{}", self.bucket, from))
            .key(to)
            .send()
            .await
            .map_err(|e| unavailable(format!("Failed to copy {from} to {to}"), e))?;
        self.delete(from).await
    }

    async fn signed_url(&self, storage_key: &str, ttl: Duration) -> AppResult<Option<String>> {
        validate_key(storage_key)?;
        let presign = PresigningConfig::expires_in(ttl)
            .map_err(|e| AppError::with_source(ErrorKind::Configuration, "Invalid signed URL TTL", e))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .presigned(presign)
            .await
            .map_err(|e| unavailable(format!("Failed to sign URL for {storage_key}"), e))?;
        Ok(Some(request.uri().to_string()))
    }

    async fn list(&self, owner_id: Uuid) -> AppResult<Vec<StorageObjectMeta>> {
        let prefix = owner_prefix(owner_id);
        let mut objects = Vec::new();
        let mut continuation_token = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&prefix)
                .set_continuation_token(continuation_token)
                .send()
                .await
                .map_err(|e| unavailable(format!("Failed to list objects for {owner_id}"), e))?;

            for object in page.contents() {
                let Some(key) = object.key() else { continue };
                objects.push(StorageObjectMeta {
                    key: key.to_string(),
                    size_bytes: object.size().unwrap_or(0).max(0) as u64,
                    last_modified: object.last_modified().and_then(|d| {
                        chrono::DateTime::from_timestamp(d.secs(), d.subsec_nanos())
                    }),
                });
            }

            if page.is_truncated().unwrap_or(false) {
                continuation_token = page.next_continuation_token().map(str::to_string);
            } else {
                break;
            }
        }

        Ok(objects)
    }
}
