//! Integration tests for quota admission and ledger accounting.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use bytes::Bytes;
use uuid::Uuid;

use filehub_core::error::AppError;
use filehub_core::traits::{ByteStream, StorageBackend, StorageObjectMeta};
use filehub_core::{AppResult, ErrorKind};
use filehub_service::Services;
use filehub_service::file::{UploadParams, VersionParams};

use crate::helpers::TestApp;

/// Delegates to the real backend but refuses every write.
#[derive(Debug)]
struct RefusingWrites(Arc<dyn StorageBackend>);

#[async_trait]
impl StorageBackend for RefusingWrites {
    fn backend_type(&self) -> &str {
        "refusing"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }

    async fn put(&self, _owner_id: Uuid, _content: Bytes, _content_type: &str) -> AppResult<String> {
        Err(AppError::backend_unavailable("disk full"))
    }

    async fn get(&self, storage_key: &str) -> AppResult<Bytes> {
        self.0.get(storage_key).await
    }

    async fn get_stream(&self, storage_key: &str) -> AppResult<ByteStream> {
        self.0.get_stream(storage_key).await
    }

    async fn delete(&self, storage_key: &str) -> AppResult<()> {
        self.0.delete(storage_key).await
    }

    async fn move_object(&self, from: &str, to: &str) -> AppResult<()> {
        self.0.move_object(from, to).await
    }

    async fn signed_url(&self, storage_key: &str, ttl: Duration) -> AppResult<Option<String>> {
        self.0.signed_url(storage_key, ttl).await
    }

    async fn list(&self, owner_id: Uuid) -> AppResult<Vec<StorageObjectMeta>> {
        self.0.list(owner_id).await
    }
}

fn params(name: &str, data: Vec<u8>) -> UploadParams {
    UploadParams {
        folder_id: None,
        file_name: name.to_string(),
        content_type: None,
        data: Bytes::from(data),
    }
}

const MIB: i64 = 1024 * 1024;

#[tokio::test]
async fn test_upload_over_quota_is_refused() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", 10 * MIB).await;
    app.upload(&alice, None, "half.bin", &vec![0u8; (5 * MIB) as usize])
        .await;

    let err = app
        .services
        .uploads
        .upload(
            &app.ctx(&alice),
            UploadParams {
                folder_id: None,
                file_name: "too-big.bin".to_string(),
                content_type: None,
                data: Bytes::from(vec![1u8; (10 * MIB) as usize]),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);

    assert_eq!(app.user(alice.id).await.storage_used_bytes, 5 * MIB);
    let contents = app.services.tree.contents(&app.ctx(&alice), None).await.unwrap();
    assert_eq!(contents.files.len(), 1);
    assert_eq!(app.storage.list(alice.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_exactly_filling_quota_is_admitted() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", 1000).await;
    app.upload(&alice, None, "exact.bin", &[0u8; 1000]).await;

    let quota = app.services.ledger.usage(alice.id).await.unwrap();
    assert_eq!(quota.used_bytes, 1000);
    assert_eq!(quota.available_bytes, 0);

    let err = app
        .services
        .uploads
        .upload(
            &app.ctx(&alice),
            UploadParams {
                folder_id: None,
                file_name: "one-more.bin".to_string(),
                content_type: None,
                data: Bytes::from_static(b"x"),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);
}

#[tokio::test]
async fn test_version_growth_is_charged_against_quota() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", 100).await;
    let file = app.upload(&alice, None, "grow.txt", &[b'a'; 60]).await;

    let err = app
        .services
        .uploads
        .upload_version(
            &app.ctx(&alice),
            file.id,
            VersionParams {
                content_type: None,
                data: Bytes::from(vec![b'b'; 120]),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::QuotaExceeded);
    assert_eq!(app.user(alice.id).await.storage_used_bytes, 60);

    // Shrinking always fits.
    app.services
        .uploads
        .upload_version(
            &app.ctx(&alice),
            file.id,
            VersionParams {
                content_type: None,
                data: Bytes::from(vec![b'c'; 10]),
            },
        )
        .await
        .unwrap();
    assert_eq!(app.user(alice.id).await.storage_used_bytes, 10);
}

#[tokio::test]
async fn test_ledger_matches_live_files_after_mixed_operations() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", 10 * MIB).await;
    let ctx = app.ctx(&alice);

    let docs = app.services.folders.create(&ctx, "docs", None).await.unwrap();
    let a = app.upload(&alice, None, "a.bin", &[1u8; 1000]).await;
    let b = app.upload(&alice, Some(docs.id), "b.bin", &[2u8; 2000]).await;
    let c = app.upload(&alice, Some(docs.id), "c.bin", &[3u8; 3000]).await;
    app.upload(&alice, None, "d.bin", &[4u8; 4000]).await;

    app.services.files.soft_delete(&ctx, a.id).await.unwrap();
    app.services
        .uploads
        .upload_version(
            &ctx,
            b.id,
            VersionParams {
                content_type: None,
                data: Bytes::from(vec![5u8; 2500]),
            },
        )
        .await
        .unwrap();
    app.services.files.purge(&ctx, c.id).await.unwrap();
    app.services.files.move_file(&ctx, b.id, None).await.unwrap();
    app.services.folders.delete(&ctx, docs.id).await.unwrap();

    let used = app.user(alice.id).await.storage_used_bytes;
    assert_eq!(used, 2500 + 4000);
    assert_eq!(used, app.live_bytes(alice.id).await);
}

#[tokio::test]
async fn test_quota_endpoint_reports_usage() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", 2000).await;
    app.upload(&alice, None, "quarter.bin", &[0u8; 500]).await;

    let response = app
        .request("GET", "/api/users/me/quota", None, Some(&app.token(&alice)))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["total_bytes"], 2000);
    assert_eq!(data["used_bytes"], 500);
    assert_eq!(data["available_bytes"], 1500);
    assert_eq!(data["usage_percent"], 25.0);
}

#[tokio::test]
async fn test_quota_exceeded_over_http() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", 10).await;
    let token = app.token(&alice);

    let response = app
        .request_upload("/api/files/upload", "big.bin", &[0u8; 64], None, &token)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "QUOTA_EXCEEDED");
    assert_eq!(app.user(alice.id).await.storage_used_bytes, 0);
}

#[tokio::test]
async fn test_failed_backend_write_charges_nothing() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", 10 * MIB).await;
    app.upload(&alice, None, "before.bin", &[1u8; 300]).await;

    let refusing: Arc<dyn StorageBackend> = Arc::new(RefusingWrites(Arc::clone(&app.storage)));
    let services = Services::build(&app.db, refusing, &app.config).unwrap();

    let err = services
        .uploads
        .upload(&app.ctx(&alice), params("after.bin", vec![2u8; 500]))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::BackendUnavailable);

    assert_eq!(app.user(alice.id).await.storage_used_bytes, 300);
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files WHERE owner_id = $1")
        .bind(alice.id)
        .fetch_one(app.db.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(app.storage.list(alice.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_negative_ledger_is_clamped_to_zero() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", 10 * MIB).await;
    let file = app.upload(&alice, None, "big.bin", &[7u8; 100]).await;

    sqlx::query("UPDATE users SET storage_used_bytes = 30 WHERE id = $1")
        .bind(alice.id)
        .execute(app.db.pool())
        .await
        .unwrap();

    app.services.files.soft_delete(&app.ctx(&alice), file.id).await.unwrap();
    assert_eq!(app.user(alice.id).await.storage_used_bytes, 0);

    app.upload(&alice, None, "next.bin", &[8u8; 40]).await;
    assert_eq!(app.user(alice.id).await.storage_used_bytes, 40);
}

#[tokio::test]
async fn test_concurrent_uploads_by_one_user_all_land() {
    const UPLOADS: usize = 12;
    const SIZE: usize = 1000;

    let app = TestApp::new().await;
    let alice = app.create_user("alice", 10 * MIB).await;
    let ctx = app.ctx(&alice);

    let handles: Vec<_> = (0..UPLOADS)
        .map(|i| {
            let uploads = Arc::clone(&app.services.uploads);
            let ctx = ctx.clone();
            tokio::spawn(async move {
                uploads
                    .upload(&ctx, params(&format!("part-{i}.bin"), vec![i as u8; SIZE]))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let used = app.user(alice.id).await.storage_used_bytes;
    assert_eq!(used, (UPLOADS * SIZE) as i64);
    assert_eq!(used, app.live_bytes(alice.id).await);
    assert_eq!(app.storage.list(alice.id).await.unwrap().len(), UPLOADS);
}
