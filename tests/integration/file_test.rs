//! Integration tests for file lifecycle operations.

use bytes::Bytes;
use futures::TryStreamExt;

use filehub_core::ErrorKind;
use filehub_service::file::{DownloadBody, UploadParams, VersionParams};

use crate::helpers::{DEFAULT_QUOTA, TestApp};

async fn read_body(body: DownloadBody) -> Vec<u8> {
    match body {
        DownloadBody::Stream(stream) => {
            let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
            chunks.concat()
        }
        DownloadBody::Redirect(url) => panic!("local backend should stream, got redirect to {url}"),
    }
}

#[tokio::test]
async fn test_upload_then_download() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;

    let file = app.upload(&alice, None, "notes.txt", b"hello world").await;
    assert_eq!(file.size_bytes, 11);
    assert_eq!(file.version_number, 1);
    assert_eq!(file.mime_type, "text/plain");
    assert_eq!(
        file.content_hash,
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
    assert_eq!(app.user(alice.id).await.storage_used_bytes, 11);

    let download = app
        .services
        .downloads
        .resolve(&app.ctx(&alice), file.id)
        .await
        .unwrap();
    assert_eq!(download.file.id, file.id);
    assert_eq!(read_body(download.body).await, b"hello world");
}

#[tokio::test]
async fn test_other_owner_cannot_see_file() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let bob = app.create_user("bob", DEFAULT_QUOTA).await;
    let file = app.upload(&alice, None, "private.txt", b"secret").await;

    let err = app
        .services
        .downloads
        .resolve(&app.ctx(&bob), file.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .services
        .files
        .soft_delete(&app.ctx(&bob), file.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(app.user(alice.id).await.storage_used_bytes, 6);
}

#[tokio::test]
async fn test_duplicate_name_conflicts_and_leaves_no_bytes() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    app.upload(&alice, None, "report.pdf", b"first").await;

    let err = app
        .services
        .uploads
        .upload(
            &app.ctx(&alice),
            UploadParams {
                folder_id: None,
                file_name: "report.pdf".to_string(),
                content_type: None,
                data: Bytes::from_static(b"second"),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(app.user(alice.id).await.storage_used_bytes, 5);
    assert_eq!(app.storage.list(alice.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_rename_and_move() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let ctx = app.ctx(&alice);
    let file = app.upload(&alice, None, "draft.txt", b"abc").await;
    app.upload(&alice, None, "taken.txt", b"xyz").await;

    let renamed = app.services.files.rename(&ctx, file.id, "final.txt").await.unwrap();
    assert_eq!(renamed.name, "final.txt");

    let err = app
        .services
        .files
        .rename(&ctx, file.id, "taken.txt")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let docs = app.services.folders.create(&ctx, "docs", None).await.unwrap();
    let moved = app
        .services
        .files
        .move_file(&ctx, file.id, Some(docs.id))
        .await
        .unwrap();
    assert_eq!(moved.folder_id, Some(docs.id));

    let err = app
        .services
        .files
        .move_file(&ctx, file.id, Some(uuid::Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // Moving and renaming never touch the quota.
    assert_eq!(app.user(alice.id).await.storage_used_bytes, 6);
}

#[tokio::test]
async fn test_soft_delete_releases_quota_once() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let ctx = app.ctx(&alice);
    let file = app.upload(&alice, None, "a.bin", &[7u8; 100]).await;

    let released = app.services.files.soft_delete(&ctx, file.id).await.unwrap();
    assert_eq!(released, 100);
    assert_eq!(app.user(alice.id).await.storage_used_bytes, 0);

    let err = app.services.files.soft_delete(&ctx, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(app.user(alice.id).await.storage_used_bytes, 0);

    let err = app.services.files.get_file(&ctx, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // The name is free again once the file is in the trash.
    app.upload(&alice, None, "a.bin", &[1u8; 10]).await;
}

#[tokio::test]
async fn test_purge_removes_bytes_and_rows() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let ctx = app.ctx(&alice);
    let file = app.upload(&alice, None, "old.log", &[0u8; 64]).await;
    let updated = app
        .services
        .uploads
        .upload_version(
            &ctx,
            file.id,
            VersionParams {
                content_type: None,
                data: Bytes::from_static(&[1u8; 32]),
            },
        )
        .await
        .unwrap();
    assert_eq!(app.storage.list(alice.id).await.unwrap().len(), 2);

    // Purging a live file trashes it first, so the quota is released exactly once.
    app.services.files.purge(&ctx, file.id).await.unwrap();
    assert_eq!(app.user(alice.id).await.storage_used_bytes, 0);
    assert!(app.storage.list(alice.id).await.unwrap().is_empty());

    let err = app.storage.get(&updated.storage_key).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app.services.files.purge(&ctx, file.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_upload_version_charges_delta() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let ctx = app.ctx(&alice);
    let file = app.upload(&alice, None, "data.csv", &[b'a'; 50]).await;
    let first_key = file.storage_key.clone();

    let v2 = app
        .services
        .uploads
        .upload_version(
            &ctx,
            file.id,
            VersionParams {
                content_type: None,
                data: Bytes::from(vec![b'b'; 80]),
            },
        )
        .await
        .unwrap();
    assert_eq!(v2.version_number, 2);
    assert_eq!(v2.size_bytes, 80);
    assert_eq!(app.user(alice.id).await.storage_used_bytes, 80);

    let v3 = app
        .services
        .uploads
        .upload_version(
            &ctx,
            file.id,
            VersionParams {
                content_type: None,
                data: Bytes::from(vec![b'c'; 20]),
            },
        )
        .await
        .unwrap();
    assert_eq!(v3.version_number, 3);
    assert_eq!(app.user(alice.id).await.storage_used_bytes, 20);
    assert_eq!(app.live_bytes(alice.id).await, 20);

    let versions = app.services.files.list_versions(&ctx, file.id).await.unwrap();
    let numbers: Vec<i64> = versions.iter().map(|v| v.version_number).collect();
    assert_eq!(numbers, vec![3, 2, 1]);

    // Older versions keep their bytes.
    assert_eq!(app.storage.get(&first_key).await.unwrap().len(), 50);
}

#[tokio::test]
async fn test_duplicates_bulk_delete_frees_only_the_deleted_copy() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let ctx = app.ctx(&alice);
    let original = app.upload(&alice, None, "photo.jpg", &[9u8; 300]).await;
    let copy = app.upload(&alice, None, "photo (1).jpg", &[9u8; 300]).await;
    app.upload(&alice, None, "other.jpg", &[8u8; 300]).await;

    let groups = app.services.duplicates.groups(&ctx).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].content_hash, original.content_hash);
    assert_eq!(groups[0].files.len(), 2);
    assert_eq!(groups[0].wasted_bytes, 300);

    let report = app
        .services
        .duplicates
        .bulk_delete(&ctx, &[copy.id, copy.id])
        .await
        .unwrap();
    assert_eq!(report.deleted, vec![copy.id]);
    assert!(report.failed.is_empty());
    assert_eq!(report.bytes_freed, 300);

    assert_eq!(app.user(alice.id).await.storage_used_bytes, 600);
    assert!(app.services.files.get_file(&ctx, original.id).await.is_ok());
    assert!(app.services.duplicates.groups(&ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bulk_delete_reports_failures_without_stopping() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let ctx = app.ctx(&alice);
    let file = app.upload(&alice, None, "keep-going.txt", b"12345").await;
    let missing = uuid::Uuid::new_v4();

    let report = app
        .services
        .duplicates
        .bulk_delete(&ctx, &[missing, file.id])
        .await
        .unwrap();

    assert_eq!(report.deleted, vec![file.id]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].file_id, missing);
    assert_eq!(report.bytes_freed, 5);
}

#[tokio::test]
async fn test_backend_delete_is_idempotent() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let key = app
        .storage
        .put(alice.id, Bytes::from_static(b"gone soon"), "text/plain")
        .await
        .unwrap();

    app.storage.delete(&key).await.unwrap();
    app.storage.delete(&key).await.unwrap();
    assert_eq!(app.storage.get(&key).await.unwrap_err().kind, ErrorKind::NotFound);
}
