//! Integration tests for post-upload annotation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Value, json};

use filehub_core::AppResult;
use filehub_core::error::AppError;
use filehub_core::traits::{AnnotationRequest, Annotator};
use filehub_database::repositories::FileRepository;
use filehub_service::AnnotationDispatcher;

use crate::helpers::{DEFAULT_QUOTA, TestApp};

#[derive(Debug)]
enum FakeAnnotator {
    Labels,
    Broken,
    Stuck,
}

#[async_trait]
impl Annotator for FakeAnnotator {
    fn name(&self) -> &str {
        "labels"
    }

    async fn annotate(&self, request: &AnnotationRequest) -> AppResult<Value> {
        match self {
            Self::Labels => Ok(json!({
                "category": "text",
                "length": request.content.len(),
            })),
            Self::Broken => Err(AppError::internal("sidecar returned 500")),
            Self::Stuck => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Value::Null)
            }
        }
    }
}

fn dispatcher(app: &TestApp, annotator: FakeAnnotator, timeout: Duration) -> AnnotationDispatcher {
    AnnotationDispatcher::new(
        Arc::new(annotator),
        Arc::new(FileRepository::new(&app.db)),
        timeout,
    )
}

#[tokio::test]
async fn test_annotation_is_merged_into_metadata() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let file = app.upload(&alice, None, "notes.txt", b"twelve bytes").await;

    let handle = dispatcher(&app, FakeAnnotator::Labels, Duration::from_secs(5))
        .dispatch(&file, Bytes::from_static(b"twelve bytes"))
        .expect("enabled dispatcher spawns a task");
    handle.await.unwrap();

    let stored = app.services.files.get_file(&app.ctx(&alice), file.id).await.unwrap();
    assert_eq!(stored.metadata.0["labels"]["category"], "text");
    assert_eq!(stored.metadata.0["labels"]["length"], 12);
}

#[tokio::test]
async fn test_annotation_failures_leave_the_file_alone() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let file = app.upload(&alice, None, "notes.txt", b"content").await;

    dispatcher(&app, FakeAnnotator::Broken, Duration::from_secs(5))
        .dispatch(&file, Bytes::from_static(b"content"))
        .unwrap()
        .await
        .unwrap();
    dispatcher(&app, FakeAnnotator::Stuck, Duration::from_millis(50))
        .dispatch(&file, Bytes::from_static(b"content"))
        .unwrap()
        .await
        .unwrap();

    let stored = app.services.files.get_file(&app.ctx(&alice), file.id).await.unwrap();
    assert!(stored.metadata.0.get("labels").is_none());
    assert_eq!(stored.size_bytes, 7);
}

#[tokio::test]
async fn test_disabled_dispatcher_spawns_nothing() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let file = app.upload(&alice, None, "quiet.txt", b"shh").await;

    let disabled = AnnotationDispatcher::disabled(Arc::new(FileRepository::new(&app.db)));
    assert!(disabled.dispatch(&file, Bytes::from_static(b"shh")).is_none());
}
