//! End-to-end tests through the HTTP router.

use axum::http::{StatusCode, header};
use serde_json::json;

use crate::helpers::{DEFAULT_QUOTA, TestApp};

#[tokio::test]
async fn test_health_reports_components() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"], "up");
    assert_eq!(response.data()["storage"], "up");
    assert_eq!(response.data()["storage_backend"], "local");
}

#[tokio::test]
async fn test_requests_without_a_valid_token_are_rejected() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/users/me/quota", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "UNAUTHORIZED");

    let response = app
        .request("GET", "/api/folders/contents", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_and_download_over_http() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let token = app.token(&alice);

    let response = app
        .request_upload("/api/files/upload", "hello.txt", b"hello over http", None, &token)
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let file = response.data();
    assert_eq!(file["name"], "hello.txt");
    assert_eq!(file["size_bytes"], 15);
    assert_eq!(file["mime_type"], "text/plain");
    let file_id = file["id"].as_str().unwrap().to_string();

    let response = app
        .request("GET", &format!("/api/files/{file_id}/download"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CONTENT_TYPE], "text/plain");
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"hello.txt\""
    );
    assert_eq!(response.raw.as_ref(), b"hello over http");

    let response = app
        .request("GET", &format!("/api/files/{file_id}/versions"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_into_folder_and_list_contents() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let token = app.token(&alice);

    let response = app
        .request("POST", "/api/folders", Some(json!({ "name": "photos" })), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let folder_id: uuid::Uuid = response.data()["id"].as_str().unwrap().parse().unwrap();

    let response = app
        .request_upload(
            "/api/files/upload",
            "cat.png",
            &[0x89, b'P', b'N', b'G'],
            Some(folder_id),
            &token,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.data()["folder_id"], folder_id.to_string());

    let response = app
        .request("GET", &format!("/api/folders/{folder_id}/contents"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["files"][0]["name"], "cat.png");

    let response = app
        .request("GET", "/api/folders/contents", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["folders"][0]["path"], "/photos/");
    assert!(response.data()["files"].as_array().unwrap().is_empty());

    let response = app
        .request("GET", &format!("/api/folders/{folder_id}/breadcrumb"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()[0]["name"], "photos");
}

#[tokio::test]
async fn test_error_codes_are_json() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let token = app.token(&alice);
    app.upload(&alice, None, "same.txt", b"one").await;

    let response = app
        .request_upload("/api/files/upload", "same.txt", b"two", None, &token)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "CONFLICT");

    let missing = uuid::Uuid::new_v4();
    let response = app
        .request("GET", &format!("/api/files/{missing}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "NOT_FOUND");

    let response = app
        .request("POST", "/api/folders", Some(json!({ "name": "" })), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_rename_move_and_delete_over_http() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let token = app.token(&alice);
    let file = app.upload(&alice, None, "draft.md", &[b'x'; 42]).await;
    let folder = app
        .services
        .folders
        .create(&app.ctx(&alice), "archive", None)
        .await
        .unwrap();

    let response = app
        .request(
            "PUT",
            &format!("/api/files/{}/rename", file.id),
            Some(json!({ "name": "final.md" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["name"], "final.md");

    let response = app
        .request(
            "PUT",
            &format!("/api/files/{}/move", file.id),
            Some(json!({ "folderId": folder.id })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["folder_id"], folder.id.to_string());

    let response = app
        .request("DELETE", &format!("/api/files/{}", file.id), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["bytes_released"], 42);

    let response = app
        .request("DELETE", &format!("/api/folders/{}", folder.id), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["folders_deleted"], 1);
}

#[tokio::test]
async fn test_public_share_routes() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let token = app.token(&alice);
    let file = app.upload(&alice, None, "shared.txt", b"shared bytes").await;

    let response = app
        .request(
            "POST",
            "/api/shares",
            Some(json!({ "fileId": file.id, "password": "s3cret", "maxDownloads": 1 })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.data()["is_password_protected"], true);
    assert!(response.data()["share"].get("password_hash").is_none());
    let share_token = response.data()["share"]["token"].as_str().unwrap().to_string();
    let share_id = response.data()["share"]["id"].as_str().unwrap().to_string();

    let public = format!("/api/shares/public/{share_token}");
    let response = app.request("GET", &public, None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "SHARE_PASSWORD_REQUIRED");

    let response = app
        .request("GET", &format!("{public}?password=wrong"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "SHARE_PASSWORD_INCORRECT");

    let response = app
        .request("GET", &format!("{public}?password=s3cret"), None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["file_name"], "shared.txt");
    assert_eq!(response.data()["remaining_downloads"], 1);

    let download = format!("{public}/download?password=s3cret");
    let response = app.request("GET", &download, None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.raw.as_ref(), b"shared bytes");

    let response = app.request("GET", &download, None, None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), "SHARE_EXHAUSTED");

    let response = app
        .request("DELETE", &format!("/api/shares/{share_id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", &download, None, None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), "SHARE_REVOKED");

    let response = app
        .request("GET", "/api/shares/public/unknown-token", None, None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), "SHARE_NOT_FOUND");
}
