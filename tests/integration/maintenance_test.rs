//! Integration tests for the maintenance jobs and their admin trigger.

use std::time::Duration as StdDuration;

use axum::http::StatusCode;
use bytes::Bytes;
use chrono::{Duration, Utc};

use filehub_entity::user::UserRole;
use filehub_service::maintenance::{MaintenanceJob, MaintenanceReport, QuotaDrift};

use crate::helpers::{DEFAULT_QUOTA, TestApp};

#[tokio::test]
async fn test_orphan_sweep_removes_only_unreferenced_objects() {
    let app = TestApp::with_config(|config| config.worker.orphan_grace_minutes = 0).await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let kept = app.upload(&alice, None, "kept.txt", b"referenced").await;
    let orphan_key = app
        .storage
        .put(alice.id, Bytes::from_static(b"nobody points here"), "text/plain")
        .await
        .unwrap();
    tokio::time::sleep(StdDuration::from_millis(20)).await;

    let report = app.jobs.run(MaintenanceJob::OrphanSweep).await.unwrap();
    let Some(MaintenanceReport::OrphanSweep(report)) = report else {
        panic!("expected an orphan sweep report, got {report:?}");
    };
    assert_eq!(report.orphans_deleted, 1);
    assert_eq!(report.bytes_reclaimed, 18);
    assert_eq!(report.failures, 0);

    let keys: Vec<String> = app
        .storage
        .list(alice.id)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.key)
        .collect();
    assert_eq!(keys, vec![kept.storage_key.clone()]);
    assert!(!keys.contains(&orphan_key));
}

#[tokio::test]
async fn test_orphan_sweep_respects_grace_period() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    app.storage
        .put(alice.id, Bytes::from_static(b"still uploading"), "text/plain")
        .await
        .unwrap();

    let report = app.services.maintenance.run(MaintenanceJob::OrphanSweep).await.unwrap();
    let MaintenanceReport::OrphanSweep(report) = report else {
        panic!("expected an orphan sweep report, got {report:?}");
    };
    assert_eq!(report.objects_scanned, 1);
    assert_eq!(report.orphans_deleted, 0);
    assert_eq!(app.storage.list(alice.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_trash_purge_honours_retention() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let ctx = app.ctx(&alice);
    let old = app.upload(&alice, None, "old.txt", b"long gone").await;
    let recent = app.upload(&alice, None, "recent.txt", b"just trashed").await;
    app.services.files.soft_delete(&ctx, old.id).await.unwrap();
    app.services.files.soft_delete(&ctx, recent.id).await.unwrap();

    let retention = app.config.worker.trash_retention_days;
    sqlx::query("UPDATE files SET deleted_at = $1 WHERE id = $2")
        .bind(Utc::now() - Duration::days(retention + 1))
        .bind(old.id)
        .execute(app.db.pool())
        .await
        .unwrap();

    let report = app.services.maintenance.run(MaintenanceJob::TrashPurge).await.unwrap();
    let MaintenanceReport::TrashPurge(report) = report else {
        panic!("expected a trash purge report, got {report:?}");
    };
    assert_eq!(report.expired, 1);
    assert_eq!(report.purged, 1);
    assert_eq!(report.failures, 0);

    let remaining: Vec<uuid::Uuid> = sqlx::query_scalar("SELECT id FROM files WHERE owner_id = $1")
        .bind(alice.id)
        .fetch_all(app.db.pool())
        .await
        .unwrap();
    assert_eq!(remaining, vec![recent.id]);

    let keys: Vec<String> = app
        .storage
        .list(alice.id)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.key)
        .collect();
    assert_eq!(keys, vec![recent.storage_key.clone()]);
    assert_eq!(app.user(alice.id).await.storage_used_bytes, 0);
}

#[tokio::test]
async fn test_quota_audit_reports_drift_without_repairing() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let bob = app.create_user("bob", DEFAULT_QUOTA).await;
    app.upload(&alice, None, "a.txt", &[0u8; 40]).await;
    app.upload(&bob, None, "b.txt", &[0u8; 70]).await;

    let clean = app.services.maintenance.run(MaintenanceJob::QuotaAudit).await.unwrap();
    let MaintenanceReport::QuotaAudit(clean) = clean else {
        panic!("expected a quota audit report, got {clean:?}");
    };
    assert_eq!(clean.users_checked, 2);
    assert!(clean.drifted.is_empty());

    sqlx::query("UPDATE users SET storage_used_bytes = 999 WHERE id = $1")
        .bind(bob.id)
        .execute(app.db.pool())
        .await
        .unwrap();

    let report = app.services.maintenance.run(MaintenanceJob::QuotaAudit).await.unwrap();
    let MaintenanceReport::QuotaAudit(report) = report else {
        panic!("expected a quota audit report, got {report:?}");
    };
    assert_eq!(
        report.drifted,
        vec![QuotaDrift {
            user_id: bob.id,
            recorded_bytes: 999,
            actual_bytes: 70,
        }]
    );
    assert_eq!(app.user(bob.id).await.storage_used_bytes, 999);
}

#[tokio::test]
async fn test_admin_route_runs_jobs() {
    let app = TestApp::new().await;
    let member = app.create_user("member", DEFAULT_QUOTA).await;
    let admin = app
        .create_user_with_role("admin", UserRole::Admin, DEFAULT_QUOTA)
        .await;

    let response = app
        .request(
            "POST",
            "/api/admin/maintenance/quota_audit",
            None,
            Some(&app.token(&member)),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "POST",
            "/api/admin/maintenance/quota-audit",
            None,
            Some(&app.token(&admin)),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(data["job"], "quota_audit");
    assert_eq!(data["ran"], true);
    assert_eq!(data["report"]["job"], "quota_audit");
    assert_eq!(data["report"]["users_checked"], 2);

    let response = app
        .request(
            "POST",
            "/api/admin/maintenance/reindex",
            None,
            Some(&app.token(&admin)),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("POST", "/api/admin/maintenance/trash_purge", None, None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
