//! Integration tests for the folder hierarchy.

use uuid::Uuid;

use filehub_core::ErrorKind;
use filehub_entity::folder::Folder;

use crate::helpers::{DEFAULT_QUOTA, TestApp};

async fn all_folders(app: &TestApp, owner_id: Uuid) -> Vec<Folder> {
    sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE owner_id = $1 ORDER BY path")
        .bind(owner_id)
        .fetch_all(app.db.pool())
        .await
        .unwrap()
}

/// Every folder's path, trashed or live, is its parent's path plus its own name.
async fn assert_paths_consistent(app: &TestApp, owner_id: Uuid) {
    let folders = all_folders(app, owner_id).await;
    for folder in &folders {
        let parent_path = match folder.parent_id {
            Some(parent_id) => folders
                .iter()
                .find(|f| f.id == parent_id)
                .map(|f| f.path.clone())
                .expect("parent row exists"),
            None => "/".to_string(),
        };
        assert_eq!(folder.path, format!("{parent_path}{}/", folder.name));
    }
}

#[tokio::test]
async fn test_rename_rewrites_descendant_paths() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let ctx = app.ctx(&alice);

    let a = app.services.folders.create(&ctx, "A", None).await.unwrap();
    let b = app.services.folders.create(&ctx, "B", Some(a.id)).await.unwrap();
    assert_eq!(a.path, "/A/");
    assert_eq!(b.path, "/A/B/");

    let c = app.services.folders.rename(&ctx, a.id, "C").await.unwrap();
    assert_eq!(c.path, "/C/");

    let trail = app.services.tree.breadcrumb(&ctx, b.id).await.unwrap();
    let paths: Vec<&str> = trail.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["/C/", "/C/B/"]);
    assert_paths_consistent(&app, alice.id).await;
}

#[tokio::test]
async fn test_rename_and_move_rewrite_trashed_descendants() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let ctx = app.ctx(&alice);

    let a = app.services.folders.create(&ctx, "A", None).await.unwrap();
    let b = app.services.folders.create(&ctx, "B", Some(a.id)).await.unwrap();
    app.services.folders.create(&ctx, "inner", Some(b.id)).await.unwrap();
    app.services.folders.delete(&ctx, b.id).await.unwrap();

    app.services.folders.rename(&ctx, a.id, "C").await.unwrap();
    let trashed = all_folders(&app, alice.id)
        .await
        .into_iter()
        .find(|f| f.id == b.id)
        .unwrap();
    assert!(trashed.is_deleted);
    assert_eq!(trashed.path, "/C/B/");
    assert_paths_consistent(&app, alice.id).await;

    let d = app.services.folders.create(&ctx, "D", None).await.unwrap();
    app.services.folders.move_folder(&ctx, a.id, Some(d.id)).await.unwrap();
    assert_paths_consistent(&app, alice.id).await;
    let paths: Vec<String> = all_folders(&app, alice.id)
        .await
        .into_iter()
        .map(|f| f.path)
        .collect();
    assert_eq!(paths, vec!["/D/", "/D/C/", "/D/C/B/", "/D/C/B/inner/"]);
}

#[tokio::test]
async fn test_move_rewrites_subtree() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let ctx = app.ctx(&alice);

    let a = app.services.folders.create(&ctx, "A", None).await.unwrap();
    let b = app.services.folders.create(&ctx, "B", Some(a.id)).await.unwrap();
    let c = app.services.folders.create(&ctx, "C", Some(b.id)).await.unwrap();
    let d = app.services.folders.create(&ctx, "D", None).await.unwrap();

    let moved = app
        .services
        .folders
        .move_folder(&ctx, b.id, Some(d.id))
        .await
        .unwrap();
    assert_eq!(moved.path, "/D/B/");
    assert_eq!(moved.parent_id, Some(d.id));

    let trail = app.services.tree.breadcrumb(&ctx, c.id).await.unwrap();
    let names: Vec<&str> = trail.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["D", "B", "C"]);

    let to_root = app.services.folders.move_folder(&ctx, c.id, None).await.unwrap();
    assert_eq!(to_root.path, "/C/");
    assert_paths_consistent(&app, alice.id).await;
}

#[tokio::test]
async fn test_move_into_own_subtree_conflicts() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let ctx = app.ctx(&alice);

    let a = app.services.folders.create(&ctx, "A", None).await.unwrap();
    let b = app.services.folders.create(&ctx, "B", Some(a.id)).await.unwrap();
    let c = app.services.folders.create(&ctx, "C", Some(b.id)).await.unwrap();
    let before = all_folders(&app, alice.id).await;

    for target in [a.id, b.id, c.id] {
        let err = app
            .services
            .folders
            .move_folder(&ctx, a.id, Some(target))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    let after = all_folders(&app, alice.id).await;
    let paths = |folders: &[Folder]| folders.iter().map(|f| f.path.clone()).collect::<Vec<_>>();
    assert_eq!(paths(&before), paths(&after));
}

#[tokio::test]
async fn test_sibling_names_are_unique() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let ctx = app.ctx(&alice);

    let a = app.services.folders.create(&ctx, "A", None).await.unwrap();
    let b = app.services.folders.create(&ctx, "B", None).await.unwrap();
    let nested = app.services.folders.create(&ctx, "A", Some(b.id)).await.unwrap();

    let err = app.services.folders.create(&ctx, "A", None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let err = app.services.folders.rename(&ctx, b.id, "A").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let err = app
        .services
        .folders
        .move_folder(&ctx, nested.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    // Another owner has an independent namespace.
    let bob = app.create_user("bob", DEFAULT_QUOTA).await;
    app.services.folders.create(&app.ctx(&bob), "A", None).await.unwrap();

    // A trashed folder frees its name.
    app.services.folders.delete(&ctx, a.id).await.unwrap();
    app.services.folders.create(&ctx, "A", None).await.unwrap();
}

#[tokio::test]
async fn test_wildcard_characters_in_names_are_literal() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let ctx = app.ctx(&alice);

    let wild = app.services.folders.create(&ctx, "a_%", None).await.unwrap();
    app.services.folders.create(&ctx, "inner", Some(wild.id)).await.unwrap();
    let plain = app.services.folders.create(&ctx, "ab%", None).await.unwrap();
    let plain_child = app
        .services
        .folders
        .create(&ctx, "inner", Some(plain.id))
        .await
        .unwrap();

    app.services.folders.rename(&ctx, wild.id, "z").await.unwrap();

    let trail = app.services.tree.breadcrumb(&ctx, plain_child.id).await.unwrap();
    assert_eq!(trail.last().unwrap().path, "/ab%/inner/");
    assert_paths_consistent(&app, alice.id).await;
}

#[tokio::test]
async fn test_delete_cascades_to_every_file() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let ctx = app.ctx(&alice);

    let a = app.services.folders.create(&ctx, "A", None).await.unwrap();
    let b = app.services.folders.create(&ctx, "B", Some(a.id)).await.unwrap();
    let c = app.services.folders.create(&ctx, "C", Some(b.id)).await.unwrap();
    let outside = app.services.folders.create(&ctx, "Outside", None).await.unwrap();

    app.upload(&alice, Some(a.id), "one.bin", &[1u8; 100]).await;
    app.upload(&alice, Some(b.id), "two.bin", &[2u8; 200]).await;
    app.upload(&alice, Some(c.id), "three.bin", &[3u8; 300]).await;
    let kept = app.upload(&alice, Some(outside.id), "kept.bin", &[4u8; 50]).await;
    let before = app.user(alice.id).await.storage_used_bytes;
    assert_eq!(before, 650);

    let report = app.services.folders.delete(&ctx, a.id).await.unwrap();
    assert_eq!(report.folders_deleted, 3);
    assert_eq!(report.files_deleted, 3);
    assert_eq!(report.bytes_released, 600);

    let after = app.user(alice.id).await.storage_used_bytes;
    assert_eq!(before - after, report.bytes_released);
    assert_eq!(after, app.live_bytes(alice.id).await);

    for folder_id in [a.id, b.id, c.id] {
        let err = app
            .services
            .tree
            .contents(&ctx, Some(folder_id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
    assert!(app.services.files.get_file(&ctx, kept.id).await.is_ok());

    let root = app.services.tree.contents(&ctx, None).await.unwrap();
    let names: Vec<&str> = root.folders.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Outside"]);
}

#[tokio::test]
async fn test_contents_lists_direct_children_only() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", DEFAULT_QUOTA).await;
    let ctx = app.ctx(&alice);

    let docs = app.services.folders.create(&ctx, "docs", None).await.unwrap();
    let deep = app.services.folders.create(&ctx, "deep", Some(docs.id)).await.unwrap();
    app.upload(&alice, Some(docs.id), "readme.md", b"# hi").await;
    app.upload(&alice, Some(deep.id), "nested.md", b"# deep").await;
    app.upload(&alice, None, "top.txt", b"top").await;

    let listing = app.services.tree.contents(&ctx, Some(docs.id)).await.unwrap();
    assert_eq!(listing.folder.as_ref().map(|f| f.id), Some(docs.id));
    assert_eq!(listing.folders.len(), 1);
    assert_eq!(listing.folders[0].id, deep.id);
    assert_eq!(listing.files.len(), 1);
    assert_eq!(listing.files[0].name, "readme.md");

    let root = app.services.tree.contents(&ctx, None).await.unwrap();
    assert!(root.folder.is_none());
    assert_eq!(root.folders.len(), 1);
    assert_eq!(root.files.len(), 1);
    assert_eq!(root.files[0].name, "top.txt");
}
