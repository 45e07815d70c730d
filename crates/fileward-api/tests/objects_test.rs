//! Object lifecycle integration tests: bulk deletion and lookup.
//!
//! Run with: `cargo test -p fileward-api --test objects_test`

mod helpers;

use async_trait::async_trait;
use bytes::Bytes;
use fileward_core::StorageBackend;
use fileward_storage::{
    LocalStorage, ObjectInfo, ObjectStorage, StorageError, StorageResult,
};
use helpers::{api_path, setup_test_app, setup_test_app_with_backend};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn delete_removes_stored_objects() {
    let app = setup_test_app().await;

    app.backend
        .put("uploads/a.png", "image/png", Bytes::from_static(b"a"))
        .await
        .unwrap();
    app.backend
        .put("uploads/b.png", "image/png", Bytes::from_static(b"b"))
        .await
        .unwrap();

    let response = app
        .client()
        .delete(&api_path("/uploads"))
        .json(&json!({ "keys": ["uploads/a.png", "uploads/b.png"] }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["deleted"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["failed"].as_array().map(Vec::len), Some(0));

    assert!(!app.backend.exists("uploads/a.png").await.unwrap());
    assert!(!app.backend.exists("uploads/b.png").await.unwrap());
}

#[tokio::test]
async fn delete_of_absent_key_counts_as_deleted() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .delete(&api_path("/uploads"))
        .json(&json!({ "keys": ["uploads/never-existed.png"] }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn delete_with_no_keys_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .delete(&api_path("/uploads"))
        .json(&json!({ "keys": [] }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
}

/// Local storage wrapper whose deletes fail for one specific key.
struct StickyDelete {
    inner: LocalStorage,
    sticky_key: String,
}

#[async_trait]
impl ObjectStorage for StickyDelete {
    async fn put(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<String> {
        self.inner.put(storage_key, content_type, data).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        if storage_key == self.sticky_key {
            return Err(StorageError::DeleteFailed("access denied".to_string()));
        }
        self.inner.delete(storage_key).await
    }

    async fn head(&self, storage_key: &str) -> StorageResult<ObjectInfo> {
        self.inner.head(storage_key).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[tokio::test]
async fn partial_delete_failure_is_reported_per_key() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let inner = LocalStorage::new(
        temp_dir.path(),
        "http://localhost:4000/media".to_string(),
    )
    .await
    .expect("local storage");
    let backend = Arc::new(StickyDelete {
        inner,
        sticky_key: "uploads/locked.png".to_string(),
    });
    let app = setup_test_app_with_backend(backend.clone(), Some(temp_dir));

    backend
        .put("uploads/free.png", "image/png", Bytes::from_static(b"x"))
        .await
        .unwrap();
    backend
        .put("uploads/locked.png", "image/png", Bytes::from_static(b"y"))
        .await
        .unwrap();

    let response = app
        .client()
        .delete(&api_path("/uploads"))
        .json(&json!({ "keys": ["uploads/free.png", "uploads/locked.png"] }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["deleted"], json!(["uploads/free.png"]));
    assert_eq!(body["failed"][0]["key"], "uploads/locked.png");
}

#[tokio::test]
async fn lookup_returns_object_info() {
    let app = setup_test_app().await;

    app.backend
        .put(
            "profile-photos/1-abc-photo.png",
            "image/png",
            Bytes::from_static(b"12345"),
        )
        .await
        .unwrap();

    let response = app
        .client()
        .get(&api_path("/uploads/profile-photos/1-abc-photo.png"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["object"]["key"], "profile-photos/1-abc-photo.png");
    assert_eq!(body["object"]["size"], 5);
}

#[tokio::test]
async fn lookup_of_missing_object_is_404() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path("/uploads/profile-photos/absent.png"))
        .await;

    assert_eq!(response.status_code(), 404);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}
