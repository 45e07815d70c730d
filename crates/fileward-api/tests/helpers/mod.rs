//! Test helpers: build AppState and router for integration tests.
//!
//! Run from the workspace root: `cargo test -p fileward-api`.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum_test::TestServer;
use fileward_api::setup::routes::{build_router, API_PREFIX};
use fileward_api::state::AppState;
use fileward_core::{Config, StorageBackend};
use fileward_storage::{LocalStorage, ObjectStorage};
use tempfile::TempDir;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

/// Test application: server plus owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub backend: Arc<dyn ObjectStorage>,
    pub _temp_dir: Option<TempDir>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Test configuration with local storage and a single persist attempt, so
/// failing-storage tests do not sit through real backoff sleeps.
pub fn test_config() -> Config {
    Config {
        server_port: 4000,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        storage_backend: Some(StorageBackend::Local),
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        aws_access_key_id: None,
        aws_secret_access_key: None,
        local_storage_path: None,
        local_storage_base_url: None,
        max_file_size_bytes: 5 * 1024 * 1024,
        max_field_size_bytes: 10 * 1024 * 1024,
        max_field_name_length: 100,
        max_fields: 100,
        max_header_pairs: 2000,
        upload_max_attempts: 1,
        upload_attempt_timeout_secs: 60,
        trusted_proxy_count: 0,
    }
}

/// Setup a test app backed by local storage in a temp directory.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let storage = LocalStorage::new(
        temp_dir.path(),
        "http://localhost:4000/media".to_string(),
    )
    .await
    .expect("create local storage");

    setup_test_app_with_backend(Arc::new(storage), Some(temp_dir))
}

/// Setup a test app over an arbitrary backend (e.g. a failing double).
pub fn setup_test_app_with_backend(
    backend: Arc<dyn ObjectStorage>,
    temp_dir: Option<TempDir>,
) -> TestApp {
    let state = Arc::new(AppState::new(test_config(), backend.clone()));
    let server = TestServer::new(build_router(state)).expect("create test server");

    TestApp {
        server,
        backend,
        _temp_dir: temp_dir,
    }
}
