//! Storage abstraction trait
//!
//! This module defines the ObjectStorage trait that all storage backends must
//! implement, plus the result types shared by the retrying persister.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use fileward_core::StorageBackend;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Attempt timed out after {0} seconds")]
    AttemptTimeout(u64),

    #[error("Upload abandoned: caller cancelled")]
    Cancelled,

    #[error("Storage unavailable after {attempts} attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable result of a successful persist. Once returned, the caller owns the
/// reference and is responsible for eventually requesting deletion.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredObjectRef {
    /// Provider-assigned identifier under which the object is retrievable.
    pub key: String,
    /// Publicly accessible URL to the object.
    pub url: String,
    pub size: u64,
    pub content_type: String,
}

/// Existence/size metadata for a stored object.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Per-key outcome of a bulk deletion. Partial failures are reported per key
/// rather than as one aggregate error, so the caller can retry only the
/// failed subset.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DeletionReport {
    pub deleted: Vec<String>,
    pub failed: Vec<FailedDeletion>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct FailedDeletion {
    pub key: String,
    pub error: String,
}

impl DeletionReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait.
/// The retrying persister wraps a backend and adds the retry/backoff policy;
/// backends themselves perform exactly one provider call per method.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload bytes under the given key and return the public URL.
    ///
    /// A put either leaves the complete object visible or nothing; partially
    /// written objects are never observable.
    async fn put(&self, storage_key: &str, content_type: &str, data: Bytes)
        -> StorageResult<String>;

    /// Delete an object by its storage key.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Fetch existence/size metadata for an object.
    async fn head(&self, storage_key: &str) -> StorageResult<ObjectInfo>;

    /// Check if an object exists.
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
