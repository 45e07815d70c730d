use crate::traits::{ObjectInfo, ObjectStorage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use fileward_core::StorageBackend;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation, used for development and tests.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/fileward/media")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:4000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Storage keys must not contain traversal sequences that could escape
    /// the base storage directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    /// Generate public URL for a stored file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn put(
        &self,
        storage_key: &str,
        _content_type: &str,
        data: Bytes,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len() as u64;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        }

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        file.write_all(&data)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        tracing::info!(
            key = %storage_key,
            size_bytes = size,
            path = %path.display(),
            "Local upload successful"
        );

        Ok(self.generate_url(storage_key))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(storage_key.to_string())
            } else {
                StorageError::DeleteFailed(e.to_string())
            }
        })?;

        tracing::info!(key = %storage_key, "Local delete successful");

        Ok(())
    }

    async fn head(&self, storage_key: &str) -> StorageResult<ObjectInfo> {
        let path = self.key_to_path(storage_key)?;

        let meta = fs::metadata(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(storage_key.to_string())
            } else {
                StorageError::BackendError(e.to_string())
            }
        })?;

        let last_modified = meta
            .modified()
            .ok()
            .map(|t| DateTime::<Utc>::from(t));

        Ok(ObjectInfo {
            key: storage_key.to_string(),
            size: meta.len(),
            last_modified,
        })
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        match fs::metadata(&path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_storage() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = LocalStorage::new(dir.path(), "http://localhost:4000/media".to_string())
            .await
            .expect("storage");
        (dir, storage)
    }

    #[tokio::test]
    async fn put_head_exists_delete_roundtrip() {
        let (_dir, storage) = test_storage().await;

        let url = storage
            .put("uploads/1-abc-photo.png", "image/png", Bytes::from_static(b"content"))
            .await
            .expect("put");
        assert_eq!(url, "http://localhost:4000/media/uploads/1-abc-photo.png");

        assert!(storage.exists("uploads/1-abc-photo.png").await.unwrap());

        let info = storage.head("uploads/1-abc-photo.png").await.unwrap();
        assert_eq!(info.size, 7);
        assert!(info.last_modified.is_some());

        storage.delete("uploads/1-abc-photo.png").await.unwrap();
        assert!(!storage.exists("uploads/1-abc-photo.png").await.unwrap());
    }

    #[tokio::test]
    async fn delete_missing_object_reports_not_found() {
        let (_dir, storage) = test_storage().await;
        let err = storage.delete("uploads/missing.png").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let (_dir, storage) = test_storage().await;
        let err = storage
            .put("../escape.png", "image/png", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));

        let err = storage.head("/absolute/path").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
