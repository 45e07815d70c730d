//! Fileward Storage Library
//!
//! This crate provides the object-storage abstraction and implementations for
//! Fileward: the `ObjectStorage` trait, S3 and local filesystem backends, and
//! the retrying persister that gives uploads resilience against transient
//! provider failures.
//!
//! # Storage key format
//!
//! Keys are generated by the validation pipeline as
//! `{call-site prefix}/{timestamp}-{random}-{sanitized name}` and are unique
//! per candidate. Keys must not contain `..` or a leading `/`.

pub mod factory;
pub mod local;
pub mod retry;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use fileward_core::StorageBackend;
pub use local::LocalStorage;
pub use retry::{backoff_delay, PersistState, RetryPolicy, RetryingStore};
pub use s3::S3Storage;
pub use traits::{
    DeletionReport, FailedDeletion, ObjectInfo, ObjectStorage, StorageError, StorageResult,
    StoredObjectRef,
};
