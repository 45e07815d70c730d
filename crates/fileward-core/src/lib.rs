//! Fileward Core Library
//!
//! This crate provides the upload domain model shared across all Fileward
//! components: the content validation pipeline, file signature registry,
//! filename sanitation, per-call-site upload policies, the error taxonomy,
//! and configuration.

pub mod config;
pub mod error;
pub mod policy;
pub mod provenance;
pub mod sanitize;
pub mod signature;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, StorageBackend};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use policy::UploadPolicy;
pub use provenance::ProvenanceMetadata;
pub use validation::{validate, Accepted, UploadCandidate, ValidationError};
