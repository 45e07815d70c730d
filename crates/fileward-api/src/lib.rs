//! Fileward API Library
//!
//! This crate provides the HTTP boundary for the upload pipeline: the
//! ingestion limiter over multipart requests, the upload orchestrator, the
//! per-call-site handlers, and application setup.

// Module declarations
pub mod error;
pub mod handlers;
pub mod limits;
pub mod services;
pub mod setup;
pub mod state;
pub mod utils;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use limits::IngestLimits;
pub use state::AppState;
