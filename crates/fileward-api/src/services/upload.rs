//! Upload orchestrator
//!
//! Sequences the pipeline for a single request: ingestion limiter, companion
//! field validation, content validation, then remote persistence. Limiter and
//! validator rejections return before the storage dependency is touched, so
//! invalid input never costs a network call. The only side effect of a
//! successful call is the single object write.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Multipart;
use axum::http::HeaderMap;
use fileward_core::{validate, AppError, ProvenanceMetadata, UploadPolicy};
use fileward_storage::{StorageError, StoredObjectRef};

use crate::limits::{self, RawUpload};
use crate::state::AppState;

/// A required companion form field with a length bound.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub max_length: usize,
}

/// Uniform success outcome: the durable reference plus echoed companion
/// fields and the audit provenance.
#[derive(Debug)]
pub struct UploadOutcome {
    pub stored: StoredObjectRef,
    pub sanitized_filename: String,
    pub fields: HashMap<String, String>,
    pub provenance: ProvenanceMetadata,
}

/// Orchestrates one upload request end to end.
pub struct UploadService {
    state: Arc<AppState>,
}

impl UploadService {
    pub fn new(state: &Arc<AppState>) -> Self {
        UploadService {
            state: state.clone(),
        }
    }

    /// Limiter → field validation → content validation → persist.
    pub async fn handle(
        &self,
        headers: &HeaderMap,
        multipart: Multipart,
        policy: &UploadPolicy,
        field_specs: &[FieldSpec],
        provenance: ProvenanceMetadata,
    ) -> Result<UploadOutcome, AppError> {
        limits::check_header_pairs(headers, &self.state.limits)?;
        let raw = limits::read_multipart(multipart, &self.state.limits).await?;

        self.handle_raw(raw, policy, field_specs, provenance).await
    }

    /// Same pipeline for a request the caller already drained through the
    /// limiter (call sites that inspect fields before handing off).
    pub async fn handle_raw(
        &self,
        raw: RawUpload,
        policy: &UploadPolicy,
        field_specs: &[FieldSpec],
        provenance: ProvenanceMetadata,
    ) -> Result<UploadOutcome, AppError> {
        let fields = validate_companion_fields(&raw.fields, field_specs)?;

        let accepted = validate(&raw.candidate, policy)?;

        tracing::info!(
            call_site = policy.name,
            filename = %accepted.sanitized_filename,
            size_bytes = raw.candidate.len(),
            content_type = %raw.candidate.declared_type,
            "Upload validated, persisting"
        );

        let stored = self.persist(&raw, &accepted.storage_key).await?;

        // Audit event; provenance is informational only and never gates the upload
        tracing::info!(
            call_site = policy.name,
            key = %stored.key,
            url = %stored.url,
            size_bytes = stored.size,
            actor_id = ?provenance.actor_id,
            remote_addr = %provenance.remote_addr,
            user_agent = ?provenance.user_agent,
            "File upload accepted"
        );

        Ok(UploadOutcome {
            stored,
            sanitized_filename: accepted.sanitized_filename,
            fields,
            provenance,
        })
    }

    async fn persist(&self, raw: &RawUpload, storage_key: &str) -> Result<StoredObjectRef, AppError> {
        self.state
            .storage
            .persist(
                storage_key,
                &raw.candidate.declared_type,
                raw.candidate.bytes.clone(),
                &self.state.shutdown,
            )
            .await
            .map_err(|e| match e {
                StorageError::Unavailable {
                    attempts,
                    last_error,
                } => AppError::StorageUnavailable {
                    attempts,
                    message: last_error,
                },
                StorageError::Cancelled => AppError::StorageUnavailable {
                    attempts: 0,
                    message: "upload cancelled before completion".to_string(),
                },
                other => AppError::Internal(other.to_string()),
            })
    }
}

/// Check required companion fields against their specs and build the echo
/// map. Unknown extra fields are ignored rather than echoed.
fn validate_companion_fields(
    provided: &HashMap<String, String>,
    specs: &[FieldSpec],
) -> Result<HashMap<String, String>, AppError> {
    let mut echo = HashMap::new();

    for spec in specs {
        let value = provided
            .get(spec.name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::MissingField(spec.name.to_string()))?;

        let length = value.chars().count();
        if length > spec.max_length {
            return Err(AppError::InvalidField(format!(
                "Field '{}' exceeds maximum length of {} characters ({} given)",
                spec.name, spec.max_length, length
            )));
        }

        echo.insert(spec.name.to_string(), value.to_string());
    }

    Ok(echo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fileward_core::ErrorMetadata;

    const SPECS: &[FieldSpec] = &[
        FieldSpec {
            name: "title",
            max_length: 10,
        },
        FieldSpec {
            name: "description",
            max_length: 100,
        },
    ];

    fn provided(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn accepts_complete_fields_and_echoes_them() {
        let fields = provided(&[("title", "Hello"), ("description", "World"), ("extra", "x")]);
        let echo = validate_companion_fields(&fields, SPECS).unwrap();
        assert_eq!(echo.get("title").map(String::as_str), Some("Hello"));
        assert_eq!(echo.get("description").map(String::as_str), Some("World"));
        assert!(!echo.contains_key("extra"));
    }

    #[test]
    fn rejects_missing_field() {
        let fields = provided(&[("title", "Hello")]);
        let err = validate_companion_fields(&fields, SPECS).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }

    #[test]
    fn rejects_blank_field() {
        let fields = provided(&[("title", "   "), ("description", "World")]);
        let err = validate_companion_fields(&fields, SPECS).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }

    #[test]
    fn rejects_overlong_field() {
        let fields = provided(&[("title", "far too long a title"), ("description", "World")]);
        let err = validate_companion_fields(&fields, SPECS).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_FIELD");
    }
}
