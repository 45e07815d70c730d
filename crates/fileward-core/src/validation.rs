//! Content validation pipeline
//!
//! An ordered, fail-fast chain of independent checks over an upload
//! candidate. Every check is read-only over the candidate buffer; the first
//! failure short-circuits. The checks are deliberately layered and redundant
//! (declared type, extension, and byte signature) because each signal except
//! the signature is attacker-controlled; no single check is trusted alone.

use bytes::Bytes;

use crate::policy::UploadPolicy;
use crate::sanitize;
use crate::signature;

/// A single file upload awaiting validation. Created per request and
/// discarded at the end of the call regardless of outcome.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    /// Raw payload, owned by the pipeline for the duration of the call.
    pub bytes: Bytes,
    /// Client-declared MIME type. Untrusted.
    pub declared_type: String,
    /// Client-supplied filename. Untrusted.
    pub original_filename: String,
}

impl UploadCandidate {
    pub fn new(
        bytes: Bytes,
        declared_type: impl Into<String>,
        original_filename: impl Into<String>,
    ) -> Self {
        UploadCandidate {
            bytes,
            declared_type: declared_type.into(),
            original_filename: original_filename.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Successful validation result. Never partially populated.
#[derive(Debug, Clone)]
pub struct Accepted {
    pub sanitized_filename: String,
    pub storage_key: String,
}

/// Validation failures, one variant per check in the chain.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Filename matches a blocked pattern: {filename}")]
    SuspiciousFilename { filename: String },

    #[error("Filename too long: {length} characters (max: {max})")]
    FilenameTooLong { length: usize, max: usize },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,

    #[error("File content does not match declared type {content_type}")]
    SignatureMismatch { content_type: String },
}

/// Run the full check chain over a candidate.
///
/// Order: declared type, extension, dangerous patterns, filename length,
/// NUL byte, emptiness, byte signature. On success the sanitized filename and
/// a collision-resistant storage key are computed; nothing else is touched.
pub fn validate(
    candidate: &UploadCandidate,
    policy: &UploadPolicy,
) -> Result<Accepted, ValidationError> {
    let declared = signature::normalize_mime_type(&candidate.declared_type).to_lowercase();
    let filename = candidate.original_filename.as_str();

    if !policy.allowed_content_types.iter().any(|ct| *ct == declared) {
        return Err(ValidationError::InvalidContentType {
            content_type: candidate.declared_type.clone(),
            allowed: policy.allowed_content_types.clone(),
        });
    }

    let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
    if !policy.allowed_extensions.contains(&extension) {
        return Err(ValidationError::InvalidExtension {
            extension,
            allowed: policy.allowed_extensions.clone(),
        });
    }

    // The full filename is scanned, not just the trailing extension, so a
    // double extension like shell.php.jpg cannot smuggle a blocked type.
    if policy.is_dangerous_filename(filename) {
        return Err(ValidationError::SuspiciousFilename {
            filename: filename.to_string(),
        });
    }

    let length = filename.chars().count();
    if length > policy.max_filename_length {
        return Err(ValidationError::FilenameTooLong {
            length,
            max: policy.max_filename_length,
        });
    }

    if filename.contains('\0') {
        return Err(ValidationError::InvalidFilename(
            "filename contains a NUL byte".to_string(),
        ));
    }

    if candidate.bytes.is_empty() {
        return Err(ValidationError::EmptyFile);
    }

    if !signature::matches_signature(&declared, &candidate.bytes) {
        return Err(ValidationError::SignatureMismatch {
            content_type: declared,
        });
    }

    let sanitized_filename = sanitize::sanitize_filename(filename)?;
    let storage_key = sanitize::generate_storage_key(policy.key_prefix, &sanitized_filename);

    Ok(Accepted {
        sanitized_filename,
        storage_key,
    })
}
