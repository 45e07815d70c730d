//! Ingestion limiter
//!
//! First line of defense against resource exhaustion from hostile clients:
//! hard ceilings on the multipart request, enforced while draining the
//! stream and strictly before content validation runs. The file payload is
//! never buffered past its ceiling; the read is aborted as soon as a chunk
//! would push it over.

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::http::HeaderMap;
use bytes::Bytes;
use fileward_core::{AppError, Config, UploadCandidate};

/// The multipart field name the file must arrive under.
pub const FILE_FIELD: &str = "file";

/// Hard ceilings for one upload request.
#[derive(Debug, Clone, Copy)]
pub struct IngestLimits {
    /// Maximum file payload in bytes.
    pub max_file_bytes: usize,
    /// Maximum plain-text field payload in bytes.
    pub max_field_bytes: usize,
    /// Maximum multipart field-name length in bytes.
    pub max_field_name_length: usize,
    /// Maximum simultaneous files. Always 1 in this system.
    pub max_files: usize,
    /// Maximum plain-text field count.
    pub max_fields: usize,
    /// Maximum request header-pair count.
    pub max_header_pairs: usize,
}

impl Default for IngestLimits {
    fn default() -> Self {
        IngestLimits {
            max_file_bytes: 5 * 1024 * 1024,
            max_field_bytes: 10 * 1024 * 1024,
            max_field_name_length: 100,
            max_files: 1,
            max_fields: 100,
            max_header_pairs: 2000,
        }
    }
}

impl IngestLimits {
    pub fn from_config(config: &Config) -> Self {
        IngestLimits {
            max_file_bytes: config.max_file_size_bytes,
            max_field_bytes: config.max_field_size_bytes,
            max_field_name_length: config.max_field_name_length,
            max_files: 1,
            max_fields: config.max_fields,
            max_header_pairs: config.max_header_pairs,
        }
    }

    /// Body-size bound for the HTTP layer: one file plus one maximal text
    /// field plus framing overhead.
    pub fn request_body_limit(&self) -> usize {
        self.max_file_bytes + self.max_field_bytes + 64 * 1024
    }
}

/// Ceiling violations. Each maps to a stable code via `AppError`.
#[derive(Debug, thiserror::Error)]
pub enum LimitError {
    #[error("File exceeds maximum size of {max_bytes} bytes")]
    FileTooLarge { max_bytes: usize },

    #[error("Field '{field}' exceeds maximum size of {max_bytes} bytes")]
    FieldTooLarge { field: String, max_bytes: usize },

    #[error("Field name exceeds maximum length of {max_length} bytes")]
    FieldNameTooLong { max_length: usize },

    #[error("At most {max_files} file per request")]
    TooManyFiles { max_files: usize },

    #[error("Too many form fields (max {max_fields})")]
    TooManyFields { max_fields: usize },

    #[error("Too many header pairs (max {max_pairs})")]
    TooManyHeaders { max_pairs: usize },

    #[error("Unexpected file field: {0}")]
    UnexpectedFileField(String),

    #[error("No file provided")]
    MissingFile,

    #[error("Malformed multipart request: {0}")]
    Malformed(String),
}

impl From<LimitError> for AppError {
    fn from(err: LimitError) -> Self {
        match err {
            LimitError::FileTooLarge { max_bytes } => AppError::FileTooLarge { max_bytes },
            LimitError::FieldTooLarge { field, max_bytes } => {
                AppError::FieldTooLarge { field, max_bytes }
            }
            LimitError::FieldNameTooLong { max_length } => {
                AppError::FieldNameTooLong { max_length }
            }
            LimitError::TooManyFiles { max_files } => AppError::TooManyFiles { max_files },
            LimitError::TooManyFields { max_fields } => AppError::TooManyFields { max_fields },
            LimitError::TooManyHeaders { max_pairs } => AppError::TooManyHeaders { max_pairs },
            LimitError::UnexpectedFileField(field) => AppError::UnexpectedFileField(field),
            LimitError::MissingFile => AppError::MissingFile,
            LimitError::Malformed(msg) => AppError::BadRequest(msg),
        }
    }
}

/// One drained upload request: exactly one file plus its companion
/// plain-text fields.
#[derive(Debug)]
pub struct RawUpload {
    pub candidate: UploadCandidate,
    pub fields: HashMap<String, String>,
}

/// Reject the request if it carries more header pairs than allowed.
pub fn check_header_pairs(headers: &HeaderMap, limits: &IngestLimits) -> Result<(), LimitError> {
    if headers.len() > limits.max_header_pairs {
        return Err(LimitError::TooManyHeaders {
            max_pairs: limits.max_header_pairs,
        });
    }
    Ok(())
}

/// Drain the multipart stream under the configured ceilings.
///
/// Only one field named "file" may carry a file; a file under any other name
/// is an unexpected file field, and a second file trips the file-count
/// ceiling. Text fields are size- and count-bounded.
pub async fn read_multipart(
    mut multipart: Multipart,
    limits: &IngestLimits,
) -> Result<RawUpload, LimitError> {
    let mut file: Option<(Vec<u8>, String, String)> = None;
    let mut fields: HashMap<String, String> = HashMap::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| LimitError::Malformed(e.to_string()))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();
        if field_name.len() > limits.max_field_name_length {
            return Err(LimitError::FieldNameTooLong {
                max_length: limits.max_field_name_length,
            });
        }

        if field.file_name().is_some() {
            if field_name != FILE_FIELD {
                return Err(LimitError::UnexpectedFileField(field_name));
            }
            if file.is_some() {
                return Err(LimitError::TooManyFiles {
                    max_files: limits.max_files,
                });
            }

            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let mut data: Vec<u8> = Vec::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|e| LimitError::Malformed(e.to_string()))?
            {
                if data.len() + chunk.len() > limits.max_file_bytes {
                    return Err(LimitError::FileTooLarge {
                        max_bytes: limits.max_file_bytes,
                    });
                }
                data.extend_from_slice(&chunk);
            }

            file = Some((data, filename, content_type));
        } else {
            if fields.len() + 1 > limits.max_fields {
                return Err(LimitError::TooManyFields {
                    max_fields: limits.max_fields,
                });
            }

            let mut value: Vec<u8> = Vec::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|e| LimitError::Malformed(e.to_string()))?
            {
                if value.len() + chunk.len() > limits.max_field_bytes {
                    return Err(LimitError::FieldTooLarge {
                        field: field_name,
                        max_bytes: limits.max_field_bytes,
                    });
                }
                value.extend_from_slice(&chunk);
            }

            let text = String::from_utf8(value)
                .map_err(|_| LimitError::Malformed(format!("field '{}' is not valid UTF-8", field_name)))?;
            fields.insert(field_name, text);
        }
    }

    let (data, filename, content_type) = file.ok_or(LimitError::MissingFile)?;

    Ok(RawUpload {
        candidate: UploadCandidate::new(Bytes::from(data), content_type, filename),
        fields,
    })
}
