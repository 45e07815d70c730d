//! Error types module
//!
//! This module provides the core error types used throughout the Fileward
//! application. All failure modes of the upload pipeline are unified under the
//! `AppError` enum, and every variant maps to a stable machine-readable code
//! through the `ErrorMetadata` trait so callers can handle failures
//! programmatically.

use crate::validation::ValidationError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_FILE_SIGNATURE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Content validation failures: the payload is a well-formed request but
    // fails security policy. Always client-fault, never retried.
    #[error("Invalid content type: {0}")]
    InvalidFileType(String),

    #[error("Invalid file extension: {0}")]
    InvalidFileExtension(String),

    #[error("Filename matches a blocked pattern: {0}")]
    SuspiciousFile(String),

    #[error("Filename too long: {length} characters (max {max})")]
    FilenameTooLong { length: usize, max: usize },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("File is empty")]
    EmptyFile,

    #[error("File content does not match declared type: {0}")]
    InvalidFileSignature(String),

    // Input-shape failures: the request violates a hard ceiling. Rejected
    // before validation runs.
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

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Invalid destination link: {0}")]
    InvalidLink(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // Storage dependency failed after the internal retry budget was spent.
    // Server-fault, recoverable by re-submitting.
    #[error("Storage unavailable after {attempts} attempts: {message}")]
    StorageUnavailable { attempts: u32, message: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidContentType { content_type, allowed } => {
                AppError::InvalidFileType(format!(
                    "'{}' is not allowed (allowed: {})",
                    content_type,
                    allowed.join(", ")
                ))
            }
            ValidationError::InvalidExtension { extension, allowed } => {
                AppError::InvalidFileExtension(format!(
                    "'{}' is not allowed (allowed: {})",
                    extension,
                    allowed.join(", ")
                ))
            }
            ValidationError::SuspiciousFilename { filename } => AppError::SuspiciousFile(filename),
            ValidationError::FilenameTooLong { length, max } => {
                AppError::FilenameTooLong { length, max }
            }
            ValidationError::InvalidFilename(msg) => AppError::InvalidFilename(msg),
            ValidationError::EmptyFile => AppError::EmptyFile,
            ValidationError::SignatureMismatch { content_type } => {
                AppError::InvalidFileSignature(content_type)
            }
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// Reduces duplication in ErrorMetadata impl; client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidFileType(_) => (
            400,
            "INVALID_FILE_TYPE",
            false,
            Some("Upload a file of an allowed content type"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidFileExtension(_) => (
            400,
            "INVALID_FILE_EXTENSION",
            false,
            Some("Upload a file with an allowed extension"),
            false,
            LogLevel::Debug,
        ),
        AppError::SuspiciousFile(_) => (
            400,
            "SUSPICIOUS_FILE",
            false,
            Some("Rename the file and remove executable or script extensions"),
            false,
            LogLevel::Warn,
        ),
        AppError::FilenameTooLong { .. } => (
            400,
            "FILENAME_TOO_LONG",
            false,
            Some("Shorten the filename and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidFilename(_) => (
            400,
            "INVALID_FILENAME",
            false,
            Some("Remove invalid characters from the filename"),
            false,
            LogLevel::Warn,
        ),
        AppError::EmptyFile => (
            400,
            "EMPTY_FILE",
            false,
            Some("Upload a non-empty file"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidFileSignature(_) => (
            400,
            "INVALID_FILE_SIGNATURE",
            false,
            Some("Upload a file whose content matches its declared type"),
            false,
            LogLevel::Warn,
        ),
        AppError::FileTooLarge { .. } => (
            413,
            "FILE_TOO_LARGE",
            false,
            Some("Reduce the file size and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::FieldTooLarge { .. } => (
            413,
            "FIELD_TOO_LARGE",
            false,
            Some("Reduce the field size and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::FieldNameTooLong { .. } => (
            400,
            "FIELD_NAME_TOO_LONG",
            false,
            Some("Shorten the form field name"),
            false,
            LogLevel::Debug,
        ),
        AppError::TooManyFiles { .. } => (
            400,
            "TOO_MANY_FILES",
            false,
            Some("Send exactly one file per request"),
            false,
            LogLevel::Debug,
        ),
        AppError::TooManyFields { .. } => (
            400,
            "TOO_MANY_FIELDS",
            false,
            Some("Reduce the number of form fields"),
            false,
            LogLevel::Debug,
        ),
        AppError::TooManyHeaders { .. } => (
            400,
            "TOO_MANY_HEADERS",
            false,
            Some("Reduce the number of request headers"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnexpectedFileField(_) => (
            400,
            "UNEXPECTED_FILE_FIELD",
            false,
            Some("Send the file under the field named 'file'"),
            false,
            LogLevel::Debug,
        ),
        AppError::MissingFile => (
            400,
            "MISSING_FILE",
            false,
            Some("Include a file field in the request"),
            false,
            LogLevel::Debug,
        ),
        AppError::MissingField(_) => (
            400,
            "MISSING_FIELD",
            false,
            Some("Include all required form fields"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidField(_) => (
            400,
            "INVALID_FIELD",
            false,
            Some("Check form field constraints and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidLink(_) => (
            400,
            "INVALID_LINK",
            false,
            Some("Provide an absolute http(s) URL to a public host"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the storage key exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::StorageUnavailable { .. } => (
            503,
            "STORAGE_UNAVAILABLE",
            true,
            Some("Retry the submission after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            500,
            "VALIDATION_MIDDLEWARE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "VALIDATION_MIDDLEWARE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidFileType(_) => "InvalidFileType",
            AppError::InvalidFileExtension(_) => "InvalidFileExtension",
            AppError::SuspiciousFile(_) => "SuspiciousFile",
            AppError::FilenameTooLong { .. } => "FilenameTooLong",
            AppError::InvalidFilename(_) => "InvalidFilename",
            AppError::EmptyFile => "EmptyFile",
            AppError::InvalidFileSignature(_) => "InvalidFileSignature",
            AppError::FileTooLarge { .. } => "FileTooLarge",
            AppError::FieldTooLarge { .. } => "FieldTooLarge",
            AppError::FieldNameTooLong { .. } => "FieldNameTooLong",
            AppError::TooManyFiles { .. } => "TooManyFiles",
            AppError::TooManyFields { .. } => "TooManyFields",
            AppError::TooManyHeaders { .. } => "TooManyHeaders",
            AppError::UnexpectedFileField(_) => "UnexpectedFileField",
            AppError::MissingFile => "MissingFile",
            AppError::MissingField(_) => "MissingField",
            AppError::InvalidField(_) => "InvalidField",
            AppError::InvalidLink(_) => "InvalidLink",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::StorageUnavailable { .. } => "StorageUnavailable",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        // Add source error chain
        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidFileType(ref msg) => format!("Invalid content type: {}", msg),
            AppError::InvalidFileExtension(ref msg) => format!("Invalid file extension: {}", msg),
            AppError::SuspiciousFile(_) => {
                "The file was rejected because its name matches a blocked pattern".to_string()
            }
            AppError::FilenameTooLong { length, max } => {
                format!("Filename too long: {} characters (max {})", length, max)
            }
            AppError::InvalidFilename(ref msg) => format!("Invalid filename: {}", msg),
            AppError::EmptyFile => "The uploaded file is empty".to_string(),
            AppError::InvalidFileSignature(ref content_type) => format!(
                "The file content does not match the declared type {}",
                content_type
            ),
            AppError::FileTooLarge { max_bytes } => format!(
                "File exceeds the maximum allowed size of {} MB",
                max_bytes / 1024 / 1024
            ),
            AppError::FieldTooLarge { field, max_bytes } => format!(
                "Field '{}' exceeds the maximum allowed size of {} bytes",
                field, max_bytes
            ),
            AppError::FieldNameTooLong { max_length } => {
                format!("A field name exceeds the maximum length of {} bytes", max_length)
            }
            AppError::TooManyFiles { max_files } => {
                format!("At most {} file may be uploaded per request", max_files)
            }
            AppError::TooManyFields { max_fields } => {
                format!("Too many form fields (max {})", max_fields)
            }
            AppError::TooManyHeaders { max_pairs } => {
                format!("Too many header pairs (max {})", max_pairs)
            }
            AppError::UnexpectedFileField(ref field) => {
                format!("Unexpected file field '{}'; send the file as 'file'", field)
            }
            AppError::MissingFile => "No file was provided".to_string(),
            AppError::MissingField(ref field) => format!("Missing required field: {}", field),
            AppError::InvalidField(ref msg) => msg.clone(),
            AppError::InvalidLink(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::StorageUnavailable { .. } => {
                "File storage is temporarily unavailable; please try again".to_string()
            }
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
