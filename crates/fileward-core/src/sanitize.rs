//! Filename sanitation and storage key generation
//!
//! Sanitized names keep only lowercase alphanumerics plus `.`, `-`, `_`.
//! Storage keys carry a timestamp + random prefix so two concurrent uploads
//! with identical original filenames can never collide in the storage
//! namespace.

use chrono::Utc;
use uuid::Uuid;

use crate::validation::ValidationError;

/// Sanitize a user-supplied filename.
///
/// Strips any path components, rejects traversal attempts, drops every
/// character outside the `[a-z0-9.-_]` allowlist, and lowercases the rest.
/// Returns an error if the name still contains a traversal sequence after
/// path-stripping.
pub fn sanitize_filename(filename: &str) -> Result<String, ValidationError> {
    let filename_only = std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    if filename_only.contains("..") {
        return Err(ValidationError::InvalidFilename(
            "filename contains a path traversal sequence".to_string(),
        ));
    }

    let sanitized: String = filename_only
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if sanitized.trim_matches(|c| c == '.' || c == '-' || c == '_').is_empty() {
        // Nothing usable survived; fall back to a neutral name
        return Ok("file".to_string());
    }

    Ok(sanitized)
}

/// Generate a collision-resistant storage key for a sanitized filename.
///
/// The key is `{prefix}/{unix_millis}-{random}-{sanitized}`. The random
/// component guarantees uniqueness across concurrent uploads; the timestamp
/// keeps keys roughly sortable by arrival.
pub fn generate_storage_key(prefix: &str, sanitized_filename: &str) -> String {
    format!(
        "{}/{}-{}-{}",
        prefix.trim_end_matches('/'),
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        sanitized_filename
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn sanitize_keeps_valid_names() {
        assert_eq!(sanitize_filename("photo.png").unwrap(), "photo.png");
        assert_eq!(sanitize_filename("my-file_1.jpg").unwrap(), "my-file_1.jpg");
    }

    #[test]
    fn sanitize_lowercases() {
        assert_eq!(sanitize_filename("Photo.PNG").unwrap(), "photo.png");
    }

    #[test]
    fn sanitize_strips_disallowed_characters() {
        assert_eq!(sanitize_filename("my photo (1).png").unwrap(), "myphoto1.png");
        assert_eq!(sanitize_filename("r\u{00e9}sum\u{00e9}.pdf").unwrap(), "rsum.pdf");
    }

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("/etc/passwd.png").unwrap(), "passwd.png");
        assert_eq!(sanitize_filename("dir/photo.png").unwrap(), "photo.png");
    }

    #[test]
    fn sanitize_rejects_traversal() {
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("....").is_err());
    }

    #[test]
    fn sanitize_falls_back_when_nothing_survives() {
        assert_eq!(sanitize_filename("@#$%").unwrap(), "file");
        assert_eq!(sanitize_filename("---").unwrap(), "file");
    }

    #[test]
    fn storage_keys_never_collide() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let key = generate_storage_key("uploads", "photo.png");
            assert!(seen.insert(key), "duplicate storage key generated");
        }
    }

    #[test]
    fn storage_key_ends_with_sanitized_name() {
        let key = generate_storage_key("uploads", "photo.png");
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with("photo.png"));
    }
}
