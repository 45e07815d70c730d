//! File signature (magic number) registry
//!
//! Maps declared content types to the leading byte sequence their payloads
//! must carry. The declared type and the extension are both attacker-supplied;
//! the signature check is the only content-derived signal in the validation
//! chain, so a payload claiming `image/jpeg` with a PDF body is rejected here
//! even though the type and extension checks pass.

/// A registered content-type signature.
#[derive(Debug, Clone, Copy)]
pub struct FileSignature {
    pub content_type: &'static str,
    pub magic: &'static [u8],
}

/// Content types with a registered leading-byte signature.
///
/// Types absent from this table pass the signature check: the table rejects
/// mismatches for known types, it is not an allowlist of types.
pub const SIGNATURES: &[FileSignature] = &[
    FileSignature {
        content_type: "image/jpeg",
        magic: &[0xFF, 0xD8, 0xFF],
    },
    FileSignature {
        content_type: "image/png",
        magic: &[0x89, 0x50, 0x4E, 0x47],
    },
    // WebP is a RIFF container; the fourth byte onwards carries the chunk size
    FileSignature {
        content_type: "image/webp",
        magic: b"RIFF",
    },
    FileSignature {
        content_type: "image/gif",
        magic: b"GIF8",
    },
    FileSignature {
        content_type: "application/pdf",
        magic: b"%PDF",
    },
];

/// Normalize a MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
pub fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Look up the expected leading bytes for a declared content type.
pub fn expected_magic(content_type: &str) -> Option<&'static [u8]> {
    let normalized = normalize_mime_type(content_type).to_lowercase();
    SIGNATURES
        .iter()
        .find(|sig| sig.content_type == normalized)
        .map(|sig| sig.magic)
}

/// Check the payload's leading bytes against the registered signature for the
/// declared content type. Unregistered types pass.
pub fn matches_signature(content_type: &str, data: &[u8]) -> bool {
    match expected_magic(content_type) {
        Some(magic) => data.len() >= magic.len() && &data[..magic.len()] == magic,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_magic_known_types() {
        assert_eq!(expected_magic("image/png"), Some(&[0x89u8, 0x50, 0x4E, 0x47][..]));
        assert_eq!(expected_magic("image/jpeg"), Some(&[0xFFu8, 0xD8, 0xFF][..]));
        assert_eq!(expected_magic("image/webp"), Some(&b"RIFF"[..]));
        assert_eq!(expected_magic("application/pdf"), Some(&b"%PDF"[..]));
    }

    #[test]
    fn test_expected_magic_normalizes_parameters_and_case() {
        assert!(expected_magic("image/PNG").is_some());
        assert!(expected_magic("image/png; charset=utf-8").is_some());
    }

    #[test]
    fn test_unregistered_type_passes() {
        assert!(matches_signature("application/octet-stream", b"anything"));
        assert_eq!(expected_magic("text/plain"), None);
    }

    #[test]
    fn test_matches_signature_png() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(matches_signature("image/png", &png));
        assert!(!matches_signature("image/png", b"%PDF-1.4"));
    }

    #[test]
    fn test_matches_signature_jpeg_with_pdf_body() {
        assert!(!matches_signature("image/jpeg", &[0x25, 0x50, 0x44, 0x46]));
    }

    #[test]
    fn test_short_payload_fails() {
        assert!(!matches_signature("image/png", &[0x89, 0x50]));
        assert!(!matches_signature("image/png", &[]));
    }
}
