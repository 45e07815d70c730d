//! Per-call-site upload policies
//!
//! Every upload route owns its own immutable `UploadPolicy` instance,
//! constructed once at startup. There is no shared mutable policy state:
//! distinct call sites (profile photo, certificate, portfolio,
//! advertisement) differ only in the policy they pass to the validator.

use std::sync::LazyLock;

use regex::Regex;

/// Default maximum filename length in characters.
pub const DEFAULT_MAX_FILENAME_LENGTH: usize = 255;

/// Default maximum file payload in bytes (5 MiB).
pub const DEFAULT_MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// Filename patterns that reject an upload regardless of declared type.
///
/// Covers executable, script, and markup extensions, plus vector graphics
/// (SVG can embed script content even when used purely as an image). Each
/// pattern matches the extension anywhere in the filename, not just at the
/// end, so `shell.php.jpg` is rejected on the embedded `.php`.
const DANGEROUS_EXTENSION_PATTERNS: &[&str] = &[
    r"(?i)\.(php\d?|phtml|phar)(\.|$)",
    r"(?i)\.(exe|msi|dll|scr|bat|cmd)(\.|$)",
    r"(?i)\.(sh|bash|zsh|ps1)(\.|$)",
    r"(?i)\.(js|mjs|vbs|vbe|wsf|jar)(\.|$)",
    r"(?i)\.(py|pl|rb|cgi)(\.|$)",
    r"(?i)\.(asp|aspx|jsp|jspx)(\.|$)",
    r"(?i)\.(htm|html|xhtml|shtml)(\.|$)",
    r"(?i)\.(svg|svgz)(\.|$)",
];

static DANGEROUS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DANGEROUS_EXTENSION_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("static dangerous-extension pattern must compile"))
        .collect()
});

/// Immutable validation policy for one upload call site.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    /// Call-site label used in logs and storage key prefixes.
    pub name: &'static str,
    /// Storage namespace prefix for keys generated under this policy.
    pub key_prefix: &'static str,
    pub allowed_content_types: Vec<String>,
    pub allowed_extensions: Vec<String>,
    pub max_bytes: usize,
    pub max_filename_length: usize,
    /// Always 1 in this system; kept explicit so the limiter can report it.
    pub max_files: usize,
    /// Ordered pattern set; any match rejects regardless of declared type.
    pub dangerous_patterns: Vec<Regex>,
}

impl UploadPolicy {
    fn new(
        name: &'static str,
        key_prefix: &'static str,
        allowed_content_types: &[&str],
        allowed_extensions: &[&str],
    ) -> Self {
        UploadPolicy {
            name,
            key_prefix,
            allowed_content_types: allowed_content_types
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allowed_extensions: allowed_extensions.iter().map(|s| s.to_string()).collect(),
            max_bytes: DEFAULT_MAX_FILE_BYTES,
            max_filename_length: DEFAULT_MAX_FILENAME_LENGTH,
            max_files: 1,
            dangerous_patterns: DANGEROUS_PATTERNS.clone(),
        }
    }

    /// Profile picture: single raster image, no companion fields.
    pub fn profile_photo() -> Self {
        Self::new(
            "profile_photo",
            "profile-photos",
            &["image/jpeg", "image/png", "image/webp"],
            &["jpg", "jpeg", "png", "webp"],
        )
    }

    /// Certificate: raster image or PDF document.
    pub fn certificate() -> Self {
        Self::new(
            "certificate",
            "certificates",
            &["image/jpeg", "image/png", "image/webp", "application/pdf"],
            &["jpg", "jpeg", "png", "webp", "pdf"],
        )
    }

    /// Portfolio entry image; title + description arrive as companion fields.
    pub fn portfolio() -> Self {
        Self::new(
            "portfolio",
            "portfolio",
            &["image/jpeg", "image/png", "image/webp"],
            &["jpg", "jpeg", "png", "webp"],
        )
    }

    /// Advertisement banner image; title, company, description, and
    /// destination link arrive as companion fields.
    pub fn advertisement() -> Self {
        Self::new(
            "advertisement",
            "advertisements",
            &["image/jpeg", "image/png", "image/webp", "image/gif"],
            &["jpg", "jpeg", "png", "webp", "gif"],
        )
    }

    /// True if the filename matches any dangerous-extension pattern.
    pub fn is_dangerous_filename(&self, filename: &str) -> bool {
        self.dangerous_patterns.iter().any(|re| re.is_match(filename))
    }
}
