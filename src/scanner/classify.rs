//! Content-type classification.
//!
//! The selector treats the classifier as authoritative and static for the
//! run. The default [`ExtensionClassifier`] maps lowercase file extensions
//! to content types; anything it does not know maps to `None`.

use std::path::Path;

/// Content types that identify raster images.
///
/// Only files with one of these types receive a perceptual fingerprint.
pub const IMAGE_CONTENT_TYPES: &[&str] = &[
    "image/bmp",
    "image/gif",
    "image/jpeg",
    "image/png",
    "image/tiff",
];

/// Content types that identify documents.
pub const DOCUMENT_CONTENT_TYPES: &[&str] = &[
    "application/epub+zip",
    "application/msword",
    "application/pdf",
    "application/vnd.oasis.opendocument.text",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/markdown",
    "text/plain",
];

/// Extension table used by [`ExtensionClassifier`].
const EXTENSION_TABLE: &[(&str, &str)] = &[
    ("bmp", "image/bmp"),
    ("gif", "image/gif"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("jpe", "image/jpeg"),
    ("png", "image/png"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("epub", "application/epub+zip"),
    ("doc", "application/msword"),
    ("pdf", "application/pdf"),
    ("odt", "application/vnd.oasis.opendocument.text"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("md", "text/markdown"),
    ("markdown", "text/markdown"),
    ("txt", "text/plain"),
    ("text", "text/plain"),
    ("rtf", "application/rtf"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("xml", "application/xml"),
    ("csv", "text/csv"),
    ("json", "application/json"),
    ("zip", "application/zip"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
];

/// Maps a file path to a content type.
///
/// Implementations must be deterministic for the duration of a run.
pub trait ContentClassifier: Send + Sync {
    /// Classify a file, returning `None` when the type is unknown.
    fn classify(&self, path: &Path) -> Option<String>;
}

/// Classifier driven by the file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtensionClassifier;

impl ExtensionClassifier {
    /// Create a new extension classifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// All known `(extension, content type)` pairs.
    #[must_use]
    pub fn known_mappings() -> &'static [(&'static str, &'static str)] {
        EXTENSION_TABLE
    }
}

impl ContentClassifier for ExtensionClassifier {
    fn classify(&self, path: &Path) -> Option<String> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_lowercase)?;

        EXTENSION_TABLE
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, content_type)| (*content_type).to_string())
    }
}

/// Whether a content type refers to a raster image.
#[must_use]
pub fn is_image_content_type(content_type: &str) -> bool {
    IMAGE_CONTENT_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(content_type))
}
