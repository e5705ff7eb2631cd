//! Scanner module for file selection and fingerprinting.
//!
//! This module provides functionality for:
//! - Parallel directory walking using jwalk, skipping hidden entries
//! - Content-type classification of candidate files
//! - Fuzzy (ssdeep-style) content fingerprints
//! - Perceptual image fingerprints
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and candidate selection
//! - [`classify`]: Path to content-type mapping
//! - [`fuzzy`]: Fuzzy content fingerprints and block-size parsing
//! - [`perceptual`]: 64-bit perceptual image fingerprints
//!
//! # Example
//!
//! ```no_run
//! use recordlink::scanner::{SelectorConfig, Walker};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), SelectorConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{} ({}): {} bytes", file.path.display(), file.content_type, file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod classify;
pub mod fuzzy;
pub mod perceptual;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use classify::{
    is_image_content_type, ContentClassifier, ExtensionClassifier, DOCUMENT_CONTENT_TYPES,
    IMAGE_CONTENT_TYPES,
};
pub use fuzzy::{block_size, FuzzyFingerprinter, SsdeepFingerprinter};
pub use perceptual::{PerceptualAlgorithm, PerceptualFingerprinter, PerceptualHasher};
pub use walker::Walker;

/// Files at or below this many bytes never qualify.
///
/// Fuzzy hashes of very small inputs carry too little signal to compare.
pub const DEFAULT_MIN_SIZE: u64 = 1000;

/// A file that passed every selection filter.
///
/// Produced once per run by the [`Walker`] and consumed by the
/// fingerprint phase. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Path to the file as discovered under the scan root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Content type assigned by the classifier
    pub content_type: String,
}

impl CandidateFile {
    /// Create a new CandidateFile.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, content_type: impl Into<String>) -> Self {
        Self {
            path,
            size,
            content_type: content_type.into(),
        }
    }

    /// Whether this file should also receive a perceptual fingerprint.
    #[must_use]
    pub fn is_image(&self) -> bool {
        is_image_content_type(&self.content_type)
    }
}

/// Configuration for candidate selection.
///
/// A file qualifies when it is not hidden, not beneath a hidden directory,
/// its content type is in `content_types`, and its size is strictly greater
/// than `min_size`.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Content types that qualify a file for fingerprinting.
    pub content_types: Vec<String>,

    /// Files must be strictly larger than this many bytes.
    pub min_size: u64,

    /// Maximum file size to include (in bytes).
    pub max_size: Option<u64>,

    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            content_types: default_content_types(),
            min_size: DEFAULT_MIN_SIZE,
            max_size: None,
            follow_symlinks: false,
        }
    }
}

impl SelectorConfig {
    /// Replace the allowed content types.
    #[must_use]
    pub fn with_content_types(mut self, content_types: Vec<String>) -> Self {
        self.content_types = content_types;
        self
    }

    /// Set the exclusive minimum size.
    #[must_use]
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    /// Set the inclusive maximum size.
    #[must_use]
    pub fn with_max_size(mut self, max_size: Option<u64>) -> Self {
        self.max_size = max_size;
        self
    }

    /// Enable or disable following symbolic links.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Check whether a content type is in the allowed set.
    #[must_use]
    pub fn allows(&self, content_type: &str) -> bool {
        self.content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
    }
}

/// The document and image content types selected when none are configured.
#[must_use]
pub fn default_content_types() -> Vec<String> {
    DOCUMENT_CONTENT_TYPES
        .iter()
        .chain(IMAGE_CONTENT_TYPES.iter())
        .map(|s| (*s).to_string())
        .collect()
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// The path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::PermissionDenied(path) | Self::NotFound(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}

/// Errors that can occur while fingerprinting a single file.
///
/// All of these are recoverable: the affected extent is skipped and the
/// run continues.
#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    /// The file could not be read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The fuzzy hash algorithm produced no usable fingerprint.
    #[error("Fuzzy hash failed for {0}")]
    FuzzyHash(PathBuf),

    /// The image could not be decoded.
    #[error("Failed to decode image {path}: {source}")]
    ImageDecode {
        /// Path to the image
        path: PathBuf,
        /// The underlying decoder error
        #[source]
        source: image::ImageError,
    },

    /// The perceptual hash did not have the expected 64-bit width.
    #[error("Perceptual hash for {path} is {bits} bits, expected 64")]
    HashWidth {
        /// Path to the image
        path: PathBuf,
        /// Width actually produced
        bits: usize,
    },
}

impl FingerprintError {
    /// The path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. }
            | Self::ImageDecode { path, .. }
            | Self::HashWidth { path, .. } => path,
            Self::FuzzyHash(path) => path,
        }
    }
}
