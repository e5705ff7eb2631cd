//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct which traverses a scan root
//! and yields the [`CandidateFile`]s that qualify for fingerprinting.
//!
//! # Features
//!
//! - Parallel directory traversal using rayon thread pool
//! - Hidden entries are pruned, including everything beneath a hidden directory
//! - Content-type filtering through a [`ContentClassifier`]
//! - Exclusive minimum size and optional maximum size
//! - Graceful shutdown via atomic flag
//!
//! A filesystem error on one entry never stops the walk: it is yielded as a
//! [`ScanError`] and iteration continues. Callers decide whether to abort.
//!
//! # Example
//!
//! ```no_run
//! use recordlink::scanner::{SelectorConfig, Walker};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/archive/accession-42"), SelectorConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("{} candidates", files.len());
//! ```

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::WalkDir;

use super::classify::{ContentClassifier, ExtensionClassifier};
use super::{CandidateFile, ScanError, SelectorConfig};

/// Directory walker for candidate file discovery.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Selection configuration
    config: SelectorConfig,
    /// Content-type classifier
    classifier: Arc<dyn ContentClassifier>,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("classifier", &"<classifier>")
            .field("shutdown_flag", &self.shutdown_flag)
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path using the extension classifier.
    #[must_use]
    pub fn new(path: &Path, config: SelectorConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            classifier: Arc::new(ExtensionClassifier::new()),
            shutdown_flag: None,
        }
    }

    /// Replace the content-type classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn ContentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker will stop iteration
    /// as soon as possible.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check if a file passes size filters.
    ///
    /// The minimum is exclusive, the maximum inclusive.
    fn passes_size_filter(&self, size: u64) -> bool {
        if size <= self.config.min_size {
            return false;
        }
        if let Some(max) = self.config.max_size {
            if size > max {
                return false;
            }
        }
        true
    }

    /// Walk the directory tree, yielding candidate files.
    ///
    /// Returns an iterator over [`CandidateFile`] results. Errors are yielded
    /// as [`ScanError`] values rather than stopping iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<CandidateFile, ScanError>> + '_ {
        // Hidden filtering happens in process_read_dir so that pruning a
        // hidden directory also prunes its subtree.
        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(false)
            .process_read_dir(|depth, _path, _read_dir_state, children| {
                // The root arrives alone with no depth; only entries beneath
                // it are judged hidden
                if depth.is_some() {
                    children.retain(|child| match child {
                        Ok(entry) => !is_hidden(&entry.path()),
                        Err(_) => true,
                    });
                }
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir.into_iter().filter_map(move |entry_result| {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                return None;
            }

            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    // Skip the root directory itself
                    if path == self.root {
                        return None;
                    }

                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        return None;
                    }

                    if file_type.is_symlink() && !self.config.follow_symlinks {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    let metadata = if self.config.follow_symlinks {
                        std::fs::metadata(&path)
                    } else {
                        std::fs::symlink_metadata(&path)
                    };

                    let metadata = match metadata {
                        Ok(m) => m,
                        Err(e) => return Some(Err(self.handle_io_error(&path, e))),
                    };

                    if !metadata.is_file() {
                        return None;
                    }

                    self.process_file_entry(path, &metadata).map(Ok)
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    Some(Err(self.handle_jwalk_error(path, e)))
                }
            }
        })
    }

    /// Apply the content-type and size filters to a regular file.
    fn process_file_entry(&self, path: PathBuf, metadata: &Metadata) -> Option<CandidateFile> {
        let size = metadata.len();

        if !self.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                path.display()
            );
            return None;
        }

        let Some(content_type) = self.classifier.classify(&path) else {
            log::trace!("Skipping unclassified file: {}", path.display());
            return None;
        };

        if !self.config.allows(&content_type) {
            log::trace!(
                "Skipping file due to content type ({}): {}",
                content_type,
                path.display()
            );
            return None;
        }

        Some(CandidateFile {
            path,
            size,
            content_type,
        })
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path.to_path_buf())
            }
            ErrorKind::NotFound => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path.to_path_buf())
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                }
            }
        }
    }

    /// Handle jwalk errors.
    fn handle_jwalk_error(&self, path: PathBuf, error: jwalk::Error) -> ScanError {
        log::warn!("Walker error for {}: {}", path.display(), error);
        let kind = error
            .io_error()
            .map_or(std::io::ErrorKind::Other, std::io::Error::kind);
        if kind == std::io::ErrorKind::PermissionDenied {
            return ScanError::PermissionDenied(path);
        }
        ScanError::Io {
            path,
            source: std::io::Error::new(kind, error.to_string()),
        }
    }
}

/// Whether the filesystem flags an entry as hidden.
///
/// Dot-prefixed names are hidden everywhere; on Windows the hidden
/// attribute is honoured as well.
#[must_use]
pub fn is_hidden(path: &Path) -> bool {
    let dot_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'));
    dot_name || has_hidden_attribute(path)
}

#[cfg(windows)]
fn has_hidden_attribute(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    std::fs::symlink_metadata(path)
        .map(|m| m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn has_hidden_attribute(_path: &Path) -> bool {
    false
}
