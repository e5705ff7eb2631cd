//! Fuzzy content fingerprints.
//!
//! # Overview
//! Fingerprints are ssdeep-style strings of the form
//! `blocksize:hash1:hash2`. Two fingerprints can only be meaningfully
//! compared when their block sizes are equal or differ by a factor of two;
//! that gate lives in [`crate::resolve::comparator`], this module only
//! produces fingerprints, parses the block size, and scores compatible pairs.

use std::fs;
use std::path::Path;

use fuzzyhash::FuzzyHash;

use super::FingerprintError;

/// Produces and scores fuzzy content fingerprints.
pub trait FuzzyFingerprinter: Send + Sync {
    /// Fingerprint a byte buffer.
    fn fingerprint(&self, bytes: &[u8]) -> Option<String>;

    /// Score two fingerprints in `[0, 100]`.
    ///
    /// Returns `None` when either fingerprint is malformed.
    fn similarity(&self, a: &str, b: &str) -> Option<u32>;

    /// Read a file and fingerprint its full contents.
    fn fingerprint_file(&self, path: &Path) -> Result<String, FingerprintError> {
        let bytes = fs::read(path).map_err(|e| FingerprintError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.fingerprint(&bytes)
            .ok_or_else(|| FingerprintError::FuzzyHash(path.to_path_buf()))
    }
}

/// Context-triggered piecewise hashing via the `fuzzyhash` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SsdeepFingerprinter;

impl SsdeepFingerprinter {
    /// Create a new fingerprinter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FuzzyFingerprinter for SsdeepFingerprinter {
    fn fingerprint(&self, bytes: &[u8]) -> Option<String> {
        let fingerprint = FuzzyHash::new(bytes).to_string();
        // An empty or prefix-less result cannot be compared later
        if block_size(&fingerprint) == 0 {
            return None;
        }
        Some(fingerprint)
    }

    fn similarity(&self, a: &str, b: &str) -> Option<u32> {
        FuzzyHash::compare(a, b).ok().map(|score| score.min(100))
    }
}

/// Parse the leading block-size field of a fingerprint.
///
/// Anything that is not a plain unsigned integer before the first colon
/// parses to `0`.
#[must_use]
pub fn block_size(fingerprint: &str) -> u64 {
    fingerprint
        .split(':')
        .next()
        .and_then(|field| field.trim().parse::<u64>().ok())
        .unwrap_or(0)
}
