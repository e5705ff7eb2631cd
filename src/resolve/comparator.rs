//! Similarity comparison with per-kind compatibility gates.
//!
//! # Overview
//!
//! - Fuzzy fingerprints are comparable only when their block sizes are
//!   equal or one is exactly twice the other. Incomparable pairs score `0`
//!   and the fuzzy algorithm is never invoked for them.
//! - Perceptual fingerprints are always comparable.
//!
//! Scores are integers in `[0, 100]`. [`Thresholds`] turns a score into a
//! [`Verdict`]; the cutoffs are configuration, not constants.

use serde::{Deserialize, Serialize};

use crate::graph::{ExtentKind, Fingerprint};
use crate::scanner::fuzzy::{block_size, FuzzyFingerprinter};
use crate::scanner::perceptual;

/// Score cutoffs that decide merges and links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Fuzzy scores at or above this are exact duplicates (merged).
    pub merge: u32,
    /// Fuzzy scores strictly above this are linked.
    pub fuzzy_link: u32,
    /// Perceptual scores strictly above this are linked.
    pub perceptual_link: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            merge: 100,
            fuzzy_link: 49,
            perceptual_link: 70,
        }
    }
}

impl Thresholds {
    /// Decide what a score means for a pair of the given kind.
    ///
    /// Only fuzzy scores can produce a merge.
    #[must_use]
    pub fn verdict(&self, kind: ExtentKind, score: u32) -> Verdict {
        match kind {
            ExtentKind::FuzzyHash if score >= self.merge => Verdict::Merge,
            ExtentKind::FuzzyHash if score > self.fuzzy_link => Verdict::Link,
            ExtentKind::PerceptualHash if score > self.perceptual_link => Verdict::Link,
            _ => Verdict::Unrelated,
        }
    }

    /// Check the cutoffs are usable.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("merge", self.merge),
            ("fuzzy_link", self.fuzzy_link),
            ("perceptual_link", self.perceptual_link),
        ] {
            if value > 100 {
                return Err(format!("threshold '{name}' must be between 0 and 100, got {value}"));
            }
        }
        if self.fuzzy_link >= self.merge {
            return Err(format!(
                "fuzzy_link ({}) must be lower than merge ({})",
                self.fuzzy_link, self.merge
            ));
        }
        Ok(())
    }
}

/// What to do with a compared pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Exact duplicates: move instantiations onto one record.
    Merge,
    /// Similar but not identical: add a genetic link.
    Link,
    /// No relation.
    Unrelated,
}

/// Whether two fuzzy block sizes can be compared.
///
/// A block size of `0` comes from an unparseable prefix and is only
/// compatible with another `0`.
#[must_use]
pub fn blocks_compatible(b1: u64, b2: u64) -> bool {
    b1 == b2 || b1 == b2.saturating_mul(2) || b2 == b1.saturating_mul(2)
}

/// Scores pairs of fingerprints of one kind.
pub struct Comparator<'a> {
    fuzzy: &'a dyn FuzzyFingerprinter,
}

impl<'a> Comparator<'a> {
    /// Create a comparator that delegates fuzzy scoring to `fuzzy`.
    #[must_use]
    pub fn new(fuzzy: &'a dyn FuzzyFingerprinter) -> Self {
        Self { fuzzy }
    }

    /// Score two fuzzy fingerprints.
    ///
    /// Incompatible block sizes and malformed fingerprints score `0`.
    #[must_use]
    pub fn fuzzy_similarity(&self, a: &str, b: &str) -> u32 {
        if !blocks_compatible(block_size(a), block_size(b)) {
            return 0;
        }
        match self.fuzzy.similarity(a, b) {
            Some(score) => score.min(100),
            None => {
                log::debug!("Fuzzy comparison failed for '{}' vs '{}'", a, b);
                0
            }
        }
    }

    /// Score two perceptual fingerprints.
    #[must_use]
    pub fn perceptual_similarity(&self, a: u64, b: u64) -> u32 {
        perceptual::similarity(a, b)
    }

    /// Score two extents. Extents of different kinds score `0`.
    #[must_use]
    pub fn similarity(&self, a: &Fingerprint, b: &Fingerprint) -> u32 {
        match (a, b) {
            (Fingerprint::Fuzzy(a), Fingerprint::Fuzzy(b)) => self.fuzzy_similarity(a, b),
            (Fingerprint::Perceptual(a), Fingerprint::Perceptual(b)) => {
                self.perceptual_similarity(*a, *b)
            }
            _ => 0,
        }
    }

    /// Score two optional extents; a missing side scores `0`.
    #[must_use]
    pub fn compare(&self, a: Option<&Fingerprint>, b: Option<&Fingerprint>) -> u32 {
        match (a, b) {
            (Some(a), Some(b)) => self.similarity(a, b),
            _ => 0,
        }
    }
}
