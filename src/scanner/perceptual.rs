//! Perceptual image fingerprints.
//!
//! This module provides the `PerceptualHasher` which computes 64-bit
//! hashes for decoded raster images that remain stable under common
//! transformations like resizing, small crops, and recompression.

use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig, ImageHash};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::FingerprintError;

/// Number of bits in a perceptual fingerprint.
pub const PERCEPTUAL_HASH_BITS: u32 = 64;

/// Hash algorithm behind a perceptual fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PerceptualAlgorithm {
    /// DCT with median threshold; tolerates crops and rescans best.
    #[default]
    Phash,
    /// Horizontal gradient.
    Dhash,
    /// Mean threshold; cheapest, least tolerant of edits.
    Ahash,
}

impl std::fmt::Display for PerceptualAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Phash => write!(f, "pHash"),
            Self::Dhash => write!(f, "dHash"),
            Self::Ahash => write!(f, "aHash"),
        }
    }
}

/// Produces perceptual fingerprints for image files.
pub trait PerceptualFingerprinter: Send + Sync {
    /// Decode the image at `path` and fingerprint it.
    ///
    /// A decode failure is a recoverable per-file error.
    fn fingerprint_file(&self, path: &Path) -> Result<u64, FingerprintError>;
}

/// `image_hasher` backed fingerprinter producing 64-bit hashes.
pub struct PerceptualHasher {
    hasher: image_hasher::Hasher,
    algorithm: PerceptualAlgorithm,
}

impl PerceptualHasher {
    /// Configure an 8x8 hasher for `algorithm`.
    pub fn new(algorithm: PerceptualAlgorithm) -> Self {
        let mut config = HasherConfig::new().hash_size(8, 8);

        match algorithm {
            PerceptualAlgorithm::Phash => {
                config = config.hash_alg(HashAlg::Median).preproc_dct();
            }
            PerceptualAlgorithm::Dhash => {
                config = config.hash_alg(HashAlg::Gradient);
            }
            PerceptualAlgorithm::Ahash => {
                config = config.hash_alg(HashAlg::Mean);
            }
        }

        Self {
            hasher: config.to_hasher(),
            algorithm,
        }
    }

    /// Fingerprint an already decoded image.
    pub fn hash_image(&self, img: &DynamicImage) -> ImageHash {
        self.hasher.hash_image(img)
    }

    /// The configured algorithm.
    pub fn algorithm(&self) -> PerceptualAlgorithm {
        self.algorithm
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new(PerceptualAlgorithm::Phash)
    }
}

impl PerceptualFingerprinter for PerceptualHasher {
    fn fingerprint_file(&self, path: &Path) -> Result<u64, FingerprintError> {
        let img = image::open(path).map_err(|e| FingerprintError::ImageDecode {
            path: path.to_path_buf(),
            source: e,
        })?;

        let hash = self.hash_image(&img);
        pack_hash(hash.as_bytes()).ok_or_else(|| FingerprintError::HashWidth {
            path: path.to_path_buf(),
            bits: hash.as_bytes().len() * 8,
        })
    }
}

/// Pack an 8-byte hash into a `u64`, most significant byte first.
#[must_use]
pub fn pack_hash(bytes: &[u8]) -> Option<u64> {
    let array: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(array))
}

/// Similarity of two perceptual fingerprints in `[0, 100]`.
///
/// Derived from the Hamming distance: identical hashes score 100 and
/// bitwise complements score 0. Fractional scores are truncated.
#[must_use]
pub fn similarity(a: u64, b: u64) -> u32 {
    let distance = (a ^ b).count_ones();
    (PERCEPTUAL_HASH_BITS - distance) * 100 / PERCEPTUAL_HASH_BITS
}
