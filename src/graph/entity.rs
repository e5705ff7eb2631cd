//! Typed entities held by the [`RecordGraph`](super::RecordGraph).
//!
//! # Overview
//!
//! - [`Record`]: a logical work, identified by an opaque [`RecordId`]
//! - [`Instantiation`]: one physical file occurrence, owned by exactly one record
//! - [`Fingerprint`]: an extent value tagged by its [`ExtentKind`]
//!
//! Entities live in arenas inside the graph and refer to each other by
//! integer id. Nothing is ever deleted; a record that lost its
//! instantiations to a merge keeps an explicit `merged_into` marker.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Opaque identifier of a record within one graph.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u32);

impl RecordId {
    /// Creates a `RecordId` from a raw index.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record-{}", self.0)
    }
}

/// Opaque identifier of an instantiation within one graph.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstantiationId(u32);

impl InstantiationId {
    /// Creates an `InstantiationId` from a raw index.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The algorithm family an extent was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExtentKind {
    /// ssdeep-style fuzzy hash over raw bytes
    FuzzyHash,
    /// 64-bit perceptual hash over decoded pixels
    PerceptualHash,
}

impl ExtentKind {
    /// Every kind, in comparison-phase order.
    pub const ALL: [ExtentKind; 2] = [ExtentKind::FuzzyHash, ExtentKind::PerceptualHash];

    /// Short lowercase name used in logs and progress phases.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FuzzyHash => "fuzzy",
            Self::PerceptualHash => "perceptual",
        }
    }
}

impl fmt::Display for ExtentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FuzzyHash => write!(f, "FuzzyHash"),
            Self::PerceptualHash => write!(f, "PerceptualHash"),
        }
    }
}

/// A fingerprint value; its variant determines its [`ExtentKind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    /// `blocksize:hash1:hash2`
    Fuzzy(String),
    /// Packed 8x8 perceptual hash
    Perceptual(u64),
}

impl Fingerprint {
    /// The kind of extent this value belongs to.
    #[must_use]
    pub fn kind(&self) -> ExtentKind {
        match self {
            Self::Fuzzy(_) => ExtentKind::FuzzyHash,
            Self::Perceptual(_) => ExtentKind::PerceptualHash,
        }
    }

    /// The fuzzy fingerprint string, if this is one.
    #[must_use]
    pub fn as_fuzzy(&self) -> Option<&str> {
        match self {
            Self::Fuzzy(value) => Some(value),
            Self::Perceptual(_) => None,
        }
    }

    /// The perceptual fingerprint, if this is one.
    #[must_use]
    pub fn as_perceptual(&self) -> Option<u64> {
        match self {
            Self::Perceptual(value) => Some(*value),
            Self::Fuzzy(_) => None,
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fuzzy(value) => write!(f, "{value}"),
            Self::Perceptual(value) => write!(f, "{value}"),
        }
    }
}

/// One physical file occurrence of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instantiation {
    pub(crate) id: InstantiationId,
    pub(crate) path: PathBuf,
    pub(crate) owner: RecordId,
}

impl Instantiation {
    /// This instantiation's id.
    #[must_use]
    pub fn id(&self) -> InstantiationId {
        self.id
    }

    /// The file path identifying this instantiation.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The record currently owning this instantiation.
    #[must_use]
    pub fn owner(&self) -> RecordId {
        self.owner
    }
}

/// A logical work in the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub(crate) id: RecordId,
    pub(crate) instantiations: Vec<InstantiationId>,
    pub(crate) extents: BTreeMap<ExtentKind, Fingerprint>,
    pub(crate) links: BTreeSet<RecordId>,
    pub(crate) merged_into: Option<RecordId>,
}

impl Record {
    pub(crate) fn new(id: RecordId) -> Self {
        Self {
            id,
            instantiations: Vec::new(),
            extents: BTreeMap::new(),
            links: BTreeSet::new(),
            merged_into: None,
        }
    }

    /// This record's id.
    #[must_use]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Instantiations currently owned by this record.
    #[must_use]
    pub fn instantiations(&self) -> &[InstantiationId] {
        &self.instantiations
    }

    /// The extent of the given kind, if any.
    #[must_use]
    pub fn extent(&self, kind: ExtentKind) -> Option<&Fingerprint> {
        self.extents.get(&kind)
    }

    /// All extents, ordered by kind.
    pub fn extents(&self) -> impl Iterator<Item = &Fingerprint> {
        self.extents.values()
    }

    /// Records this one holds a genetic link with.
    pub fn links(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.links.iter().copied()
    }

    /// The record that absorbed this one's instantiations, if it was merged.
    #[must_use]
    pub fn merged_into(&self) -> Option<RecordId> {
        self.merged_into
    }

    /// Whether this record was subsumed by a duplicate merge.
    #[must_use]
    pub fn is_merged(&self) -> bool {
        self.merged_into.is_some()
    }
}
