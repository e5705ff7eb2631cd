//! Record graph: records, their instantiations, extents, and genetic links.
//!
//! # Overview
//!
//! The graph is an entity store held in arenas indexed by integer id, with
//! an explicit path index so that lookup-or-create by file path is a hash
//! lookup rather than a scan.
//!
//! Invariants maintained by every operation:
//! - A file path maps to at most one [`Instantiation`] across the graph.
//! - Each instantiation is owned by exactly one record at any time.
//! - A record holds at most one extent per [`ExtentKind`].
//! - Genetic links are undirected, never reflexive, and stored once per pair.
//! - Nothing is deleted. A merged record keeps its extents and links, loses
//!   its instantiations, and records which record absorbed them.
//!
//! # Example
//!
//! ```
//! use recordlink::graph::{Fingerprint, RecordGraph};
//! use std::path::Path;
//!
//! let mut graph = RecordGraph::new();
//! let a = graph.get_or_create_record(Path::new("/archive/a.txt")).unwrap();
//! let b = graph.get_or_create_record(Path::new("/archive/b.txt")).unwrap();
//! graph.add_extent(a, Fingerprint::Fuzzy("3:abc:def".into())).unwrap();
//!
//! graph.merge_as_duplicate(a, b).unwrap();
//! assert_eq!(graph.record_for_path(Path::new("/archive/b.txt")), Some(a));
//! ```

pub mod entity;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use entity::{ExtentKind, Fingerprint, Instantiation, InstantiationId, Record, RecordId};

/// Errors raised when an operation would break a graph invariant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The record id does not belong to this graph.
    #[error("Unknown record: {0}")]
    UnknownRecord(RecordId),

    /// A record was asked to absorb itself.
    #[error("Cannot merge {0} into itself")]
    SelfMerge(RecordId),

    /// A record was asked to link to itself.
    #[error("Cannot link {0} to itself")]
    SelfLink(RecordId),

    /// The record already holds an extent of this kind.
    #[error("{record} already has a {kind} extent")]
    DuplicateExtent {
        /// Record that already holds the extent
        record: RecordId,
        /// Kind that was added twice
        kind: ExtentKind,
    },

    /// Ids are 32-bit; the arena cannot grow past `u32::MAX` entries.
    #[error("Graph is full: cannot allocate id {0}")]
    CapacityExceeded(usize),
}

/// Id for the next entry of an arena currently holding `len` entries.
fn next_id(len: usize) -> Result<u32, GraphError> {
    u32::try_from(len).map_err(|_| GraphError::CapacityExceeded(len))
}

/// Outcome of a duplicate merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The record that now owns the moved instantiations
    pub survivor: RecordId,
    /// Number of instantiations that changed owner
    pub moved: usize,
}

/// Entity store for one resolution run.
#[derive(Debug, Clone, Default)]
pub struct RecordGraph {
    records: Vec<Record>,
    instantiations: Vec<Instantiation>,
    path_index: HashMap<PathBuf, InstantiationId>,
    link_count: usize,
}

impl RecordGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records, merged ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the graph holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of instantiations.
    #[must_use]
    pub fn instantiation_count(&self) -> usize {
        self.instantiations.len()
    }

    /// Number of distinct genetic links.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.link_count
    }

    /// Look up the record for a path, creating a record and its single
    /// instantiation if the path has not been seen.
    ///
    /// Repeated calls with the same path return the same record, or the
    /// record that has since absorbed it through a merge.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CapacityExceeded`] once every 32-bit id is taken.
    pub fn get_or_create_record(&mut self, path: &Path) -> Result<RecordId, GraphError> {
        if let Some(&inst) = self.path_index.get(path) {
            return Ok(self.instantiations[inst.index()].owner);
        }

        let record_id = RecordId::new(next_id(self.records.len())?);
        let inst_id = InstantiationId::new(next_id(self.instantiations.len())?);

        let mut record = Record::new(record_id);
        record.instantiations.push(inst_id);
        self.records.push(record);
        self.instantiations.push(Instantiation {
            id: inst_id,
            path: path.to_path_buf(),
            owner: record_id,
        });
        self.path_index.insert(path.to_path_buf(), inst_id);

        log::trace!("Created {} for {}", record_id, path.display());
        Ok(record_id)
    }

    /// The record currently owning the instantiation at `path`.
    #[must_use]
    pub fn record_for_path(&self, path: &Path) -> Option<RecordId> {
        self.path_index
            .get(path)
            .map(|inst| self.instantiations[inst.index()].owner)
    }

    /// Borrow a record.
    #[must_use]
    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id.index())
    }

    /// Borrow an instantiation.
    #[must_use]
    pub fn instantiation(&self, id: InstantiationId) -> Option<&Instantiation> {
        self.instantiations.get(id.index())
    }

    /// All record ids. The order carries no meaning.
    pub fn all_records(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.records.iter().map(Record::id)
    }

    /// All records.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Paths of the instantiations a record currently owns.
    pub fn instantiation_paths(&self, id: RecordId) -> Vec<&Path> {
        self.record(id)
            .map(|record| {
                record
                    .instantiations
                    .iter()
                    .map(|inst| self.instantiations[inst.index()].path.as_path())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Attach a fingerprint to a record.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateExtent`] if the record already holds an
    /// extent of the same kind; the stored value is left untouched.
    pub fn add_extent(&mut self, id: RecordId, fingerprint: Fingerprint) -> Result<(), GraphError> {
        let record = self.record_mut(id)?;
        let kind = fingerprint.kind();
        if record.extents.contains_key(&kind) {
            return Err(GraphError::DuplicateExtent { record: id, kind });
        }
        record.extents.insert(kind, fingerprint);
        Ok(())
    }

    /// The extent of `kind` stored on a record.
    #[must_use]
    pub fn get_extent(&self, id: RecordId, kind: ExtentKind) -> Option<&Fingerprint> {
        self.record(id).and_then(|r| r.extent(kind))
    }

    /// Ids of every record holding an extent of `kind`, in ascending order.
    #[must_use]
    pub fn records_with_extent(&self, kind: ExtentKind) -> Vec<RecordId> {
        self.records
            .iter()
            .filter(|r| r.extents.contains_key(&kind))
            .map(Record::id)
            .collect()
    }

    /// Follow `merged_into` markers to the record that owns `id`'s files.
    #[must_use]
    pub fn resolve(&self, id: RecordId) -> RecordId {
        let mut current = id;
        while let Some(next) = self.records.get(current.index()).and_then(|r| r.merged_into) {
            current = next;
        }
        current
    }

    /// Move every instantiation of `doomed` onto `survivor`.
    ///
    /// Both sides are first resolved through earlier merges so that chains
    /// of exact duplicates collapse onto a single owner. The doomed record
    /// keeps its extents and links and is marked as merged. Merging two
    /// records that already share an owner moves nothing.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::SelfMerge`] when both ids are equal and
    /// [`GraphError::UnknownRecord`] for ids outside this graph.
    pub fn merge_as_duplicate(
        &mut self,
        survivor: RecordId,
        doomed: RecordId,
    ) -> Result<MergeOutcome, GraphError> {
        if survivor == doomed {
            return Err(GraphError::SelfMerge(survivor));
        }
        self.record_mut(survivor)?;
        self.record_mut(doomed)?;

        let target = self.resolve(survivor);
        let source = self.resolve(doomed);
        if target == source {
            return Ok(MergeOutcome {
                survivor: target,
                moved: 0,
            });
        }

        let moved = std::mem::take(&mut self.records[source.index()].instantiations);
        for inst in &moved {
            self.instantiations[inst.index()].owner = target;
        }
        self.records[source.index()].merged_into = Some(target);
        self.records[target.index()]
            .instantiations
            .extend(moved.iter().copied());

        log::debug!(
            "Merged {} into {} ({} instantiation(s) moved)",
            source,
            target,
            moved.len()
        );

        Ok(MergeOutcome {
            survivor: target,
            moved: moved.len(),
        })
    }

    /// Record that two distinct records are similar.
    ///
    /// Returns `true` if the link is new and `false` if the pair was
    /// already linked.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::SelfLink`] when both ids are equal and
    /// [`GraphError::UnknownRecord`] for ids outside this graph.
    pub fn add_genetic_link(&mut self, a: RecordId, b: RecordId) -> Result<bool, GraphError> {
        if a == b {
            return Err(GraphError::SelfLink(a));
        }
        self.record_mut(b)?;
        let inserted = self.record_mut(a)?.links.insert(b);
        if inserted {
            self.records[b.index()].links.insert(a);
            self.link_count += 1;
            log::trace!("Linked {} <-> {}", a, b);
        }
        Ok(inserted)
    }

    /// Records linked to `id`, in ascending order.
    pub fn links_of(&self, id: RecordId) -> Vec<RecordId> {
        self.record(id)
            .map(|r| r.links().collect())
            .unwrap_or_default()
    }

    /// Whether two records share a genetic link.
    #[must_use]
    pub fn has_link(&self, a: RecordId, b: RecordId) -> bool {
        self.record(a).is_some_and(|r| r.links.contains(&b))
    }

    /// Every link exactly once, as `(lower, higher)` pairs.
    pub fn links(&self) -> impl Iterator<Item = (RecordId, RecordId)> + '_ {
        self.records.iter().flat_map(|r| {
            r.links
                .iter()
                .filter(move |other| r.id < **other)
                .map(move |other| (r.id, *other))
        })
    }

    fn record_mut(&mut self, id: RecordId) -> Result<&mut Record, GraphError> {
        self.records
            .get_mut(id.index())
            .ok_or(GraphError::UnknownRecord(id))
    }
}
