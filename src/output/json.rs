//! JSON export of a resolved record graph.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "generated_at": "2026-01-01T12:00:00+00:00",
//!   "root": "/archive/accession-42",
//!   "records": [
//!     {
//!       "id": 0,
//!       "merged_into": null,
//!       "instantiations": ["/archive/accession-42/a.txt", "/archive/accession-42/b.txt"],
//!       "extents": [{ "kind": "FuzzyHash", "value": "24:abc...:def..." }],
//!       "links": [2]
//!     }
//!   ],
//!   "summary": {
//!     "candidates": 3,
//!     "total_bytes": 48213,
//!     "merges": 1,
//!     "links": 1,
//!     "skipped": []
//!   }
//! }
//! ```
//!
//! Every record is exported, merged ones included, in ascending id order.
//! Perceptual extents are written as unsigned 64-bit integers.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::graph::{Fingerprint, Record, RecordGraph};
use crate::resolve::{PhaseStats, RunSummary, SkippedFile};

/// A typed extent in JSON format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonExtent {
    /// Extent kind name (`FuzzyHash` or `PerceptualHash`)
    pub kind: String,
    /// Fingerprint value: a string for fuzzy, a number for perceptual
    pub value: serde_json::Value,
}

impl From<&Fingerprint> for JsonExtent {
    fn from(fingerprint: &Fingerprint) -> Self {
        let value = match fingerprint {
            Fingerprint::Fuzzy(s) => serde_json::Value::from(s.as_str()),
            Fingerprint::Perceptual(n) => serde_json::Value::from(*n),
        };
        Self {
            kind: fingerprint.kind().to_string(),
            value,
        }
    }
}

/// A single record in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRecord {
    /// Graph-internal record id
    pub id: u32,
    /// Id of the record that absorbed this one, if merged
    pub merged_into: Option<u32>,
    /// Paths of the instantiations this record owns
    pub instantiations: Vec<String>,
    /// Typed extents
    pub extents: Vec<JsonExtent>,
    /// Ids of linked records
    pub links: Vec<u32>,
}

impl JsonRecord {
    /// Build the JSON form of one record.
    #[must_use]
    pub fn from_record(graph: &RecordGraph, record: &Record) -> Self {
        Self {
            id: record.id().as_u32(),
            merged_into: record.merged_into().map(|id| id.as_u32()),
            instantiations: graph
                .instantiation_paths(record.id())
                .into_iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            extents: record.extents().map(JsonExtent::from).collect(),
            links: record.links().map(|id| id.as_u32()).collect(),
        }
    }
}

/// Statistics of one comparison phase in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPhase {
    /// Records holding this extent kind
    pub records: usize,
    /// Unordered pairs visited
    pub comparisons: usize,
    /// Pairs rejected by the compatibility gate
    pub incompatible: usize,
    /// Duplicate merges
    pub merges: usize,
    /// New genetic links
    pub links: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl From<&PhaseStats> for JsonPhase {
    fn from(stats: &PhaseStats) -> Self {
        Self {
            records: stats.records,
            comparisons: stats.comparisons,
            incompatible: stats.incompatible,
            merges: stats.merges,
            links: stats.links,
            duration_ms: stats.duration.as_millis() as u64,
        }
    }
}

/// Run summary in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files that passed selection
    pub candidates: usize,
    /// Total candidate size in bytes
    pub total_bytes: u64,
    /// Records in the graph, merged ones included
    pub records: usize,
    /// Records not merged into another
    pub live_records: usize,
    /// Fuzzy extents stored
    pub fuzzy_extents: usize,
    /// Perceptual extents stored
    pub perceptual_extents: usize,
    /// Total duplicate merges
    pub merges: usize,
    /// Total genetic links
    pub links: usize,
    /// Fuzzy comparison phase
    pub fuzzy: JsonPhase,
    /// Perceptual comparison phase
    pub perceptual: JsonPhase,
    /// Entries or extents left out
    pub skipped: Vec<SkippedFile>,
    /// Walk duration in milliseconds
    pub walk_duration_ms: u64,
    /// Fingerprint duration in milliseconds
    pub fingerprint_duration_ms: u64,
    /// Total duration in milliseconds
    pub total_duration_ms: u64,
}

impl JsonSummary {
    /// Create a JSON summary from a run summary and its graph.
    #[must_use]
    pub fn from_run_summary(summary: &RunSummary, graph: &RecordGraph) -> Self {
        Self {
            candidates: summary.candidates,
            total_bytes: summary.total_bytes,
            records: graph.len(),
            live_records: graph.records().filter(|r| !r.is_merged()).count(),
            fuzzy_extents: summary.fuzzy_extents,
            perceptual_extents: summary.perceptual_extents,
            merges: summary.merges(),
            links: graph.link_count(),
            fuzzy: JsonPhase::from(&summary.fuzzy),
            perceptual: JsonPhase::from(&summary.perceptual),
            skipped: summary.skipped.clone(),
            walk_duration_ms: summary.walk_duration.as_millis() as u64,
            fingerprint_duration_ms: summary.fingerprint_duration.as_millis() as u64,
            total_duration_ms: summary.total_duration.as_millis() as u64,
        }
    }
}

/// Complete JSON graph document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGraph {
    /// When the document was produced
    pub generated_at: DateTime<Utc>,
    /// Scan root
    pub root: String,
    /// Every record in ascending id order
    pub records: Vec<JsonRecord>,
    /// Run statistics
    pub summary: JsonSummary,
}

impl JsonGraph {
    /// Snapshot a graph and its run summary.
    #[must_use]
    pub fn new(root: &Path, graph: &RecordGraph, summary: &RunSummary) -> Self {
        Self {
            generated_at: Utc::now(),
            root: root.to_string_lossy().into_owned(),
            records: graph
                .records()
                .map(|record| JsonRecord::from_record(graph, record))
                .collect(),
            summary: JsonSummary::from_run_summary(summary, graph),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// Write JSON to a file, creating or truncating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_file(&self, path: &Path, pretty: bool) -> Result<(), JsonOutputError> {
        let file = std::fs::File::create(path).map_err(|source| JsonOutputError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = std::io::BufWriter::new(file);
        self.write_to(&mut writer, pretty)?;
        writer.flush()?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The output file could not be created
    #[error("Cannot create {path}: {source}")]
    Create {
        /// Output path
        path: std::path::PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
