//! Entity resolution over fingerprinted records.
//!
//! # Overview
//!
//! - [`comparator`]: per-kind compatibility gates, similarity scores, and
//!   the [`Thresholds`] that turn scores into merges and links
//! - [`driver`]: the [`Resolver`] that walks a root, fingerprints every
//!   candidate into a [`RecordGraph`](crate::graph::RecordGraph), and runs
//!   one all-pairs comparison phase per extent kind
//!
//! # Example
//!
//! ```no_run
//! use recordlink::resolve::{Resolver, ResolverConfig};
//! use std::path::Path;
//!
//! let resolver = Resolver::new(ResolverConfig::default().with_io_threads(2));
//! let (graph, summary) = resolver.run(Path::new("/archive/accession-42")).unwrap();
//!
//! println!("{} records, {} links", graph.len(), graph.link_count());
//! println!("{} merges", summary.merges());
//! ```

pub mod comparator;
pub mod driver;

use std::path::PathBuf;

pub use comparator::{blocks_compatible, Comparator, Thresholds, Verdict};
pub use driver::{PhaseStats, Resolver, ResolverConfig, RunSummary, SkipStage, SkippedFile};

use crate::graph::GraphError;
use crate::scanner::{FingerprintError, ScanError};

/// Errors that end a resolution run.
#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    /// The run was cancelled by user (Ctrl+C or shutdown signal).
    #[error("Resolution interrupted by user")]
    Interrupted,

    /// The scan root does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The scan root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The scan root exists but cannot be listed.
    #[error("Cannot read {path}: {source}")]
    UnreadableRoot {
        /// The scan root
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Threshold configuration is unusable.
    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    /// A walk error in strict mode.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A fingerprint error in strict mode.
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    /// A graph invariant was violated.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl ResolveError {
    /// The stage of the run that failed.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Interrupted => "interrupted",
            Self::PathNotFound(_)
            | Self::NotADirectory(_)
            | Self::UnreadableRoot { .. }
            | Self::InvalidThresholds(_) => "configuration",
            Self::Scan(_) => "walk",
            Self::Fingerprint(_) => "fingerprint",
            Self::Graph(_) => "resolve",
        }
    }

    /// Whether the failure was caused by bad input rather than the run itself.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        self.stage() == "configuration"
    }
}
