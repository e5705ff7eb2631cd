//! Export of a resolved record graph.
//!
//! The graph is written as a single JSON document: every record with its
//! instantiation paths, extents, and genetic links, followed by the run
//! summary.
//!
//! ```no_run
//! use recordlink::output::JsonGraph;
//! use recordlink::resolve::Resolver;
//! use std::path::Path;
//!
//! let root = Path::new("/archive/accession-42");
//! let (graph, summary) = Resolver::with_defaults().run(root).unwrap();
//! JsonGraph::new(root, &graph, &summary)
//!     .write_file(Path::new("graph.json"), true)
//!     .unwrap();
//! ```

pub mod json;

pub use json::{JsonGraph, JsonOutputError};
