//! Command-line interface definitions for recordlink.
//!
//! Global options (verbosity, config file, error format) apply to every
//! subcommand.
//!
//! # Example
//!
//! ```bash
//! # Resolve an accession and write the graph
//! recordlink scan /archive/accession-42 graph.json
//!
//! # Tighter linking, more threads, pretty output
//! recordlink scan /archive/accession-42 graph.json --fuzzy-link 70 --io-threads 8 --pretty
//!
//! # Only PDFs and plain text, larger than 4 KiB
//! recordlink scan ./docs out.json --content-type application/pdf --content-type text/plain --min-size 4KiB
//!
//! # Show the extension table
//! recordlink content-types
//! ```

use std::path::PathBuf;

use bytesize::ByteSize;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::scanner::PerceptualAlgorithm;

/// Fingerprint a document and image collection and link near-duplicate records.
#[derive(Debug, Parser)]
#[command(name = "recordlink")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a TOML config file
    #[arg(long, value_name = "PATH", global = true, env = "RECORDLINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Report failures as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve a directory tree into a record graph
    Scan(ScanArgs),
    /// List known extensions and the content types selected by default
    ContentTypes,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(value_name = "INPUT_DIR")]
    pub input: PathBuf,

    /// File to write the graph document to
    #[arg(value_name = "OUTPUT_FILE")]
    pub output: PathBuf,

    /// Files must be strictly larger than this (e.g., 1000, 4KiB, 1MB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 100MB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Allowed content type (repeatable; replaces the configured set)
    #[arg(long = "content-type", value_name = "TYPE")]
    pub content_types: Vec<String>,

    /// Link when the fuzzy score is strictly greater than N
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(0..=100))]
    pub fuzzy_link: Option<u32>,

    /// Link when the perceptual score is strictly greater than N
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(0..=100))]
    pub perceptual_link: Option<u32>,

    /// Merge when the fuzzy score is at least N
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(0..=100))]
    pub merge: Option<u32>,

    /// Number of fingerprinting threads
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Abort on the first unreadable entry or failed fingerprint
    #[arg(long)]
    pub strict: bool,

    /// Follow symbolic links during the walk
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip perceptual fingerprints for images
    #[arg(long)]
    pub no_perceptual: bool,

    /// Perceptual hash algorithm
    #[arg(long, value_enum, value_name = "ALG")]
    pub perceptual_algorithm: Option<AlgorithmArg>,

    /// Pretty-print the graph document
    #[arg(long)]
    pub pretty: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}

impl ScanArgs {
    /// Apply flags that were given on top of a loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(min) = self.min_size {
            config.min_size = min;
        }
        if self.max_size.is_some() {
            config.max_size = self.max_size;
        }
        if !self.content_types.is_empty() {
            config.content_types = self.content_types.clone();
        }
        if let Some(value) = self.fuzzy_link {
            config.thresholds.fuzzy_link = value;
        }
        if let Some(value) = self.perceptual_link {
            config.thresholds.perceptual_link = value;
        }
        if let Some(value) = self.merge {
            config.thresholds.merge = value;
        }
        if let Some(threads) = self.io_threads {
            config.io_threads = threads;
        }
        if let Some(algorithm) = self.perceptual_algorithm {
            config.perceptual_algorithm = algorithm.into();
        }
        config.strict |= self.strict;
        config.follow_symlinks |= self.follow_symlinks;
        if self.no_perceptual {
            config.perceptual = false;
        }
    }
}

/// Perceptual hash algorithm choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    /// DCT-based, most resilient to transformations
    Phash,
    /// Gradient-based, fast
    Dhash,
    /// Mean-based, fastest
    Ahash,
}

impl From<AlgorithmArg> for PerceptualAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Phash => PerceptualAlgorithm::Phash,
            AlgorithmArg::Dhash => PerceptualAlgorithm::Dhash,
            AlgorithmArg::Ahash => PerceptualAlgorithm::Ahash,
        }
    }
}

/// Parse a human-readable size such as `1000`, `4KiB`, or `1.5MB`.
///
/// Decimal suffixes (KB, MB) are powers of 1000, binary suffixes (KiB, MiB)
/// powers of 1024.
///
/// # Errors
///
/// Returns an error message if the input is not a size.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    s.parse::<ByteSize>()
        .map(|size| size.as_u64())
        .map_err(|e| format!("Invalid size '{s}': {e}"))
}
