//! recordlink - near-duplicate record linkage for document and image collections
//!
//! Walks a directory tree, fingerprints every qualifying file with a fuzzy
//! (ssdeep) hash and, for images, a perceptual hash, then folds identical
//! content into shared records and links records whose content is similar.

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod output;
pub mod progress;
pub mod resolve;
pub mod scanner;
pub mod signal;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, Commands, ScanArgs};
use crate::config::Config;
use crate::error::ExitCode;
use crate::output::JsonGraph;
use crate::progress::Progress;
use crate::resolve::{Resolver, RunSummary};
use crate::scanner::{default_content_types, ExtensionClassifier};

/// Run the application for parsed CLI arguments.
///
/// # Errors
///
/// Returns the first fatal error. Files skipped during the walk or while
/// fingerprinting are reported in the summary and do not fail the run.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Scan(ref args) => run_scan(&cli, args),
        Commands::ContentTypes => {
            print_content_types()?;
            Ok(ExitCode::Success)
        }
    }
}

fn run_scan(cli: &Cli, args: &ScanArgs) -> anyhow::Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref())?;
    args.apply_to(&mut config);
    config.validate()?;

    let handler = signal::install_handler();
    let mut resolver_config = config
        .resolver_config()
        .with_shutdown_flag(handler.flag());
    if !cli.quiet && !args.no_progress {
        resolver_config = resolver_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    log::info!("Resolving {}", args.input.display());
    let (graph, summary) = Resolver::new(resolver_config)
        .run(&args.input)
        .with_context(|| format!("Failed to resolve {}", args.input.display()))?;

    JsonGraph::new(&args.input, &graph, &summary)
        .write_file(&args.output, args.pretty)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    log_summary(&summary, graph.len());
    log::info!("Graph written to {}", args.output.display());
    Ok(ExitCode::Success)
}

fn log_summary(summary: &RunSummary, records: usize) {
    log::info!(
        "{} candidates ({}), {} records, {} merges, {} links",
        summary.candidates,
        summary.total_size_display(),
        records,
        summary.merges(),
        summary.links()
    );
    log::info!(
        "{} comparisons in {:.2?} (fuzzy {}, perceptual {})",
        summary.comparisons(),
        summary.total_duration,
        summary.fuzzy.comparisons,
        summary.perceptual.comparisons
    );
    if summary.skipped_files() > 0 {
        log::warn!("{} files skipped", summary.skipped_files());
        for skipped in &summary.skipped {
            log::debug!(
                "  skipped {} ({:?}): {}",
                skipped.path.display(),
                skipped.stage,
                skipped.reason
            );
        }
    }
}

fn print_content_types() -> anyhow::Result<()> {
    let defaults = default_content_types();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for (extension, content_type) in ExtensionClassifier::known_mappings() {
        let marker = if defaults.iter().any(|t| t == content_type) {
            "*"
        } else {
            " "
        };
        writeln!(out, "{marker} {extension:<6} {content_type}")?;
    }
    writeln!(out, "\n* selected by default")?;
    Ok(())
}
