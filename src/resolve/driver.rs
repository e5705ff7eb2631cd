//! Pairwise resolution driver.
//!
//! # Overview
//!
//! A run has three stages:
//! 1. **Walk** - select candidate files under the root (see [`crate::scanner::walker`])
//! 2. **Fingerprint** - compute a fuzzy extent for every candidate and a
//!    perceptual extent for every decodable image
//! 3. **Compare** - once per extent kind, score every unordered pair of
//!    records holding that kind and merge or link according to [`Thresholds`]
//!
//! Fingerprints are computed on a bounded rayon pool and applied to the
//! graph by a single writer in candidate order. Pair scores are computed in
//! parallel against a read-only snapshot, then merges and links are applied
//! serially in pair order, so a run is deterministic for a given file set.
//!
//! # Example
//!
//! ```no_run
//! use recordlink::resolve::{Resolver, ResolverConfig, Thresholds};
//! use std::path::Path;
//!
//! let config = ResolverConfig::default().with_thresholds(Thresholds {
//!     fuzzy_link: 60,
//!     ..Thresholds::default()
//! });
//! let resolver = Resolver::new(config);
//!
//! match resolver.run(Path::new(".")) {
//!     Ok((graph, summary)) => println!("{} records, {} skipped", graph.len(), summary.skipped.len()),
//!     Err(e) => eprintln!("Run failed: {}", e),
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;
use serde::Serialize;

use super::comparator::{blocks_compatible, Comparator, Thresholds, Verdict};
use super::ResolveError;
use crate::graph::{ExtentKind, Fingerprint, RecordGraph, RecordId};
use crate::progress::ProgressCallback;
use crate::scanner::{
    block_size, CandidateFile, ContentClassifier, ExtensionClassifier, FingerprintError,
    FuzzyFingerprinter, PerceptualAlgorithm, PerceptualFingerprinter, PerceptualHasher,
    SelectorConfig, SsdeepFingerprinter, Walker,
};

/// Configuration for a resolution run.
#[derive(Clone)]
pub struct ResolverConfig {
    /// Number of I/O threads for parallel fingerprinting.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Abort on the first walk or fingerprint error instead of skipping.
    pub strict: bool,
    /// Score cutoffs for merges and links.
    pub thresholds: Thresholds,
    /// Candidate selection rules.
    pub selector: SelectorConfig,
    /// Compute perceptual extents for images.
    pub perceptual: bool,
    /// Perceptual hash algorithm.
    pub perceptual_algorithm: PerceptualAlgorithm,
    /// Optional shutdown flag for cooperative cancellation.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ResolverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverConfig")
            .field("io_threads", &self.io_threads)
            .field("strict", &self.strict)
            .field("thresholds", &self.thresholds)
            .field("selector", &self.selector)
            .field("perceptual", &self.perceptual)
            .field("perceptual_algorithm", &self.perceptual_algorithm)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            strict: false,
            thresholds: Thresholds::default(),
            selector: SelectorConfig::default(),
            perceptual: true,
            perceptual_algorithm: PerceptualAlgorithm::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl ResolverConfig {
    /// Set the I/O thread count (at least one).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set fail-fast on any error.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the score cutoffs.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the candidate selection rules.
    #[must_use]
    pub fn with_selector(mut self, selector: SelectorConfig) -> Self {
        self.selector = selector;
        self
    }

    /// Enable or disable perceptual fingerprints.
    #[must_use]
    pub fn with_perceptual(mut self, enabled: bool) -> Self {
        self.perceptual = enabled;
        self
    }

    /// Set the perceptual hash algorithm.
    #[must_use]
    pub fn with_perceptual_algorithm(mut self, algorithm: PerceptualAlgorithm) -> Self {
        self.perceptual_algorithm = algorithm;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Where a skipped file failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipStage {
    /// The walk could not read the entry.
    Walk,
    /// The fuzzy fingerprint could not be computed.
    Fuzzy,
    /// The image could not be decoded or hashed.
    Perceptual,
}

/// A file, or one extent of a file, left out of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    /// Path of the affected entry
    pub path: PathBuf,
    /// Stage that failed
    pub stage: SkipStage,
    /// Human-readable reason
    pub reason: String,
}

/// Statistics from one comparison phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseStats {
    /// Extent kind compared in this phase
    pub kind: ExtentKind,
    /// Records holding an extent of this kind
    pub records: usize,
    /// Unordered pairs visited
    pub comparisons: usize,
    /// Pairs skipped by the compatibility gate (fuzzy only)
    pub incompatible: usize,
    /// Duplicate merges that moved at least one instantiation
    pub merges: usize,
    /// New genetic links
    pub links: usize,
    /// Wall time of the phase
    pub duration: Duration,
}

impl PhaseStats {
    fn new(kind: ExtentKind) -> Self {
        Self {
            kind,
            records: 0,
            comparisons: 0,
            incompatible: 0,
            merges: 0,
            links: 0,
            duration: Duration::ZERO,
        }
    }

    /// Pairs expected for `records` participants.
    #[must_use]
    pub fn expected_pairs(records: usize) -> usize {
        records * records.saturating_sub(1) / 2
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Files that passed selection
    pub candidates: usize,
    /// Total size of all candidates in bytes
    pub total_bytes: u64,
    /// Entries and extents left out, with reasons
    pub skipped: Vec<SkippedFile>,
    /// Fuzzy extents stored
    pub fuzzy_extents: usize,
    /// Perceptual extents stored
    pub perceptual_extents: usize,
    /// Fuzzy comparison phase
    pub fuzzy: PhaseStats,
    /// Perceptual comparison phase
    pub perceptual: PhaseStats,
    /// Time spent walking the root
    pub walk_duration: Duration,
    /// Time spent fingerprinting
    pub fingerprint_duration: Duration,
    /// Wall time of the whole run
    pub total_duration: Duration,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            candidates: 0,
            total_bytes: 0,
            skipped: Vec::new(),
            fuzzy_extents: 0,
            perceptual_extents: 0,
            fuzzy: PhaseStats::new(ExtentKind::FuzzyHash),
            perceptual: PhaseStats::new(ExtentKind::PerceptualHash),
            walk_duration: Duration::ZERO,
            fingerprint_duration: Duration::ZERO,
            total_duration: Duration::ZERO,
        }
    }
}

impl RunSummary {
    /// Total merges across phases.
    #[must_use]
    pub fn merges(&self) -> usize {
        self.fuzzy.merges + self.perceptual.merges
    }

    /// Total new links across phases.
    #[must_use]
    pub fn links(&self) -> usize {
        self.fuzzy.links + self.perceptual.links
    }

    /// Total pairs compared across phases.
    #[must_use]
    pub fn comparisons(&self) -> usize {
        self.fuzzy.comparisons + self.perceptual.comparisons
    }

    /// Distinct paths with at least one skip.
    #[must_use]
    pub fn skipped_files(&self) -> usize {
        self.skipped
            .iter()
            .map(|s| s.path.as_path())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_bytes).to_string()
    }

    fn phase_mut(&mut self, kind: ExtentKind) -> &mut PhaseStats {
        match kind {
            ExtentKind::FuzzyHash => &mut self.fuzzy,
            ExtentKind::PerceptualHash => &mut self.perceptual,
        }
    }
}

/// Fingerprints computed for one candidate, before graph insertion.
struct FileFingerprints {
    fuzzy: Result<String, FingerprintError>,
    perceptual: Option<Result<u64, FingerprintError>>,
}

/// A scored pair that changes the graph.
struct Decision {
    a: RecordId,
    b: RecordId,
    verdict: Verdict,
}

/// Orchestrates walk, fingerprint, and comparison phases.
pub struct Resolver {
    config: ResolverConfig,
    classifier: Arc<dyn ContentClassifier>,
    fuzzy: Arc<dyn FuzzyFingerprinter>,
    perceptual: Arc<dyn PerceptualFingerprinter>,
    pool: Option<rayon::ThreadPool>,
}

impl Resolver {
    /// Create a resolver with the default classifier and fingerprinters.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(config.io_threads.max(1))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!(
                    "Failed to create custom thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                None
            }
        };

        Self {
            perceptual: Arc::new(PerceptualHasher::new(config.perceptual_algorithm)),
            classifier: Arc::new(ExtensionClassifier::new()),
            fuzzy: Arc::new(SsdeepFingerprinter::new()),
            config,
            pool,
        }
    }

    /// Create a resolver with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ResolverConfig::default())
    }

    /// Replace the content-type classifier used by the walk.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn ContentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Replace the fuzzy fingerprinter.
    #[must_use]
    pub fn with_fuzzy_fingerprinter(mut self, fuzzy: Arc<dyn FuzzyFingerprinter>) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    /// Replace the perceptual fingerprinter.
    #[must_use]
    pub fn with_perceptual_fingerprinter(
        mut self,
        perceptual: Arc<dyn PerceptualFingerprinter>,
    ) -> Self {
        self.perceptual = perceptual;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match self.pool {
            Some(ref pool) => pool.install(op),
            None => op(),
        }
    }

    fn check_shutdown(&self) -> Result<(), ResolveError> {
        if self.config.is_shutdown_requested() {
            log::info!("Shutdown requested, abandoning run");
            return Err(ResolveError::Interrupted);
        }
        Ok(())
    }

    /// Walk `root` and resolve every candidate found.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if:
    /// - The root does not exist, is not a directory, or cannot be listed
    /// - The thresholds are invalid
    /// - The run is interrupted by the shutdown flag
    /// - Strict mode is on and any entry or fingerprint fails
    pub fn run(&self, root: &Path) -> Result<(RecordGraph, RunSummary), ResolveError> {
        let start_time = Instant::now();
        self.validate_root(root)?;
        self.config
            .thresholds
            .validate()
            .map_err(ResolveError::InvalidThresholds)?;

        log::info!("Starting resolution of {}", root.display());
        self.check_shutdown()?;

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Walking {}", root.display()));
        }

        let mut walker = Walker::new(root, self.config.selector.clone())
            .with_classifier(self.classifier.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let mut files = Vec::new();
        let mut skipped = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(files.len() + 1, &file.path.to_string_lossy());
                    }
                    files.push(file);
                }
                Err(e) => {
                    if self.config.strict {
                        return Err(ResolveError::Scan(e));
                    }
                    log::warn!("Skipping {}: {}", e.path().display(), e);
                    skipped.push(SkippedFile {
                        path: e.path().to_path_buf(),
                        stage: SkipStage::Walk,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }
        self.check_shutdown()?;

        let walk_duration = start_time.elapsed();
        let (graph, mut summary) = self.resolve_candidates(files, skipped)?;
        summary.walk_duration = walk_duration;
        summary.total_duration = start_time.elapsed();

        log_summary(&summary);
        Ok((graph, summary))
    }

    /// Resolve an explicit candidate list, skipping the walk.
    ///
    /// Later entries repeating an earlier path are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] on invalid thresholds, interruption, or a
    /// fingerprint error in strict mode.
    pub fn run_from_files(
        &self,
        files: Vec<CandidateFile>,
    ) -> Result<(RecordGraph, RunSummary), ResolveError> {
        let start_time = Instant::now();
        self.config
            .thresholds
            .validate()
            .map_err(ResolveError::InvalidThresholds)?;
        self.check_shutdown()?;

        let (graph, mut summary) = self.resolve_candidates(files, Vec::new())?;
        summary.total_duration = start_time.elapsed();

        log_summary(&summary);
        Ok((graph, summary))
    }

    fn validate_root(&self, root: &Path) -> Result<(), ResolveError> {
        if !root.exists() {
            return Err(ResolveError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ResolveError::NotADirectory(root.to_path_buf()));
        }
        std::fs::read_dir(root).map_err(|source| ResolveError::UnreadableRoot {
            path: root.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    fn resolve_candidates(
        &self,
        files: Vec<CandidateFile>,
        skipped: Vec<SkippedFile>,
    ) -> Result<(RecordGraph, RunSummary), ResolveError> {
        let mut seen = HashSet::new();
        let files: Vec<CandidateFile> = files
            .into_iter()
            .filter(|f| seen.insert(f.path.clone()))
            .collect();

        let mut summary = RunSummary {
            candidates: files.len(),
            total_bytes: files.iter().map(|f| f.size).sum(),
            skipped,
            ..RunSummary::default()
        };
        log::info!(
            "Found {} candidate files ({})",
            summary.candidates,
            summary.total_size_display()
        );

        let mut graph = RecordGraph::new();

        let fingerprint_start = Instant::now();
        self.fingerprint_phase(&files, &mut graph, &mut summary)?;
        summary.fingerprint_duration = fingerprint_start.elapsed();

        for kind in ExtentKind::ALL {
            if kind == ExtentKind::PerceptualHash && !self.config.perceptual {
                continue;
            }
            let stats = self.compare_kind(&mut graph, kind)?;
            *summary.phase_mut(kind) = stats;
        }

        Ok((graph, summary))
    }

    /// Fingerprint every candidate and store the results in `graph`.
    fn fingerprint_phase(
        &self,
        files: &[CandidateFile],
        graph: &mut RecordGraph,
        summary: &mut RunSummary,
    ) -> Result<(), ResolveError> {
        if files.is_empty() {
            log::debug!("Fingerprint phase: no candidates");
            return Ok(());
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("fingerprint", files.len());
        }
        log::info!("Fingerprinting {} files", files.len());

        let results: Vec<Option<FileFingerprints>> = self.install(|| {
            files
                .par_iter()
                .enumerate()
                .map(|(idx, file)| {
                    if self.config.is_shutdown_requested() {
                        return None;
                    }
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(idx + 1, &file.path.to_string_lossy());
                    }

                    let fingerprints = self.fingerprint_file(file);

                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_item_completed(file.size);
                    }
                    Some(fingerprints)
                })
                .collect()
        });

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("fingerprint");
        }
        self.check_shutdown()?;

        // Single writer, candidate order
        for (file, result) in files.iter().zip(results) {
            let Some(fingerprints) = result else {
                return Err(ResolveError::Interrupted);
            };
            let record = graph.get_or_create_record(&file.path)?;

            match fingerprints.fuzzy {
                Ok(value) => {
                    graph.add_extent(record, Fingerprint::Fuzzy(value))?;
                    summary.fuzzy_extents += 1;
                }
                Err(e) => self.skip(summary, e, SkipStage::Fuzzy)?,
            }

            match fingerprints.perceptual {
                Some(Ok(value)) => {
                    graph.add_extent(record, Fingerprint::Perceptual(value))?;
                    summary.perceptual_extents += 1;
                }
                Some(Err(e)) => self.skip(summary, e, SkipStage::Perceptual)?,
                None => {}
            }
        }

        log::info!(
            "Fingerprint phase: {} fuzzy, {} perceptual extents",
            summary.fuzzy_extents,
            summary.perceptual_extents
        );
        Ok(())
    }

    fn fingerprint_file(&self, file: &CandidateFile) -> FileFingerprints {
        let fuzzy = self.fuzzy.fingerprint_file(&file.path);
        if let Ok(ref value) = fuzzy {
            log::trace!("Fuzzy {}: {}", file.path.display(), value);
        }

        let perceptual = (self.config.perceptual && file.is_image())
            .then(|| self.perceptual.fingerprint_file(&file.path));

        FileFingerprints { fuzzy, perceptual }
    }

    fn skip(
        &self,
        summary: &mut RunSummary,
        error: FingerprintError,
        stage: SkipStage,
    ) -> Result<(), ResolveError> {
        if self.config.strict {
            return Err(ResolveError::Fingerprint(error));
        }
        log::warn!("Skipping extent for {}: {}", error.path().display(), error);
        summary.skipped.push(SkippedFile {
            path: error.path().to_path_buf(),
            stage,
            reason: error.to_string(),
        });
        Ok(())
    }

    /// Compare every unordered pair of records holding an extent of `kind`.
    ///
    /// Records are taken in ascending id order and each pair `(i, j)` with
    /// `i < j` is visited once, so `k` records yield exactly `k(k-1)/2`
    /// comparisons. On a merge the lower-id record survives.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Interrupted`] if the shutdown flag is raised
    /// before the phase completes.
    pub fn compare_kind(
        &self,
        graph: &mut RecordGraph,
        kind: ExtentKind,
    ) -> Result<PhaseStats, ResolveError> {
        let start = Instant::now();
        let phase = format!("compare:{}", kind.as_str());
        let mut stats = PhaseStats::new(kind);

        let records = graph.records_with_extent(kind);
        stats.records = records.len();
        if records.len() < 2 {
            log::debug!("{}: fewer than two records, nothing to compare", phase);
            stats.duration = start.elapsed();
            return Ok(stats);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(&phase, records.len());
        }
        log::info!(
            "{}: comparing {} records ({} pairs)",
            phase,
            records.len(),
            PhaseStats::expected_pairs(records.len())
        );

        let (decisions, comparisons, incompatible) = {
            let extents: Vec<&Fingerprint> = records
                .iter()
                .filter_map(|id| graph.get_extent(*id, kind))
                .collect();
            self.score_pairs(&records, &extents, kind, &phase)
        };

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(&phase);
        }
        self.check_shutdown()?;

        stats.comparisons = comparisons;
        stats.incompatible = incompatible;

        for decision in decisions {
            match decision.verdict {
                Verdict::Merge => {
                    // Scores need not be transitive, so the pair may meet as
                    // roots in either order; the lower id always survives
                    let a = graph.resolve(decision.a);
                    let b = graph.resolve(decision.b);
                    if a == b {
                        continue;
                    }
                    let outcome = graph.merge_as_duplicate(a.min(b), a.max(b))?;
                    if outcome.moved > 0 {
                        stats.merges += 1;
                    }
                }
                Verdict::Link => {
                    // Links land on the records that own the files now
                    let a = graph.resolve(decision.a);
                    let b = graph.resolve(decision.b);
                    if a == b {
                        log::trace!("{} and {} already merged, not linking", decision.a, decision.b);
                        continue;
                    }
                    if graph.add_genetic_link(a, b)? {
                        stats.links += 1;
                    }
                }
                Verdict::Unrelated => {}
            }
        }

        stats.duration = start.elapsed();
        log::info!(
            "{}: {} comparisons, {} merges, {} links",
            phase,
            stats.comparisons,
            stats.merges,
            stats.links
        );
        Ok(stats)
    }

    /// Score all pairs in parallel. Returns the graph-changing decisions in
    /// pair order, the number of pairs visited, and the gated count.
    fn score_pairs(
        &self,
        records: &[RecordId],
        extents: &[&Fingerprint],
        kind: ExtentKind,
        phase: &str,
    ) -> (Vec<Decision>, usize, usize) {
        let comparator = Comparator::new(self.fuzzy.as_ref());
        let thresholds = self.config.thresholds;

        let rows: Vec<Option<(Vec<Decision>, usize, usize)>> = self.install(|| {
            (0..extents.len())
                .into_par_iter()
                .map(|i| {
                    if self.config.is_shutdown_requested() {
                        return None;
                    }
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(i + 1, &records[i].to_string());
                    }

                    let mut decisions = Vec::new();
                    let mut incompatible = 0;
                    for j in (i + 1)..extents.len() {
                        if let (Some(a), Some(b)) = (extents[i].as_fuzzy(), extents[j].as_fuzzy())
                        {
                            if !blocks_compatible(block_size(a), block_size(b)) {
                                incompatible += 1;
                                continue;
                            }
                        }

                        let score = comparator.similarity(extents[i], extents[j]);
                        let verdict = thresholds.verdict(kind, score);
                        log::trace!(
                            "{}: {} vs {} scored {} ({:?})",
                            phase,
                            records[i],
                            records[j],
                            score,
                            verdict
                        );
                        if verdict != Verdict::Unrelated {
                            decisions.push(Decision {
                                a: records[i],
                                b: records[j],
                                verdict,
                            });
                        }
                    }
                    Some((decisions, extents.len() - i - 1, incompatible))
                })
                .collect()
        });

        let mut decisions = Vec::new();
        let mut comparisons = 0;
        let mut incompatible = 0;
        for (row, visited, gated) in rows.into_iter().flatten() {
            decisions.extend(row);
            comparisons += visited;
            incompatible += gated;
        }
        (decisions, comparisons, incompatible)
    }
}

fn log_summary(summary: &RunSummary) {
    log::info!(
        "Resolved {} candidates ({}): {} merges, {} links, {} comparisons, {} skipped in {:.2?}",
        summary.candidates,
        summary.total_size_display(),
        summary.merges(),
        summary.links(),
        summary.comparisons(),
        summary.skipped_files(),
        summary.total_duration
    );
}
