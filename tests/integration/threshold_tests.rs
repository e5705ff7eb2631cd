use recordlink::graph::{ExtentKind, RecordGraph};
use recordlink::resolve::{Resolver, ResolverConfig, RunSummary, Thresholds};
use recordlink::scanner::{
    CandidateFile, FingerprintError, FuzzyFingerprinter, PerceptualFingerprinter,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

/// Fuzzy stub: the fingerprint is the first line of the file, scores come
/// from a fixed table.
struct ScriptedFuzzy {
    scores: HashMap<(String, String), u32>,
}

impl ScriptedFuzzy {
    fn new(pairs: &[(&str, &str, u32)]) -> Arc<Self> {
        let mut scores = HashMap::new();
        for (a, b, score) in pairs {
            scores.insert((a.to_string(), b.to_string()), *score);
            scores.insert((b.to_string(), a.to_string()), *score);
        }
        Arc::new(Self { scores })
    }
}

impl FuzzyFingerprinter for ScriptedFuzzy {
    fn fingerprint(&self, bytes: &[u8]) -> Option<String> {
        String::from_utf8_lossy(bytes)
            .lines()
            .next()
            .map(str::to_string)
    }

    fn similarity(&self, a: &str, b: &str) -> Option<u32> {
        if a == b {
            return Some(100);
        }
        Some(
            self.scores
                .get(&(a.to_string(), b.to_string()))
                .copied()
                .unwrap_or(0),
        )
    }
}

/// Perceptual stub: the hash is the second line of the file, in hex.
struct ScriptedPerceptual;

impl PerceptualFingerprinter for ScriptedPerceptual {
    fn fingerprint_file(&self, path: &Path) -> Result<u64, FingerprintError> {
        let text = fs::read_to_string(path).map_err(|e| FingerprintError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let line = text.lines().nth(1).unwrap_or_default();
        u64::from_str_radix(line.trim(), 16)
            .map_err(|_| FingerprintError::FuzzyHash(path.to_path_buf()))
    }
}

fn candidate(dir: &TempDir, name: &str, fuzzy: &str, perceptual: Option<u64>) -> CandidateFile {
    let path = dir.path().join(name);
    let mut body = format!("{fuzzy}\n");
    let content_type = match perceptual {
        Some(hash) => {
            body.push_str(&format!("{hash:016x}\n"));
            "image/png"
        }
        None => "text/plain",
    };
    body.push_str(&"x".repeat(1200));
    fs::write(&path, &body).unwrap();
    CandidateFile::new(path, body.len() as u64, content_type)
}

fn run(
    thresholds: Thresholds,
    fuzzy: Arc<ScriptedFuzzy>,
    files: &[CandidateFile],
) -> (RecordGraph, RunSummary) {
    Resolver::new(ResolverConfig::default().with_thresholds(thresholds))
        .with_fuzzy_fingerprinter(fuzzy)
        .with_perceptual_fingerprinter(Arc::new(ScriptedPerceptual))
        .run_from_files(files.to_vec())
        .unwrap()
}

fn record(graph: &RecordGraph, file: &CandidateFile) -> recordlink::graph::RecordId {
    graph.record_for_path(&file.path).unwrap()
}

#[test]
fn test_fuzzy_link_threshold_is_exclusive() {
    let dir = tempdir().unwrap();
    let files = vec![
        candidate(&dir, "a.txt", "3:aaaa:a", None),
        candidate(&dir, "b.txt", "3:bbbb:b", None),
        candidate(&dir, "c.txt", "3:cccc:c", None),
    ];
    let fuzzy = ScriptedFuzzy::new(&[("3:aaaa:a", "3:bbbb:b", 50), ("3:aaaa:a", "3:cccc:c", 49)]);

    let (graph, summary) = run(Thresholds::default(), fuzzy, &files);

    let (a, b, c) = (
        record(&graph, &files[0]),
        record(&graph, &files[1]),
        record(&graph, &files[2]),
    );
    assert!(graph.has_link(a, b));
    assert!(!graph.has_link(a, c));
    assert!(!graph.has_link(b, c));
    assert_eq!(summary.fuzzy.links, 1);
    assert_eq!(summary.fuzzy.merges, 0);
}

#[test]
fn test_merge_threshold_is_inclusive() {
    let dir = tempdir().unwrap();
    let files = vec![
        candidate(&dir, "a.txt", "3:aaaa:a", None),
        candidate(&dir, "b.txt", "3:bbbb:b", None),
        candidate(&dir, "c.txt", "3:cccc:c", None),
    ];
    let fuzzy = ScriptedFuzzy::new(&[("3:aaaa:a", "3:bbbb:b", 90), ("3:aaaa:a", "3:cccc:c", 89)]);
    let thresholds = Thresholds {
        merge: 90,
        ..Thresholds::default()
    };

    let (graph, summary) = run(thresholds, fuzzy, &files);

    let (a, b, c) = (
        record(&graph, &files[0]),
        record(&graph, &files[1]),
        record(&graph, &files[2]),
    );
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(graph.has_link(a, c));
    assert_eq!(summary.fuzzy.merges, 1);
}

#[test]
fn test_default_merge_needs_a_perfect_score() {
    let dir = tempdir().unwrap();
    let files = vec![
        candidate(&dir, "a.txt", "3:aaaa:a", None),
        candidate(&dir, "b.txt", "3:bbbb:b", None),
    ];
    let fuzzy = ScriptedFuzzy::new(&[("3:aaaa:a", "3:bbbb:b", 99)]);

    let (graph, summary) = run(Thresholds::default(), fuzzy, &files);

    assert_ne!(record(&graph, &files[0]), record(&graph, &files[1]));
    assert_eq!(summary.fuzzy.merges, 0);
    assert_eq!(summary.fuzzy.links, 1);
}

#[test]
fn test_block_size_gate() {
    let dir = tempdir().unwrap();
    let files = vec![
        candidate(&dir, "two.txt", "2:aaaa:a", None),
        candidate(&dir, "three.txt", "3:bbbb:b", None),
        candidate(&dir, "four.txt", "4:cccc:c", None),
    ];
    let fuzzy = ScriptedFuzzy::new(&[
        ("2:aaaa:a", "3:bbbb:b", 95),
        ("2:aaaa:a", "4:cccc:c", 95),
        ("3:bbbb:b", "4:cccc:c", 95),
    ]);

    let (graph, summary) = run(Thresholds::default(), fuzzy, &files);

    let (two, three, four) = (
        record(&graph, &files[0]),
        record(&graph, &files[1]),
        record(&graph, &files[2]),
    );
    // 2 and 4 differ by a factor of two, the others are gated
    assert!(graph.has_link(two, four));
    assert!(!graph.has_link(two, three));
    assert!(!graph.has_link(three, four));
    assert_eq!(summary.fuzzy.comparisons, 3);
    assert_eq!(summary.fuzzy.incompatible, 2);
}

#[test]
fn test_chained_duplicates_collapse_to_one_record() {
    let dir = tempdir().unwrap();
    let files = vec![
        candidate(&dir, "a.txt", "3:same:s", None),
        candidate(&dir, "b.txt", "3:same:s", None),
        candidate(&dir, "c.txt", "3:same:s", None),
    ];

    let (graph, summary) = run(Thresholds::default(), ScriptedFuzzy::new(&[]), &files);

    let owner = record(&graph, &files[0]);
    assert_eq!(record(&graph, &files[1]), owner);
    assert_eq!(record(&graph, &files[2]), owner);
    assert_eq!(graph.instantiation_paths(owner).len(), 3);
    assert_eq!(summary.fuzzy.comparisons, 3);
    assert_eq!(summary.fuzzy.merges, 2);
    assert_eq!(graph.link_count(), 0);
}

#[test]
fn test_lowest_record_survives_non_transitive_merges() {
    let dir = tempdir().unwrap();
    let files = vec![
        candidate(&dir, "a.txt", "3:aaaa:a", None),
        candidate(&dir, "b.txt", "3:bbbb:b", None),
        candidate(&dir, "c.txt", "3:cccc:c", None),
    ];
    // a and b both match c exactly but only resemble each other
    let fuzzy = ScriptedFuzzy::new(&[
        ("3:aaaa:a", "3:bbbb:b", 60),
        ("3:aaaa:a", "3:cccc:c", 100),
        ("3:bbbb:b", "3:cccc:c", 100),
    ]);

    let (graph, summary) = run(Thresholds::default(), fuzzy, &files);

    let owner = record(&graph, &files[0]);
    assert_eq!(owner.as_u32(), 0);
    assert_eq!(record(&graph, &files[1]), owner);
    assert_eq!(record(&graph, &files[2]), owner);
    assert!(graph.record(owner).unwrap().merged_into().is_none());
    assert_eq!(graph.instantiation_paths(owner).len(), 3);
    assert_eq!(summary.fuzzy.merges, 2);
}

#[test]
fn test_perceptual_link_threshold() {
    let base: u64 = 0x0123_4567_89ab_cdef;
    // 18 differing bits scores 71, 19 scores 70
    let near = base ^ 0x3_ffff;
    let far = base ^ (0x7_ffff_u64 << 40);

    let dir = tempdir().unwrap();
    let files = vec![
        candidate(&dir, "base.png", "3:aaaa:a", Some(base)),
        candidate(&dir, "near.png", "3:bbbb:b", Some(near)),
        candidate(&dir, "far.png", "3:cccc:c", Some(far)),
    ];

    let (graph, summary) = run(Thresholds::default(), ScriptedFuzzy::new(&[]), &files);

    let (b, n, f) = (
        record(&graph, &files[0]),
        record(&graph, &files[1]),
        record(&graph, &files[2]),
    );
    assert!(graph.has_link(b, n));
    assert!(!graph.has_link(b, f));
    assert_eq!(summary.perceptual_extents, 3);
    assert_eq!(summary.perceptual.comparisons, 3);
    assert_eq!(summary.perceptual.links, 1);
    assert_eq!(summary.fuzzy.links, 0);
}

#[test]
fn test_perceptual_never_merges() {
    let dir = tempdir().unwrap();
    let files = vec![
        candidate(&dir, "a.png", "3:aaaa:a", Some(42)),
        candidate(&dir, "b.png", "3:bbbb:b", Some(42)),
    ];

    let (graph, summary) = run(Thresholds::default(), ScriptedFuzzy::new(&[]), &files);

    let (a, b) = (record(&graph, &files[0]), record(&graph, &files[1]));
    assert_ne!(a, b);
    assert!(graph.has_link(a, b));
    assert_eq!(summary.perceptual.merges, 0);
}

#[test]
fn test_perceptual_link_skipped_for_merged_records() {
    let dir = tempdir().unwrap();
    let files = vec![
        candidate(&dir, "a.png", "3:same:s", Some(7)),
        candidate(&dir, "b.png", "3:same:s", Some(7)),
    ];

    let (graph, summary) = run(Thresholds::default(), ScriptedFuzzy::new(&[]), &files);

    let owner = record(&graph, &files[0]);
    assert_eq!(record(&graph, &files[1]), owner);
    assert_eq!(summary.fuzzy.merges, 1);
    // The merged record keeps its extent; the pair resolves to one owner
    assert_eq!(summary.perceptual.records, 2);
    assert_eq!(summary.perceptual.comparisons, 1);
    assert_eq!(summary.perceptual.links, 0);
    assert_eq!(graph.link_count(), 0);
    assert!(graph
        .records_with_extent(ExtentKind::PerceptualHash)
        .contains(&owner));
}
