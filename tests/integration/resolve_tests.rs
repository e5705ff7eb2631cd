use recordlink::graph::{ExtentKind, Fingerprint};
use recordlink::resolve::{PhaseStats, Resolver, ResolverConfig};
use recordlink::scanner::perceptual::similarity;
use recordlink::scanner::SelectorConfig;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const WORDS: &[&str] = &[
    "archive", "ledger", "minutes", "council", "harbour", "survey", "parish", "estate", "letter",
    "account", "deed", "charter", "river", "mill", "county", "school", "railway", "inventory",
    "petition", "register", "map", "plan", "notice", "tender", "receipt", "journal",
];

/// Deterministic pseudo-prose of roughly `bytes` length.
fn prose(seed: u64, bytes: usize) -> String {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut out = String::with_capacity(bytes + 16);
    while out.len() < bytes {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let word = WORDS[((state >> 33) % WORDS.len() as u64) as usize];
        out.push_str(word);
        out.push(if (state >> 20) % 11 == 0 { '\n' } else { ' ' });
    }
    out
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Low-amplitude per-pixel noise so encoded images stay well above the size floor.
fn noise(x: u32, y: u32) -> u8 {
    let h = (x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663)).wrapping_mul(2_654_435_761);
    (h >> 28) as u8
}

fn resolver() -> Resolver {
    Resolver::new(ResolverConfig::default().with_io_threads(2))
}

#[test]
fn test_resolve_empty_directory() {
    let dir = tempdir().unwrap();

    let (graph, summary) = resolver().run(dir.path()).unwrap();

    assert!(graph.is_empty());
    assert_eq!(summary.candidates, 0);
    assert_eq!(summary.comparisons(), 0);
    assert!(summary.skipped.is_empty());
}

#[test]
fn test_identical_documents_share_a_record() {
    let dir = tempdir().unwrap();
    let report = prose(1, 8000);
    write(dir.path(), "a/report.txt", &report);
    write(dir.path(), "b/report-copy.txt", &report);
    write(dir.path(), "other.pdf", &prose(99, 8000));

    let (graph, summary) = resolver().run(dir.path()).unwrap();

    assert_eq!(summary.candidates, 3);
    assert_eq!(summary.fuzzy_extents, 3);
    assert_eq!(summary.fuzzy.comparisons, 3);
    assert_eq!(summary.fuzzy.merges, 1);

    let a = graph.record_for_path(&dir.path().join("a/report.txt")).unwrap();
    let b = graph
        .record_for_path(&dir.path().join("b/report-copy.txt"))
        .unwrap();
    let other = graph.record_for_path(&dir.path().join("other.pdf")).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, other);
    assert_eq!(graph.instantiation_paths(a).len(), 2);
    assert_eq!(graph.instantiation_paths(other).len(), 1);
    assert!(!graph.has_link(a, other));

    // Two live records own all three files
    let live: Vec<_> = graph
        .records()
        .filter(|r| !graph.instantiation_paths(r.id()).is_empty())
        .collect();
    assert_eq!(live.len(), 2);
}

#[test]
fn test_edited_document_is_linked_not_merged() {
    let dir = tempdir().unwrap();
    let original = prose(7, 16000);
    let mut edited = original.clone();
    edited.truncate(15000);
    edited.push_str("amended by the clerk of the council on review");
    edited.push_str(&original[15000..]);

    write(dir.path(), "minutes.txt", &original);
    write(dir.path(), "minutes-amended.txt", &edited);

    let (graph, summary) = resolver().run(dir.path()).unwrap();

    let a = graph.record_for_path(&dir.path().join("minutes.txt")).unwrap();
    let b = graph
        .record_for_path(&dir.path().join("minutes-amended.txt"))
        .unwrap();

    assert_ne!(a, b);
    assert!(graph.has_link(a, b));
    assert_eq!(summary.fuzzy.merges, 0);
    assert_eq!(summary.fuzzy.links, 1);
}

#[test]
fn test_size_floor_is_exclusive() {
    let dir = tempdir().unwrap();
    write(dir.path(), "exact.txt", &"a".repeat(1000));
    write(dir.path(), "over.txt", &prose(3, 1001)[..1001]);

    let (graph, summary) = resolver().run(dir.path()).unwrap();

    assert_eq!(summary.candidates, 1);
    assert!(graph.record_for_path(&dir.path().join("exact.txt")).is_none());
    assert!(graph.record_for_path(&dir.path().join("over.txt")).is_some());
}

#[test]
fn test_unselected_and_hidden_files_ignored() {
    let dir = tempdir().unwrap();
    let content = prose(5, 4000);
    write(dir.path(), "notes.txt", &content);
    write(dir.path(), "page.html", &content);
    write(dir.path(), "archive.unknownext", &content);
    write(dir.path(), ".hidden.txt", &content);
    write(dir.path(), ".cache/inside.txt", &content);

    let (graph, summary) = resolver().run(dir.path()).unwrap();

    assert_eq!(summary.candidates, 1);
    assert_eq!(graph.len(), 1);
    assert!(graph.record_for_path(&dir.path().join("notes.txt")).is_some());
}

#[test]
fn test_content_type_selection_is_configurable() {
    let dir = tempdir().unwrap();
    write(dir.path(), "notes.txt", &prose(5, 4000));
    write(dir.path(), "scan.pdf", &prose(6, 4000));

    let selector = SelectorConfig::default().with_content_types(vec!["application/pdf".into()]);
    let resolver = Resolver::new(ResolverConfig::default().with_selector(selector));
    let (graph, summary) = resolver.run(dir.path()).unwrap();

    assert_eq!(summary.candidates, 1);
    assert!(graph.record_for_path(&dir.path().join("scan.pdf")).is_some());
}

#[test]
fn test_comparisons_cover_every_pair_once() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        write(dir.path(), &format!("doc{i}.txt"), &prose(100 + i, 6000));
    }

    let (_graph, summary) = resolver().run(dir.path()).unwrap();

    assert_eq!(summary.fuzzy.records, 6);
    assert_eq!(summary.fuzzy.comparisons, PhaseStats::expected_pairs(6));
    assert_eq!(summary.fuzzy.comparisons, 15);
    assert!(summary.fuzzy.incompatible <= summary.fuzzy.comparisons);
}

#[test]
fn test_rerun_is_deterministic() {
    let dir = tempdir().unwrap();
    let shared = prose(11, 5000);
    write(dir.path(), "x.txt", &shared);
    write(dir.path(), "y.txt", &shared);
    write(dir.path(), "z.md", &shared);
    write(dir.path(), "w.txt", &prose(12, 5000));

    let (first, _) = resolver().run(dir.path()).unwrap();
    let (second, _) = resolver().run(dir.path()).unwrap();

    for name in ["x.txt", "y.txt", "z.md", "w.txt"] {
        let path = dir.path().join(name);
        assert_eq!(
            first.record_for_path(&path).map(|r| r.as_u32()),
            second.record_for_path(&path).map(|r| r.as_u32())
        );
    }
    let first_links: Vec<_> = first.links().collect();
    let second_links: Vec<_> = second.links().collect();
    assert_eq!(first_links, second_links);
}

#[test]
fn test_same_picture_in_two_formats_is_linked() {
    let dir = tempdir().unwrap();
    let img = image::RgbImage::from_fn(256, 256, |x, y| {
        let v = ((x / 32 + y / 32) % 2) as u8 * 180 + (x as u8 / 8) + noise(x, y);
        image::Rgb([v, v.wrapping_add(y as u8 / 4), 255 - v])
    });
    img.save(dir.path().join("plate.png")).unwrap();
    img.save(dir.path().join("plate.bmp")).unwrap();

    let (graph, summary) = resolver().run(dir.path()).unwrap();

    assert_eq!(summary.candidates, 2);
    assert_eq!(summary.perceptual_extents, 2);
    assert_eq!(summary.perceptual.comparisons, 1);

    let png = graph.record_for_path(&dir.path().join("plate.png")).unwrap();
    let bmp = graph.record_for_path(&dir.path().join("plate.bmp")).unwrap();
    assert_ne!(png, bmp);
    assert!(graph.has_link(png, bmp));
    assert!(graph.get_extent(png, ExtentKind::PerceptualHash).is_some());
}

#[test]
fn test_cropped_picture_is_linked_not_merged() {
    let dir = tempdir().unwrap();
    let img = image::RgbImage::from_fn(256, 256, |x, y| {
        let v = ((x / 32 + y / 32) % 2) as u8 * 180 + (x as u8 / 8) + noise(x, y);
        image::Rgb([v, v.wrapping_add(y as u8 / 4), 255 - v])
    });
    img.save(dir.path().join("plate.png")).unwrap();
    image::imageops::crop_imm(&img, 8, 8, 248, 248)
        .to_image()
        .save(dir.path().join("plate-cropped.png"))
        .unwrap();

    let (graph, summary) = resolver().run(dir.path()).unwrap();

    let full = graph.record_for_path(&dir.path().join("plate.png")).unwrap();
    let cropped = graph
        .record_for_path(&dir.path().join("plate-cropped.png"))
        .unwrap();
    let hash = |id| {
        graph
            .get_extent(id, ExtentKind::PerceptualHash)
            .and_then(Fingerprint::as_perceptual)
            .unwrap()
    };
    let score = similarity(hash(full), hash(cropped));

    assert!(score > 70 && score < 100, "score {score}");
    assert_ne!(full, cropped);
    assert!(graph.has_link(full, cropped));
    assert_eq!(graph.link_count(), 1);
    assert_eq!(summary.merges(), 0);
    assert_eq!(summary.perceptual.links, 1);
}

#[test]
fn test_perceptual_disabled_skips_images() {
    let dir = tempdir().unwrap();
    let img = image::RgbImage::from_fn(128, 128, |x, y| image::Rgb([x as u8, y as u8, noise(x, y) * 8]));
    img.save(dir.path().join("a.png")).unwrap();
    img.save(dir.path().join("b.bmp")).unwrap();

    let resolver = Resolver::new(ResolverConfig::default().with_perceptual(false));
    let (graph, summary) = resolver.run(dir.path()).unwrap();

    assert_eq!(summary.perceptual_extents, 0);
    assert_eq!(summary.perceptual.comparisons, 0);
    assert!(graph.records_with_extent(ExtentKind::PerceptualHash).is_empty());
}

#[test]
fn test_corrupt_image_skips_only_perceptual_extent() {
    let dir = tempdir().unwrap();
    write(dir.path(), "broken.png", &prose(21, 3000));

    let (graph, summary) = resolver().run(dir.path()).unwrap();

    let record = graph.record_for_path(&dir.path().join("broken.png")).unwrap();
    assert!(graph.get_extent(record, ExtentKind::FuzzyHash).is_some());
    assert!(graph.get_extent(record, ExtentKind::PerceptualHash).is_none());
    assert_eq!(summary.skipped_files(), 1);
}
