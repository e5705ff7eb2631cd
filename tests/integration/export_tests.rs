use recordlink::output::{JsonGraph, JsonOutputError};
use recordlink::resolve::Resolver;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn document(seed: u8) -> String {
    (0..400u32)
        .map(|i| format!("entry {} folio {} ref {}\n", i, i.wrapping_mul(seed as u32 + 7) % 97, seed))
        .collect()
}

fn resolved_document(dir: &Path) -> Value {
    let (graph, summary) = Resolver::with_defaults().run(dir).unwrap();
    let json = JsonGraph::new(dir, &graph, &summary).to_json().unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn test_export_empty_graph() {
    let dir = tempdir().unwrap();
    let doc = resolved_document(dir.path());

    assert_eq!(doc["records"].as_array().unwrap().len(), 0);
    assert_eq!(doc["summary"]["candidates"], 0);
    assert_eq!(doc["summary"]["links"], 0);
    assert!(doc["generated_at"].is_string());
    assert_eq!(doc["root"].as_str().unwrap(), dir.path().to_str().unwrap());
}

#[test]
fn test_export_merged_records() {
    let dir = tempdir().unwrap();
    let content = document(3);
    fs::write(dir.path().join("one.txt"), &content).unwrap();
    fs::write(dir.path().join("two.txt"), &content).unwrap();

    let doc = resolved_document(dir.path());
    let records = doc["records"].as_array().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(doc["summary"]["records"], 2);
    assert_eq!(doc["summary"]["live_records"], 1);
    assert_eq!(doc["summary"]["merges"], 1);

    // one.txt is walked first and survives
    let survivor = &records[0];
    assert!(survivor["merged_into"].is_null());
    assert_eq!(survivor["instantiations"].as_array().unwrap().len(), 2);

    let husk = &records[1];
    assert_eq!(husk["merged_into"], survivor["id"]);
    assert!(husk["instantiations"].as_array().unwrap().is_empty());

    let extent = &survivor["extents"][0];
    assert_eq!(extent["kind"], "FuzzyHash");
    assert!(extent["value"].as_str().unwrap().contains(':'));
}

#[test]
fn test_export_summary_phases() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), document(1)).unwrap();
    fs::write(dir.path().join("b.txt"), document(2)).unwrap();
    fs::write(dir.path().join("c.txt"), document(5)).unwrap();

    let doc = resolved_document(dir.path());
    let fuzzy = &doc["summary"]["fuzzy"];

    assert_eq!(fuzzy["records"], 3);
    assert_eq!(fuzzy["comparisons"], 3);
    assert!(fuzzy["duration_ms"].is_u64());
    assert_eq!(doc["summary"]["perceptual"]["comparisons"], 0);
    assert!(doc["summary"]["skipped"].as_array().unwrap().is_empty());
}

#[test]
fn test_write_file_pretty() {
    let dir = tempdir().unwrap();
    let scan_root = dir.path().join("root");
    fs::create_dir(&scan_root).unwrap();
    fs::write(scan_root.join("a.txt"), document(9)).unwrap();

    let (graph, summary) = Resolver::with_defaults().run(&scan_root).unwrap();
    let out = dir.path().join("graph.json");
    JsonGraph::new(&scan_root, &graph, &summary)
        .write_file(&out, true)
        .unwrap();

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("\n  \"records\""));
    assert!(text.ends_with('\n'));
    let doc: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["records"][0]["id"], 0);
}

#[test]
fn test_write_file_to_missing_directory() {
    let dir = tempdir().unwrap();
    let (graph, summary) = Resolver::with_defaults().run(dir.path()).unwrap();

    let result = JsonGraph::new(dir.path(), &graph, &summary)
        .write_file(&dir.path().join("missing/graph.json"), false);

    assert!(matches!(result, Err(JsonOutputError::Create { .. })));
}
