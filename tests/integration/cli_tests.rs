use clap::Parser;
use recordlink::cli::Cli;
use recordlink::error::{ExitCode, StructuredError};
use recordlink::run_app;
use std::fs;
use tempfile::tempdir;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["recordlink", "--quiet"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

fn ledger(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("{i:05} receipt for rates paid, parish of St Mary, folio {}\n", i * 7 % 113))
        .collect()
}

#[test]
fn test_scan_writes_graph() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("accession");
    fs::create_dir(&input).unwrap();
    fs::write(input.join("ledger.txt"), ledger(100)).unwrap();
    fs::write(input.join("ledger-copy.txt"), ledger(100)).unwrap();
    let output = dir.path().join("graph.json");

    let cli = parse(&[
        "scan",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        "--no-progress",
    ]);
    let code = run_app(cli).unwrap();

    assert_eq!(code, ExitCode::Success);
    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(doc["summary"]["candidates"], 2);
    assert_eq!(doc["summary"]["live_records"], 1);
}

#[test]
fn test_scan_missing_input_is_config_error() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("graph.json");

    let cli = parse(&[
        "scan",
        "/nonexistent/recordlink/input",
        output.to_str().unwrap(),
    ]);
    let err = run_app(cli).unwrap_err();

    assert_eq!(ExitCode::from_error(&err), ExitCode::ConfigError);
    let structured = StructuredError::new(&err, ExitCode::from_error(&err));
    assert_eq!(structured.code, "RL002");
    assert_eq!(structured.exit_code, 2);
    assert_eq!(structured.stage, "configuration");
    assert!(!structured.interrupted);
    assert!(structured.message.contains("nonexistent"));
    assert!(!output.exists());
}

#[test]
fn test_scan_missing_config_file_is_config_error() {
    let dir = tempdir().unwrap();

    let cli = parse(&[
        "--config",
        "/nonexistent/recordlink.toml",
        "scan",
        dir.path().to_str().unwrap(),
        dir.path().join("graph.json").to_str().unwrap(),
    ]);
    let err = run_app(cli).unwrap_err();

    assert_eq!(ExitCode::from_error(&err), ExitCode::ConfigError);
}

#[test]
fn test_scan_invalid_threshold_combination() {
    let dir = tempdir().unwrap();

    let cli = parse(&[
        "scan",
        dir.path().to_str().unwrap(),
        dir.path().join("graph.json").to_str().unwrap(),
        "--merge",
        "40",
        "--fuzzy-link",
        "60",
    ]);
    let err = run_app(cli).unwrap_err();

    assert_eq!(ExitCode::from_error(&err), ExitCode::ConfigError);
}

#[test]
fn test_scan_unwritable_output_is_general_error() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("no/such/dir/graph.json");

    let cli = parse(&[
        "scan",
        dir.path().to_str().unwrap(),
        output.to_str().unwrap(),
    ]);
    let err = run_app(cli).unwrap_err();

    assert_eq!(ExitCode::from_error(&err), ExitCode::GeneralError);
    assert_eq!(StructuredError::new(&err, ExitCode::GeneralError).stage, "export");
}

#[test]
fn test_content_types_command() {
    let cli = parse(&["content-types"]);
    assert_eq!(run_app(cli).unwrap(), ExitCode::Success);
}
