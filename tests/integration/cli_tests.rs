use clap::Parser;
use dupsift::cli::Cli;
use dupsift::duplicates::FinderError;
use dupsift::error::ExitCode;
use dupsift::run_app_with_output;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// A tree with one pair of duplicates and one unique file, plus an empty
/// config file so no user config leaks in.
fn fixture() -> (TempDir, TempDir) {
    let data = tempdir().unwrap();
    fs::write(data.path().join("a"), b"X").unwrap();
    fs::write(data.path().join("b"), b"X").unwrap();
    fs::write(data.path().join("c"), b"YY").unwrap();

    let conf = tempdir().unwrap();
    fs::write(conf.path().join("config.toml"), "").unwrap();
    (data, conf)
}

fn run(args: &[&str], config: &Path) -> (anyhow::Result<ExitCode>, String) {
    let mut argv = vec!["dupsift", "--no-progress", "--config", config.to_str().unwrap()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();

    let mut out = Vec::new();
    let code = run_app_with_output(cli, &mut out);
    (code, String::from_utf8(out).unwrap())
}

#[test]
fn test_text_output() {
    let (data, conf) = fixture();
    let root = data.path().to_str().unwrap();
    let (code, out) = run(&[root], &conf.path().join("config.toml"));

    assert_eq!(code.unwrap(), ExitCode::Success);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "");
    assert_eq!(lines[1], "Group #1 (2 files * 1 bytes):");
    assert_eq!(lines[2], data.path().join("a").display().to_string());
    assert_eq!(lines[3], data.path().join("b").display().to_string());
    assert_eq!(lines[4], "Final count: 2 duplicate files in 1 sets");
    assert_eq!(lines[5], "Redundant data size: 1 bytes");
}

#[test]
fn test_summary_output() {
    let (data, conf) = fixture();
    let root = data.path().to_str().unwrap();
    let (code, out) = run(&["--summary", root], &conf.path().join("config.toml"));

    assert_eq!(code.unwrap(), ExitCode::Success);
    assert_eq!(
        out,
        "Final count: 2 duplicate files in 1 sets\nRedundant data size: 1 bytes\n"
    );
}

#[test]
fn test_json_output() {
    let (data, conf) = fixture();
    let root = data.path().to_str().unwrap();
    let (code, out) = run(&["--json", root], &conf.path().join("config.toml"));

    assert_eq!(code.unwrap(), ExitCode::Success);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["groups"][0]["size"], 1);
    assert_eq!(parsed["groups"][0]["paths"].as_array().unwrap().len(), 2);
    assert_eq!(parsed["duplicates"], 2);
    assert_eq!(parsed["redundant_data_size"], 1);
    assert_eq!(parsed["total_files"], 3);
    assert_eq!(parsed["summary"]["exit_code_name"], "DS000");
}

#[test]
fn test_no_duplicates_exit_code() {
    let data = tempdir().unwrap();
    fs::write(data.path().join("only"), b"alone").unwrap();
    let conf = tempdir().unwrap();
    fs::write(conf.path().join("config.toml"), "").unwrap();

    let (code, out) = run(&[data.path().to_str().unwrap()], &conf.path().join("config.toml"));

    assert_eq!(code.unwrap(), ExitCode::NoDuplicates);
    assert!(out.starts_with("Final count: 0 duplicate files in 0 sets"));
}

#[test]
fn test_missing_root_is_an_error() {
    let (data, conf) = fixture();
    let missing = data.path().join("missing");
    let (code, out) = run(&[missing.to_str().unwrap()], &conf.path().join("config.toml"));

    let err = code.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinderError>(),
        Some(FinderError::PathNotFound(_))
    ));
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(out.is_empty());
}

#[test]
fn test_no_empty_flag() {
    let (data, conf) = fixture();
    fs::write(data.path().join("e1"), b"").unwrap();
    fs::write(data.path().join("e2"), b"").unwrap();
    let root = data.path().to_str().unwrap();

    let (_, with_empty) = run(&["--summary", root], &conf.path().join("config.toml"));
    let (_, without_empty) = run(&["--summary", "--no-empty", root], &conf.path().join("config.toml"));

    assert!(with_empty.starts_with("Final count: 4 duplicate files in 2 sets"));
    assert!(without_empty.starts_with("Final count: 2 duplicate files in 1 sets"));
}

#[test]
fn test_print_config() {
    let conf = tempdir().unwrap();
    let path = conf.path().join("config.toml");
    fs::write(&path, "io_threads = 7\n").unwrap();

    let (code, out) = run(&["--print-config", "--skip-partial"], &path);

    assert_eq!(code.unwrap(), ExitCode::Success);
    assert!(out.contains("io_threads = 7"));
    assert!(out.contains("skip_partial_fingerprinting = true"));
    assert!(out.contains("progress = false"));
}
