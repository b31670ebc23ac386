//! Output format tests for the drvmerge CLI.
//!
//! `--output jsonl` emits one JSON object per line with a stable schema:
//! mount and copied records while merging, then a summary or error record.

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, stdout_lines};
use serde_json::Value;

fn records(output: &std::process::Output) -> Vec<Value> {
    stdout_lines(output)
        .iter()
        .map(|line| serde_json::from_str(line).expect("every stdout line is JSON"))
        .collect()
}

fn record_types(records: &[Value]) -> Vec<&str> {
    records
        .iter()
        .map(|r| r["record_type"].as_str().unwrap_or_default())
        .collect()
}

#[test]
fn test_jsonl_success_stream() {
    let fx = TestFixture::new();
    fx.write("a", "bin/a", "hello");

    let output = fx
        .merge_cmd(&[("a", "usr")])
        .arg("--output")
        .arg("jsonl")
        .output()
        .unwrap();
    assert!(output.status.success());

    let records = records(&output);
    assert_eq!(record_types(&records), vec!["mount", "copied", "summary"]);
    assert!(records.iter().all(|r| r["schema_version"] == "1.0"));

    assert_eq!(records[0]["label"], "a");
    assert_eq!(records[0]["subpath"], "usr");

    assert_eq!(records[1]["relative_path"], "bin/a");
    assert_eq!(records[1]["bytes_copied"], 5);

    let summary = &records[2];
    assert_eq!(summary["mounts"], 1);
    assert_eq!(summary["files_copied"], 1);
    assert_eq!(summary["bytes_copied"], 5);
    assert_eq!(summary["dirs_created"], 2);
    assert_eq!(summary["dirs_merged"], 0);
    assert!(summary["duration_ms"].is_u64());
}

#[test]
fn test_jsonl_conflict_record() {
    let fx = TestFixture::new();
    fx.write("a", "share/x", "a");
    fx.write("b", "share/x", "b");

    let output = fx
        .merge_cmd(&[("a", ""), ("b", "")])
        .arg("--output")
        .arg("jsonl")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let records = records(&output);
    let error = records.last().unwrap();
    assert_eq!(error["record_type"], "error");
    assert_eq!(error["error_code"], "file_conflict");
    assert_eq!(error["relative_path"], "share/x");
    assert_eq!(error["label"], "b");
    assert_eq!(error["owner"], "a");
    assert_eq!(error["error_message"], "share/x in b conflicts with share/x in a");
}

#[test]
fn test_jsonl_directory_conflict_code() {
    let fx = TestFixture::new();
    fx.write("a", "lib", "file");
    fx.mkdir("b", "lib");

    let output = fx
        .merge_cmd(&[("a", ""), ("b", "")])
        .arg("--output=jsonl")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let records = records(&output);
    assert_eq!(records.last().unwrap()["error_code"], "directory_conflict");
}

#[test]
fn test_jsonl_argument_error() {
    let fx = TestFixture::new();

    let output = fx
        .cmd()
        .arg("--output=jsonl")
        .arg("only-a-label")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let records = records(&output);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["record_type"], "error");
    assert_eq!(records[0]["error_code"], "invalid_input");
    assert!(records[0].get("owner").is_none());
}

#[cfg(unix)]
#[test]
fn test_jsonl_diagnostics() {
    let fx = TestFixture::new();
    fx.write("a", "target", "t");
    std::os::unix::fs::symlink("target", fx.source("a").join("link")).unwrap();
    let missing = fx.source("missing");

    let output = fx
        .merge_cmd(&[("a", "")])
        .arg("ghost")
        .arg(&missing)
        .arg("")
        .arg("--output=jsonl")
        .output()
        .unwrap();
    assert!(output.status.success());

    let records = records(&output);
    let illegal: Vec<_> = records
        .iter()
        .filter(|r| r["record_type"] == "illegal_file_type")
        .collect();
    assert_eq!(illegal.len(), 1);
    assert!(illegal[0]["path"].as_str().unwrap().ends_with("link"));

    let missing_records: Vec<_> = records
        .iter()
        .filter(|r| r["record_type"] == "missing")
        .collect();
    assert_eq!(missing_records.len(), 1);
    assert_eq!(missing_records[0]["path"], missing.display().to_string());

    let summary = records.last().unwrap();
    assert_eq!(summary["entries_illegal"], 1);
    assert_eq!(summary["entries_missing"], 1);
}

#[test]
fn test_human_error_line_has_code() {
    let fx = TestFixture::new();

    let output = fx.cmd().arg("a").arg("b").output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("error[invalid_input]: Wrong number of arguments"));
}
