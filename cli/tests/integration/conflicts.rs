//! Conflict integration tests for the drvmerge CLI.
//!
//! These tests verify that collisions between sources are fatal:
//! - File vs file: the second writer fails, the first copy survives
//! - Directory vs file, file vs directory
//! - Attribution to the earlier source, or `<unknown package>`
//! - Nothing after the conflict is processed

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, stdout_lines};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_file_file_conflict() {
    let fx = TestFixture::new();
    fx.write("a", "bin/tool", "from a");
    fx.write("b", "bin/tool", "from b");

    fx.merge_cmd(&[("a", "usr"), ("b", "usr")])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "bin/tool in b conflicts with bin/tool in a",
        ));

    // b's copy is never written
    fx.assert_file_content("usr/bin/tool", "from a");
}

#[test]
fn test_conflict_line_is_last() {
    let fx = TestFixture::new();
    fx.write("a", "x", "a");
    fx.write("b", "x", "b");

    let output = fx.merge_cmd(&[("a", ""), ("b", "")]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let lines = stdout_lines(&output);
    assert_eq!(
        lines.last().map(String::as_str),
        Some("x in b conflicts with x in a")
    );
    assert!(lines.contains(&"Mounting b at ".to_string()));
}

#[test]
fn test_directory_file_conflict() {
    let fx = TestFixture::new();
    fx.write("a", "etc", "a file named etc");
    fx.write("b", "etc/app.conf", "conf");

    fx.merge_cmd(&[("a", ""), ("b", "")])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "etc is a directory in b but a file in a",
        ));

    fx.assert_file_content("etc", "a file named etc");
}

#[test]
fn test_file_onto_directory_conflict_names_owner() {
    let fx = TestFixture::new();
    fx.write("a", "lib/plugins/p.so", "plugin");
    fx.write("b", "lib/plugins", "not a directory");

    fx.merge_cmd(&[("a", ""), ("b", "")])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "lib/plugins in b conflicts with lib/plugins in a",
        ));

    assert!(fx.dest().join("lib/plugins").is_dir());
    fx.assert_file_content("lib/plugins/p.so", "plugin");
}

#[test]
fn test_conflict_stops_later_mounts() {
    let fx = TestFixture::new();
    fx.write("a", "share/x", "a");
    fx.write("b", "share/x", "b");
    fx.write("c", "share/y", "c");

    fx.merge_cmd(&[("a", ""), ("b", ""), ("c", "")])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Mounting c").not());

    assert!(!fx.dest().join("share/y").exists());
}

#[test]
fn test_work_before_conflict_is_kept() {
    let fx = TestFixture::new();
    fx.write("a", "bin/a", "a");
    fx.write("a", "bin/shared", "a");
    fx.write("b", "bin/another", "b");
    fx.write("b", "bin/shared", "b");

    fx.merge_cmd(&[("a", ""), ("b", "")]).assert().code(1);

    // No rollback: b's files visited before the conflict stay on disk.
    fx.assert_file_content("bin/a", "a");
    fx.assert_file_content("bin/another", "b");
    fx.assert_file_content("bin/shared", "a");
}

#[test]
fn test_same_source_twice_conflicts() {
    let fx = TestFixture::new();
    fx.write("a", "f", "f");

    let mut cmd = fx.cmd();
    cmd.arg("first")
        .arg(fx.source("a"))
        .arg("")
        .arg("second")
        .arg(fx.source("a"))
        .arg("")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("f in second conflicts with f in first"));
}

#[test]
fn test_rerun_conflicts_with_unknown_owner() {
    let fx = TestFixture::new();
    fx.write("a", "bin/a", "a");

    fx.merge_cmd(&[("a", "usr")]).assert().success();

    fx.merge_cmd(&[("a", "usr")])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "bin/a in a conflicts with bin/a in <unknown package>",
        ));
}

#[test]
fn test_preexisting_destination_file() {
    let fx = TestFixture::new();
    fx.write("a", "README", "new");
    fs::write(fx.dest().join("README"), "old").unwrap();

    fx.merge_cmd(&[("a", "")])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("<unknown package>"));

    fx.assert_file_content("README", "old");
}
