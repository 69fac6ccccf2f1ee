//! Tests for the biowdl-input-converter binary

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn converter() -> Command {
    Command::cargo_bin("biowdl-input-converter").unwrap()
}

/// Write a one-readgroup sheet whose read file exists, returning its path
fn write_sheet(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let reads = dir.path().join("r1.fq");
    fs::write(&reads, b"").unwrap();
    let sheet = dir.path().join("sheet.csv");
    fs::write(
        &sheet,
        format!(
            "sample,library,readgroup,R1,R1_md5,R2,R2_md5\ns1,lib1,rg1,{},,,\n",
            reads.display()
        ),
    )
    .unwrap();
    sheet
}

#[test]
fn test_converts_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = write_sheet(&dir);

    let output = converter().arg(&sheet).assert().success().get_output().clone();
    let document: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["samples"][0]["id"], "s1");
    assert_eq!(
        document["samples"][0]["libraries"][0]["readgroups"][0]["id"],
        "rg1"
    );
}

#[test]
fn test_old_yaml_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = write_sheet(&dir);
    let out = dir.path().join("samples.yml");

    converter()
        .arg(&sheet)
        .args(["--old", "--encoding", "yaml", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("samples:\n- libraries:"));
    assert!(text.ends_with('\n'));
}

#[test]
fn test_validate_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = write_sheet(&dir);

    converter()
        .arg(&sheet)
        .arg("--validate")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_missing_read_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = dir.path().join("sheet.csv");
    fs::write(
        &sheet,
        "sample,library,readgroup,R1,R1_md5,R2,R2_md5\ns1,lib1,rg1,/nonexistent/r1.fq,,,\n",
    )
    .unwrap();

    converter()
        .arg(&sheet)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("/nonexistent/r1.fq"));

    converter()
        .arg(&sheet)
        .arg("--skip-file-check")
        .assert()
        .success()
        .stdout(predicate::str::contains("/nonexistent/r1.fq"));
}

#[test]
fn test_old_conflicts_with_shape() {
    converter()
        .args(["sheet.csv", "--old", "--shape", "legacy-flattened"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_unsupported_format() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = dir.path().join("sheet.xlsx");
    fs::write(&sheet, "").unwrap();

    converter()
        .arg(&sheet)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported samplesheet format"));
}
