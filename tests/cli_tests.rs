//! Runs the stampfmt binary and checks what it prints and leaves behind.
#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_stampfmt(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stampfmt"))
        .arg(dir)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_config_file_warnings_reach_stderr() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".stampfmt.toml"),
        "[settings]\nformatter = \"/bin/sh\"\nconcurrency = \"lots\"\n",
    )
    .unwrap();

    let out = run_stampfmt(dir.path(), &[]);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(out.status.success(), "stderr: {stderr}");
    assert!(stderr.contains("invalid concurrency 'lots'"), "stderr: {stderr}");
    assert!(stderr.contains("0 of 0 files have been reformatted"));
}

#[test]
fn test_unparsable_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".stampfmt.toml"), "[settings\nformatter = ").unwrap();

    let out = run_stampfmt(dir.path(), &["-f", "/bin/sh"]);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(out.status.success(), "stderr: {stderr}");
    assert!(stderr.contains(".stampfmt.toml"), "stderr: {stderr}");
}

#[test]
fn test_dry_run_with_session_leaves_no_stamp_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.cpp"), "int a;\n").unwrap();

    let out = run_stampfmt(
        dir.path(),
        &["-f", "/bin/sh", "--session", "build-1", "--dry-run"],
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(out.status.success(), "stderr: {stderr}");
    assert!(stderr.contains("Would format"), "stderr: {stderr}");
    assert!(!dir.path().join(".stampfmt").exists());
}
