//! CLI integration tests

use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "nodebench-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("hardware readiness benchmark"),
        "Should describe the tool"
    );
    for flag in [
        "--test-dir",
        "--output",
        "--quick",
        "--verbose",
        "--config",
        "--format",
        "--log-format",
        "--no-save",
        "--metrics-file",
    ] {
        assert!(stdout.contains(flag), "Should show {flag} option");
    }
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "nodebench-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("nodebench"), "Should show binary name");
}

/// Test that an unknown output format is rejected
#[test]
fn test_invalid_format() {
    let output = Command::new("cargo")
        .args(["run", "-p", "nodebench-cli", "--", "--format", "xml"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Unknown format should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("xml"), "Should name the rejected value");
}

/// Test that an unusable test directory stops the run before any probe
#[test]
fn test_unusable_test_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("occupied");
    std::fs::write(&file, b"x").expect("write");

    let output = Command::new("cargo")
        .args(["run", "-p", "nodebench-cli", "--", "--no-save", "--test-dir"])
        .arg(&file)
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Run should fail on a file path");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Cannot run disk probes"),
        "Should explain the prerequisite failure"
    );
}
