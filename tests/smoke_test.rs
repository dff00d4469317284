//! Smoke tests for the cutover CLI.
//!
//! These tests verify basic CLI functionality:
//! - `cv --version` outputs version info
//! - `cv --help` outputs help text
//! - `cv` (no args) prints usage and fails

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a Command for the cv binary.
fn cv() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cv"))
}

#[test]
fn test_version_flag() {
    cv().arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cv"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    cv().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("activity"));
}

#[test]
fn test_activity_help_lists_subcommands() {
    cv().args(["activity", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bulk-update"))
        .stdout(predicate::str::contains("log"));
}

#[test]
fn test_no_args_prints_usage() {
    cv().assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}
