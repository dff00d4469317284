//! Stamps the binary with its build time and commit for `cv --version`.
//!
//! Sets `CV_BUILD_TIMESTAMP` (UTC, RFC 3339) and `CV_GIT_COMMIT` (short hash,
//! `unknown` outside a git checkout).

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");

    let built_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    println!("cargo:rustc-env=CV_BUILD_TIMESTAMP={}", built_at);
    println!("cargo:rustc-env=CV_GIT_COMMIT={}", short_commit());
}

fn short_commit() -> String {
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
