//! Common test utilities for cutover integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's `~/.local/share/cutover/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
pub use tempfile::TempDir;

/// A test environment with isolated data and config storage.
///
/// The `cv()` method returns a `Command` that sets `CV_DATA_DIR` and
/// `XDG_CONFIG_HOME` per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub root: TempDir,
}

impl TestEnv {
    /// Create a new test environment without initializing it.
    pub fn new() -> Self {
        Self {
            root: TempDir::new().unwrap(),
        }
    }

    /// Create a new test environment and run `cv system init`.
    pub fn init() -> Self {
        let env = Self::new();
        env.cv().args(["system", "init"]).assert().success();
        env
    }

    /// Get a Command for the cv binary with isolated directories.
    pub fn cv(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cv"));
        cmd.current_dir(self.root.path());
        cmd.env("CV_DATA_DIR", self.data_path())
            .env("XDG_CONFIG_HOME", self.root.path().join("config"))
            .env_remove("CV_EDITOR_NAME")
            .env_remove("CV_LOG");
        cmd
    }

    /// Run a command expected to succeed and parse its JSON output.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self.cv().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// Create an activity and return its id.
    pub fn create(&self, args: &[&str]) -> String {
        let mut full = vec!["activity", "create"];
        full.extend_from_slice(args);
        self.json(&full)["id"].as_str().unwrap().to_string()
    }

    pub fn path(&self) -> &std::path::Path {
        self.root.path()
    }

    /// Get the path to the data directory.
    pub fn data_path(&self) -> std::path::PathBuf {
        self.root.path().join("data")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
