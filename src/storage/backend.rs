//! Storage backend trait and implementations.
//!
//! This module provides the storage backends for cutover data:
//! - `FileBackend` - Files in the data directory (default)
//! - `MemoryBackend` - In-process storage used by tests

use crate::Result;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Trait for storage backends that handle raw data persistence.
///
/// Writes replace a file's whole content and must be atomic: a reader sees
/// either the previous content or the new content, never a mix.
pub trait StorageBackend: Send + Sync {
    /// Read a file's content, `None` when it does not exist.
    fn read(&self, filename: &str) -> Result<Option<String>>;

    /// Replace a file's content.
    fn write(&mut self, filename: &str, contents: &str) -> Result<()>;

    /// Get the storage location description (for display purposes).
    fn location(&self) -> String;

    /// Get the backend type name.
    fn backend_type(&self) -> &'static str;

    /// Read all non-blank lines from a JSONL file.
    fn read_jsonl(&self, filename: &str) -> Result<Vec<String>> {
        Ok(self
            .read(filename)?
            .map(|content| {
                content
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Write all lines to a JSONL file (replacing existing content).
    fn write_jsonl(&mut self, filename: &str, lines: &[String]) -> Result<()> {
        let mut contents = lines.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        self.write(filename, &contents)
    }
}

/// Files stored directly in a data directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, filename: &str) -> Result<Option<String>> {
        let path = self.root.join(filename);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn write(&mut self, filename: &str, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.root.join(filename))
            .map_err(|e| e.error)?;
        Ok(())
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn backend_type(&self) -> &'static str {
        "file"
    }
}

/// Files kept in memory.
///
/// Writes can be made to fail, to exercise commit failure paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    files: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with an I/O error.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, filename: &str) -> Result<Option<String>> {
        Ok(self.files.get(filename).cloned())
    }

    fn write(&mut self, filename: &str, contents: &str) -> Result<()> {
        if self.fail_writes {
            return Err(std::io::Error::other(format!("write to {} refused", filename)).into());
        }
        self.files.insert(filename.to_string(), contents.to_string());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_backend_missing_file_reads_none() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path());
        assert_eq!(backend.read("activities.jsonl").unwrap(), None);
        assert!(backend.read_jsonl("activities.jsonl").unwrap().is_empty());
    }

    #[test]
    fn test_file_backend_write_replaces_content() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::new(dir.path());

        backend
            .write_jsonl("activities.jsonl", &["{\"a\":1}".to_string(), "{\"b\":2}".to_string()])
            .unwrap();
        backend
            .write_jsonl("activities.jsonl", &["{\"c\":3}".to_string()])
            .unwrap();

        let lines = backend.read_jsonl("activities.jsonl").unwrap();
        assert_eq!(lines, vec!["{\"c\":3}".to_string()]);
    }

    #[test]
    fn test_file_backend_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let mut backend = FileBackend::new(dir.path());
        backend.write("settings.kdl", "app-name \"X\"\n").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["settings.kdl".to_string()]);
    }

    #[test]
    fn test_read_jsonl_skips_blank_lines() {
        let mut backend = MemoryBackend::new();
        backend.write("x.jsonl", "one\n\n  \ntwo\n").unwrap();
        assert_eq!(backend.read_jsonl("x.jsonl").unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_memory_backend_failing_write() {
        let mut backend = MemoryBackend::new();
        backend.write("x.jsonl", "old\n").unwrap();
        backend.fail_writes(true);
        assert!(backend.write("x.jsonl", "new\n").is_err());
        assert_eq!(backend.read("x.jsonl").unwrap().as_deref(), Some("old\n"));
    }
}
