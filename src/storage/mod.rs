//! Storage layer for cutover data.
//!
//! This module handles persistence of the activity record set and the
//! planner settings.
//!
//! ## Layout
//!
//! A data directory holds:
//! - `activities.jsonl` - One activity per line, in list order
//! - `settings.kdl` - Planner settings (phases, statuses, roster)
//! - `config.kdl` - Optional CLI preferences
//!
//! Every write replaces the whole file atomically. Mutations go through
//! [`Storage::transact`], which loads a snapshot, runs the engine on it and
//! commits the snapshot only if the engine succeeded.

pub mod backend;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};

use crate::config::{CutoverConfig, Settings};
use crate::models::Activity;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Activity records file name.
pub const ACTIVITIES_FILE: &str = "activities.jsonl";

/// Planner settings file name.
pub const SETTINGS_FILE: &str = "settings.kdl";

/// CLI preferences file name.
pub const CONFIG_FILE: &str = "config.kdl";

/// Storage manager for a single data directory.
pub struct Storage {
    /// Root directory for this plan's data
    pub root: PathBuf,
    backend: Box<dyn StorageBackend>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("root", &self.root)
            .field("backend", &self.backend.backend_type())
            .finish()
    }
}

impl Storage {
    /// Open existing storage in the given data directory.
    pub fn open(data_dir: &Path) -> Result<Self> {
        if !Self::exists(data_dir) {
            return Err(Error::NotInitialized);
        }
        Ok(Self::with_backend(
            data_dir,
            Box::new(FileBackend::new(data_dir)),
        ))
    }

    /// Initialize storage in the given data directory.
    ///
    /// Existing files are left untouched; missing ones are created, with
    /// default settings.
    pub fn init(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        let mut storage = Self::with_backend(data_dir, Box::new(FileBackend::new(data_dir)));

        if storage.backend.read(ACTIVITIES_FILE)?.is_none() {
            storage.backend.write(ACTIVITIES_FILE, "")?;
        }
        if storage.backend.read(SETTINGS_FILE)?.is_none() {
            storage.save_settings(&Settings::default())?;
        }

        tracing::info!(root = %data_dir.display(), "initialized data directory");
        Ok(storage)
    }

    /// Check if storage exists in the given data directory.
    pub fn exists(data_dir: &Path) -> bool {
        data_dir.join(ACTIVITIES_FILE).exists()
    }

    /// Build storage over an arbitrary backend.
    pub fn with_backend(root: &Path, backend: Box<dyn StorageBackend>) -> Self {
        Self {
            root: root.to_path_buf(),
            backend,
        }
    }

    /// Get the root path of the storage.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the storage location description.
    pub fn location(&self) -> String {
        self.backend.location()
    }

    // === Activity Operations ===

    /// Load the whole record set in list order.
    ///
    /// Lines that do not parse as an activity are skipped with a warning.
    /// They stay in the file: every commit writes them back unchanged.
    pub fn load_activities(&self) -> Result<Vec<Activity>> {
        Ok(self.read_snapshot()?.0)
    }

    /// Replace the whole record set, keeping any unreadable lines.
    pub fn save_activities(&mut self, activities: &[Activity]) -> Result<()> {
        let (_, unreadable) = self.read_snapshot()?;
        self.write_snapshot(activities, &unreadable)
    }

    /// Read parsed records plus the raw lines that failed to parse.
    fn read_snapshot(&self) -> Result<(Vec<Activity>, Vec<String>)> {
        let lines = self.backend.read_jsonl(ACTIVITIES_FILE)?;
        let mut activities = Vec::with_capacity(lines.len());
        let mut unreadable = Vec::new();
        for (index, line) in lines.into_iter().enumerate() {
            match serde_json::from_str::<Activity>(&line) {
                Ok(activity) => activities.push(activity),
                Err(e) => {
                    tracing::warn!(line = index + 1, error = %e, "skipping unreadable activity record");
                    unreadable.push(line);
                }
            }
        }
        Ok((activities, unreadable))
    }

    /// Write records followed by the preserved unreadable lines.
    fn write_snapshot(&mut self, activities: &[Activity], unreadable: &[String]) -> Result<()> {
        let mut lines = activities
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        lines.extend(unreadable.iter().cloned());
        self.backend.write_jsonl(ACTIVITIES_FILE, &lines)?;
        tracing::debug!(
            count = activities.len(),
            preserved = unreadable.len(),
            "committed activity snapshot"
        );
        Ok(())
    }

    /// Get one activity by id.
    pub fn get_activity(&self, id: &str) -> Result<Activity> {
        self.load_activities()?
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Run `f` against a snapshot of the record set and the current
    /// settings, committing the snapshot if `f` succeeds.
    ///
    /// When `f` fails, nothing is written. Lines that could not be read are
    /// written back as they were.
    pub fn transact<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Activity>, &Settings) -> Result<T>,
    {
        let settings = self.load_settings()?;
        let (mut records, unreadable) = self.read_snapshot()?;
        let value = f(&mut records, &settings)?;
        self.write_snapshot(&records, &unreadable)?;
        Ok(value)
    }

    // === Settings Operations ===

    /// Load planner settings.
    ///
    /// A missing or unparseable file yields the defaults.
    pub fn load_settings(&self) -> Result<Settings> {
        let Some(content) = self.backend.read(SETTINGS_FILE)? else {
            return Ok(Settings::default());
        };
        match content.parse::<kdl::KdlDocument>() {
            Ok(doc) => Ok(Settings::from_kdl(&doc)),
            Err(e) => {
                tracing::warn!(error = %e, "settings file unreadable, using defaults");
                Ok(Settings::default())
            }
        }
    }

    /// Validate and replace planner settings.
    pub fn save_settings(&mut self, settings: &Settings) -> Result<()> {
        settings.validate().map_err(Error::InvalidInput)?;
        self.backend
            .write(SETTINGS_FILE, &settings.to_kdl().to_string())
    }

    // === Config Operations ===

    /// Load the data-dir config.kdl; a missing file yields the empty config.
    pub fn load_config(&self) -> Result<CutoverConfig> {
        match self.backend.read(CONFIG_FILE)? {
            Some(content) => {
                let doc: kdl::KdlDocument = content.parse()?;
                Ok(CutoverConfig::from_kdl(&doc))
            }
            None => Ok(CutoverConfig::default()),
        }
    }

    /// Replace the data-dir config.kdl.
    pub fn save_config(&mut self, config: &CutoverConfig) -> Result<()> {
        self.backend.write(CONFIG_FILE, &config.to_kdl().to_string())
    }
}
