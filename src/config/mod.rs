//! Configuration for cutover.
//!
//! This module defines KDL schemas for two distinct files:
//!
//! ## settings.kdl - Planner settings (lives in the data directory)
//!
//! Contains:
//! - `app-name`, `activity-list-title` - Display strings
//! - `phases` - Ordered phase names
//! - `statuses` - Ordered status vocabulary
//! - `work-hours`, `assignee` - Assignee roster
//!
//! Served to and replaced by the web interface as JSON.
//!
//! ## config.kdl - CLI preferences
//!
//! Located at:
//! - System: `~/.config/cutover/config.kdl`
//! - Session: `<data-dir>/config.kdl`
//!
//! Contains:
//! - `editor-name` - Name recorded in audit entries for CLI edits
//! - `output-format` - "json" or "human"
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, DATA_DIR_ENV, EDITOR_NAME_ENV, Resolved, ResolvedConfig, ValueSource,
    resolve_config, resolve_data_dir,
};
pub use schema::{Assignee, CutoverConfig, OutputFormat, Settings, WorkHours};
