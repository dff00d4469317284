//! Data models for Cutover entities.
//!
//! This module defines the core data structures:
//! - `Activity` - A unit of cut-over work with phase, status, timestamps and dependency
//! - `EditLog` / `EditLogEntry` - Append-only audit trail carried by each activity
//! - `ActivityUpdate` - Sparse update request (absent = unchanged, empty = clear)
//! - `NewActivity` - Creation request

pub mod plan;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::engine::duration::parse_instant;

/// A trackable unit of cut-over work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique identifier (e.g., "act-1a2b3c4d"), assigned once at creation
    #[serde(default)]
    pub id: String,

    /// Phase name; unmatched values are treated as uncategorized
    #[serde(default)]
    pub phase: String,

    /// Activity title
    #[serde(default)]
    pub title: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Roster id of the assignee
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub assignee: Option<String>,

    /// Current status, one of the configured status vocabulary
    #[serde(default)]
    pub status: String,

    /// When work began
    #[serde(
        default,
        deserialize_with = "lenient_instant",
        skip_serializing_if = "Option::is_none"
    )]
    pub begin_time: Option<DateTime<Utc>>,

    /// When work finished
    #[serde(
        default,
        deserialize_with = "lenient_instant",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,

    /// Elapsed time as `HH:MM:SS`
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<String>,

    /// Id of the activity this one follows (finish-to-start)
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub dependency: Option<String>,

    /// Audit trail, oldest first
    #[serde(default)]
    pub edit_log: EditLog,
}

impl Activity {
    /// Create an empty activity with the given ID and status.
    pub fn new(id: String, status: String) -> Self {
        Self {
            id,
            phase: String::new(),
            title: String::new(),
            description: String::new(),
            assignee: None,
            status,
            begin_time: None,
            end_time: None,
            duration: None,
            dependency: None,
            edit_log: EditLog::default(),
        }
    }

    /// Whether this activity follows the activity with the given id.
    pub fn depends_on(&self, id: &str) -> bool {
        self.dependency.as_deref() == Some(id)
    }
}

/// A single audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditLogEntry {
    /// When the change was recorded
    pub timestamp: DateTime<Utc>,

    /// Free-text description of the change
    pub action: String,

    /// Who made the change ("System" for automatic changes)
    pub user: String,
}

/// Ordered, append-only audit trail of an activity.
///
/// Stored oldest-first. Deserialization is best-effort: a JSON array, or a
/// JSON string containing an array, is accepted; entries that do not parse
/// are dropped and anything else yields an empty log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EditLog(Vec<EditLogEntry>);

impl EditLog {
    /// Entries in storage order (oldest first).
    pub fn entries(&self) -> &[EditLogEntry] {
        &self.0
    }

    /// Entries in display order (newest first).
    pub fn newest_first(&self) -> impl Iterator<Item = &EditLogEntry> {
        self.0.iter().rev()
    }

    /// Most recently appended entry.
    pub fn last(&self) -> Option<&EditLogEntry> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push(&mut self, entry: EditLogEntry) {
        self.0.push(entry);
    }

    fn from_value(value: serde_json::Value) -> Self {
        let value = match value {
            serde_json::Value::String(s) => {
                serde_json::from_str(&s).unwrap_or(serde_json::Value::Null)
            }
            other => other,
        };

        match value {
            serde_json::Value::Array(items) => EditLog(
                items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value(item).ok())
                    .collect(),
            ),
            _ => EditLog::default(),
        }
    }
}

impl<'de> Deserialize<'de> for EditLog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(EditLog::from_value(value))
    }
}

/// Sparse update for an existing activity.
///
/// `None` leaves a field unchanged; `Some("")` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<String>,

    /// Name recorded in the audit trail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_name: Option<String>,
}

impl ActivityUpdate {
    /// True when no activity field is provided (the editor name does not count).
    pub fn is_empty(&self) -> bool {
        self.phase.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.assignee.is_none()
            && self.status.is_none()
            && self.begin_time.is_none()
            && self.end_time.is_none()
            && self.duration.is_none()
            && self.dependency.is_none()
    }
}

/// Request to create a new activity.
///
/// Empty strings are treated the same as absent fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub begin_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub dependency: Option<String>,
    #[serde(default)]
    pub editor_name: Option<String>,
}

/// Return the value when it is present and not blank.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

fn lenient_instant<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(parse_instant))
}
