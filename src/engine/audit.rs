//! Audit trail appending.

use chrono::{DateTime, Utc};

use crate::models::{EditLog, EditLogEntry};

/// User recorded when no editor is identified.
pub const SYSTEM_USER: &str = "System";

/// Action recorded when an activity is created.
pub const ACTION_CREATED: &str = "Created";

/// Action recorded on dependents re-based by a cascade.
pub const ACTION_DEPENDENCY_SYNC: &str = "Auto-Updated: Begin Time synced from dependency finish";

/// Action recorded when an update changed nothing observable.
pub const ACTION_UPDATED_INLINE: &str = "Updated (Inline)";

/// Prefix of an update summary.
pub const ACTION_UPDATED_PREFIX: &str = "Updated: ";

impl EditLog {
    /// Append an entry attributed to `user` (or "System" when absent or blank).
    ///
    /// History is never reordered, deduplicated or truncated.
    pub fn append(&mut self, action: impl Into<String>, user: Option<&str>, at: DateTime<Utc>) {
        let user = user
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(SYSTEM_USER);
        self.push(EditLogEntry {
            timestamp: at,
            action: action.into(),
            user: user.to_string(),
        });
    }
}

/// Render an update summary from its change parts.
pub fn summarize(changes: &[String]) -> String {
    if changes.is_empty() {
        ACTION_UPDATED_INLINE.to_string()
    } else {
        format!("{}{}", ACTION_UPDATED_PREFIX, changes.join(", "))
    }
}
