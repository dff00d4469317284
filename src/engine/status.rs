//! Status vocabulary and lifecycle classification.
//!
//! The configured status list is ordered: the first entry means "not started",
//! the last means "completed" and anything between is "in progress". Only the
//! position of a status drives timestamp inference, never its text.

use serde::{Deserialize, Serialize};

/// Lifecycle stage implied by a status's position in the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusStage {
    /// Not present in the vocabulary
    Unrecognized,
    /// First entry
    NotStarted,
    /// Strictly between the first and last entries
    InProgress,
    /// Last entry of a vocabulary with two or more entries
    Completed,
    /// Sole entry of a single-status vocabulary, first and last at once
    Terminal,
}

impl StatusStage {
    /// Whether work has begun (position > 0).
    pub fn is_started(self) -> bool {
        matches!(self, StatusStage::InProgress | StatusStage::Completed)
    }

    /// Whether work is finished (position == last).
    pub fn is_completed(self) -> bool {
        matches!(self, StatusStage::Completed | StatusStage::Terminal)
    }
}

/// What an old -> new status change implies for timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StatusStage,
    pub to: StatusStage,
}

impl Transition {
    /// New status is started and the old one was not.
    pub fn starts_work(&self) -> bool {
        self.to.is_started() && !self.from.is_started()
    }

    /// New status is completed and the old one was not.
    pub fn completes_work(&self) -> bool {
        self.to.is_completed() && !self.from.is_completed()
    }
}

/// Ordered status vocabulary snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusVocabulary {
    statuses: Vec<String>,
}

impl StatusVocabulary {
    pub fn new(statuses: Vec<String>) -> Self {
        Self { statuses }
    }

    /// The "not started" status, if the vocabulary is non-empty.
    pub fn first(&self) -> Option<&str> {
        self.statuses.first().map(String::as_str)
    }

    pub fn position(&self, status: &str) -> Option<usize> {
        self.statuses.iter().position(|s| s == status)
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Classify a single status.
    pub fn stage(&self, status: &str) -> StatusStage {
        let Some(index) = self.position(status) else {
            return StatusStage::Unrecognized;
        };
        let last = self.statuses.len() - 1;
        match (index, last) {
            (0, 0) => StatusStage::Terminal,
            (0, _) => StatusStage::NotStarted,
            (i, l) if i == l => StatusStage::Completed,
            _ => StatusStage::InProgress,
        }
    }

    pub fn is_started_status(&self, status: &str) -> bool {
        self.stage(status).is_started()
    }

    pub fn is_completed_status(&self, status: &str) -> bool {
        self.stage(status).is_completed()
    }

    /// Classify the change from `old` to `new`.
    pub fn classify_transition(&self, old: &str, new: &str) -> Transition {
        let transition = Transition {
            from: self.stage(old),
            to: self.stage(new),
        };
        tracing::debug!(
            old,
            new,
            from = ?transition.from,
            to = ?transition.to,
            "classified status transition"
        );
        transition
    }
}

impl From<Vec<String>> for StatusVocabulary {
    fn from(statuses: Vec<String>) -> Self {
        Self::new(statuses)
    }
}
