//! CLI argument definitions for cutover.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::models::{ActivityUpdate, NewActivity};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CV_GIT_COMMIT"),
    " ",
    env!("CV_BUILD_TIMESTAMP"),
    ")"
);

/// Cutover - track the activities of a go-live plan.
///
/// Start with `cv system init`, then `cv activity create` and `cv activity list`.
#[derive(Parser, Debug)]
#[command(name = "cv")]
#[command(author, version, long_version = LONG_VERSION, about = "Track phased cut-over activities, their timings and dependencies", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Data directory holding activities.jsonl and settings.kdl.
    /// Can also be set via CV_DATA_DIR environment variable.
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Write logs to this file instead of stderr (filter with CV_LOG)
    #[arg(long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Activity management commands
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },

    /// Planner settings (phases, statuses, assignee roster)
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// CLI preferences (editor name, output format)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// System administration commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },

    /// Start the web interface and JSON API (requires 'gui' feature)
    #[cfg(feature = "gui")]
    Gui {
        /// Port to listen on (default: 3000, or CV_GUI_PORT env var)
        #[arg(short, long, env = "CV_GUI_PORT", default_value = "3000")]
        port: u16,

        /// Host address to bind to (default: 127.0.0.1, use 0.0.0.0 for network access)
        #[arg(long, env = "CV_GUI_HOST", default_value = "127.0.0.1")]
        host: String,
    },
}

/// Activity fields shared by create and update.
///
/// On update an empty value clears the field.
#[derive(Args, Debug, Default, Clone)]
pub struct ActivityFields {
    /// Phase name (one of the configured phases)
    #[arg(long)]
    pub phase: Option<String>,

    /// Detailed description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Assignee roster id
    #[arg(short, long)]
    pub assignee: Option<String>,

    /// Status (one of the configured statuses)
    #[arg(short, long)]
    pub status: Option<String>,

    /// Begin time (RFC 3339, e.g. 2025-05-01T09:00:00Z)
    #[arg(long = "begin")]
    pub begin_time: Option<String>,

    /// End time (RFC 3339)
    #[arg(long = "end")]
    pub end_time: Option<String>,

    /// Duration as HH:MM:SS (recomputed when both begin and end are set)
    #[arg(long)]
    pub duration: Option<String>,

    /// Id of the activity this one follows
    #[arg(long)]
    pub dependency: Option<String>,

    /// Name recorded in the audit trail (default: config editor-name, else System)
    #[arg(long = "editor")]
    pub editor_name: Option<String>,
}

impl ActivityFields {
    /// Build a creation request with the given title.
    pub fn into_new(self, title: String) -> NewActivity {
        NewActivity {
            phase: self.phase,
            title: Some(title),
            description: self.description,
            assignee: self.assignee,
            status: self.status,
            begin_time: self.begin_time,
            end_time: self.end_time,
            duration: self.duration,
            dependency: self.dependency,
            editor_name: self.editor_name,
        }
    }

    /// Build a sparse update, with an optional new title.
    pub fn into_update(self, title: Option<String>) -> ActivityUpdate {
        ActivityUpdate {
            phase: self.phase,
            title,
            description: self.description,
            assignee: self.assignee,
            status: self.status,
            begin_time: self.begin_time,
            end_time: self.end_time,
            duration: self.duration,
            dependency: self.dependency,
            editor_name: self.editor_name,
        }
    }
}

/// Activity subcommands
#[derive(Subcommand, Debug)]
pub enum ActivityCommands {
    /// Create a new activity
    Create {
        /// Activity title
        #[arg(short, long)]
        title: String,

        #[command(flatten)]
        fields: ActivityFields,
    },

    /// Show activity details
    Show {
        /// Activity ID (e.g., act-1a2b3c4d)
        id: String,
    },

    /// List activities grouped by phase
    List {
        /// Only show activities in this phase
        #[arg(long)]
        phase: Option<String>,

        /// Only show activities with this status
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Update an activity (status changes infer begin/end times)
    Update {
        /// Activity ID
        id: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        #[command(flatten)]
        fields: ActivityFields,
    },

    /// Apply the same update to several activities
    BulkUpdate {
        /// Activity IDs
        #[arg(required = true)]
        ids: Vec<String>,

        #[command(flatten)]
        fields: ActivityFields,
    },

    /// Delete one or more activities
    Delete {
        /// Activity IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show the edit history of an activity (newest first)
    Log {
        /// Activity ID
        id: String,
    },
}

/// Settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show current settings
    Show,

    /// Replace settings from a JSON document (requires phases and statuses)
    Set {
        /// Path to the JSON file (use '-' for stdin)
        source: String,
    },

    /// Set the activity list title
    Title {
        /// New title
        title: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved preferences and where each came from
    Show,

    /// Set a preference in the data directory's config.kdl
    Set {
        /// Configuration key (editor-name, output-format)
        key: String,
        /// Configuration value
        value: String,
    },
}

/// System administration subcommands
#[derive(Subcommand, Debug)]
pub enum SystemCommands {
    /// Initialize the data directory
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_accepts_empty_value_to_clear() {
        let cli = Cli::try_parse_from(["cv", "activity", "update", "act-1", "--end", ""]).unwrap();
        match cli.command {
            Commands::Activity {
                command: ActivityCommands::Update { id, fields, .. },
            } => {
                assert_eq!(id, "act-1");
                let update = fields.into_update(None);
                assert_eq!(update.end_time.as_deref(), Some(""));
                assert!(update.begin_time.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_create_requires_title() {
        assert!(Cli::try_parse_from(["cv", "activity", "create"]).is_err());
        let cli = Cli::try_parse_from([
            "cv", "-H", "activity", "create", "--title", "Backup", "--phase", "Prep",
        ])
        .unwrap();
        assert!(cli.human_readable);
    }

    #[test]
    fn test_delete_requires_ids() {
        assert!(Cli::try_parse_from(["cv", "activity", "delete"]).is_err());
    }
}
