//! Command implementations for the cutover CLI.
//!
//! This module contains the business logic for each CLI command.
//! Commands are organized by entity type:
//! - `system` - Initialize a data directory
//! - `activity` - Activity CRUD, bulk operations and audit trail
//! - `settings` - Planner settings
//! - `config` - CLI preferences
//!
//! Every command returns a result implementing [`Output`] so the caller can
//! render it as JSON or as human-readable text.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::config::{
    ConfigOverrides, CutoverConfig, OutputFormat, Settings, resolve_config,
};
use crate::engine::{self, BulkDeleteOutcome, BulkOutcome, UpdateOutcome};
use crate::models::plan::{activity_number, group_by_phase, total_duration};
use crate::models::{Activity, ActivityUpdate, EditLogEntry, NewActivity};
use crate::storage::Storage;
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

fn fmt_instant(instant: Option<DateTime<Utc>>) -> String {
    instant
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "-".to_string())
}

fn assignee_label(settings: &Settings, id: Option<&str>) -> Option<String> {
    let id = id?;
    Some(
        settings
            .assignee(id)
            .map(|a| a.display_name())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| id.to_string()),
    )
}

// === System Commands ===

/// Result of `cv system init`.
#[derive(Debug, Serialize)]
pub struct InitResult {
    /// False when the data directory was already initialized
    pub initialized: bool,
    pub data_dir: String,
}

impl Output for InitResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.initialized {
            format!("Initialized cutover data directory at {}", self.data_dir)
        } else {
            format!("Already initialized at {}", self.data_dir)
        }
    }
}

/// Create the data directory, an empty record file and default settings.
pub fn system_init(data_dir: &Path) -> Result<InitResult> {
    let already = Storage::exists(data_dir);
    let storage = Storage::init(data_dir)?;
    Ok(InitResult {
        initialized: !already,
        data_dir: storage.location(),
    })
}

// === Activity Commands ===

/// A single activity, as returned by create and show.
#[derive(Debug, Serialize)]
pub struct ActivityDetail {
    #[serde(flatten)]
    pub activity: Activity,
    /// Display number `P.N`, absent for uncategorized activities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip)]
    assignee_name: Option<String>,
    #[serde(skip)]
    created: bool,
}

impl ActivityDetail {
    fn new(activity: Activity, settings: &Settings, records: &[Activity]) -> Self {
        let number = activity_number(&activity, &settings.phases, records);
        let assignee_name = assignee_label(settings, activity.assignee.as_deref());
        Self {
            activity,
            number,
            assignee_name,
            created: false,
        }
    }
}

impl Output for ActivityDetail {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let a = &self.activity;
        if self.created {
            return format!("Created activity {} \"{}\" [{}]", a.id, a.title, a.status);
        }

        let mut lines = vec![match &self.number {
            Some(n) => format!("{} {} {}", n, a.id, a.title),
            None => format!("{} {}", a.id, a.title),
        }];
        lines.push(format!(
            "  Phase: {}",
            if a.phase.is_empty() { "-" } else { &a.phase }
        ));
        lines.push(format!("  Status: {}", a.status));
        lines.push(format!(
            "  Assignee: {}",
            self.assignee_name.as_deref().unwrap_or("-")
        ));
        lines.push(format!("  Begin: {}", fmt_instant(a.begin_time)));
        lines.push(format!("  End: {}", fmt_instant(a.end_time)));
        lines.push(format!(
            "  Duration: {}",
            a.duration.as_deref().unwrap_or("-")
        ));
        if let Some(ref dep) = a.dependency {
            lines.push(format!("  Depends on: {}", dep));
        }
        if !a.description.is_empty() {
            lines.push(String::new());
            lines.push(format!("  {}", a.description));
        }
        lines.join("\n")
    }
}

/// Create a new activity.
pub fn activity_create(data_dir: &Path, request: &NewActivity) -> Result<ActivityDetail> {
    let mut storage = Storage::open(data_dir)?;
    let detail = storage.transact(|records, settings| {
        let activity = engine::create(records, request, &settings.status_vocabulary(), Utc::now());
        Ok(ActivityDetail {
            created: true,
            ..ActivityDetail::new(activity, settings, records)
        })
    })?;
    tracing::info!(id = %detail.activity.id, "created activity");
    Ok(detail)
}

/// Show one activity.
pub fn activity_show(data_dir: &Path, id: &str) -> Result<ActivityDetail> {
    let storage = Storage::open(data_dir)?;
    let settings = storage.load_settings()?;
    let records = storage.load_activities()?;
    let activity = records
        .iter()
        .find(|a| a.id == id)
        .cloned()
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    Ok(ActivityDetail::new(activity, &settings, &records))
}

/// Result of updating one activity.
#[derive(Debug, Serialize)]
pub struct UpdateResult {
    #[serde(flatten)]
    pub outcome: UpdateOutcome,
}

impl Output for UpdateResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let a = &self.outcome.activity;
        let mut out = format!("Updated activity {} [{}]", a.id, a.status);
        if let Some(entry) = a.edit_log.last() {
            out.push_str(&format!("\n  {} ({})", entry.action, entry.user));
        }
        if !self.outcome.cascaded.is_empty() {
            out.push_str(&format!(
                "\n  Re-based dependents: {}",
                self.outcome.cascaded.join(", ")
            ));
        }
        out
    }
}

/// Apply a sparse update to one activity.
pub fn activity_update(data_dir: &Path, id: &str, request: &ActivityUpdate) -> Result<UpdateResult> {
    if request.is_empty() {
        return Err(Error::InvalidInput(
            "No fields to update. Pass at least one field flag.".to_string(),
        ));
    }
    let mut storage = Storage::open(data_dir)?;
    let outcome = storage.transact(|records, settings| {
        engine::update(records, id, request, &settings.status_vocabulary(), Utc::now())
    })?;
    tracing::info!(id, cascaded = outcome.cascaded.len(), "updated activity");
    Ok(UpdateResult { outcome })
}

/// Result of a bulk update.
#[derive(Debug, Serialize)]
pub struct BulkUpdateResult {
    #[serde(flatten)]
    pub outcome: BulkOutcome,
}

impl Output for BulkUpdateResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("Updated {} activities", self.outcome.updated.len())];
        for updated in &self.outcome.updated {
            let mut line = format!("  {} [{}]", updated.activity.id, updated.activity.status);
            if !updated.cascaded.is_empty() {
                line.push_str(&format!(" -> re-based {}", updated.cascaded.join(", ")));
            }
            lines.push(line);
        }
        if !self.outcome.missing.is_empty() {
            lines.push(format!("Not found: {}", self.outcome.missing.join(", ")));
        }
        lines.join("\n")
    }
}

/// Apply the same sparse update to several activities in one commit.
pub fn activity_bulk_update(
    data_dir: &Path,
    ids: &[String],
    request: &ActivityUpdate,
) -> Result<BulkUpdateResult> {
    if request.is_empty() {
        return Err(Error::InvalidInput(
            "No fields to update. Pass at least one field flag.".to_string(),
        ));
    }
    let mut storage = Storage::open(data_dir)?;
    let outcome = storage.transact(|records, settings| {
        engine::bulk_update(
            records,
            ids,
            request,
            &settings.status_vocabulary(),
            Utc::now(),
        )
    })?;
    tracing::info!(
        updated = outcome.updated.len(),
        missing = outcome.missing.len(),
        "bulk updated activities"
    );
    Ok(BulkUpdateResult { outcome })
}

/// Result of deleting activities.
#[derive(Debug, Serialize)]
pub struct DeleteResult {
    #[serde(flatten)]
    pub outcome: BulkDeleteOutcome,
}

impl Output for DeleteResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut out = match self.outcome.deleted.len() {
            0 => "No activities deleted".to_string(),
            1 => format!("Deleted activity {}", self.outcome.deleted[0]),
            n => format!("Deleted {} activities: {}", n, self.outcome.deleted.join(", ")),
        };
        if !self.outcome.missing.is_empty() {
            out.push_str(&format!("\nNot found: {}", self.outcome.missing.join(", ")));
        }
        out
    }
}

/// Delete one activity. Unknown ids are an error.
pub fn activity_delete(data_dir: &Path, id: &str) -> Result<DeleteResult> {
    let mut storage = Storage::open(data_dir)?;
    let removed = storage.transact(|records, _| engine::delete(records, id))?;
    tracing::info!(id = %removed.id, "deleted activity");
    Ok(DeleteResult {
        outcome: BulkDeleteOutcome {
            deleted: vec![removed.id],
            missing: Vec::new(),
        },
    })
}

/// Delete several activities in one commit. Unknown ids are reported.
pub fn activity_bulk_delete(data_dir: &Path, ids: &[String]) -> Result<DeleteResult> {
    let mut storage = Storage::open(data_dir)?;
    let outcome = storage.transact(|records, _| engine::bulk_delete(records, ids))?;
    tracing::info!(deleted = outcome.deleted.len(), "bulk deleted activities");
    Ok(DeleteResult { outcome })
}

/// One row of the activity list.
#[derive(Debug, Serialize)]
pub struct ListedActivity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(flatten)]
    pub activity: Activity,
    #[serde(skip)]
    assignee_name: Option<String>,
}

/// Activities of one phase in the list.
#[derive(Debug, Serialize)]
pub struct PhaseListing {
    pub number: usize,
    pub name: String,
    pub total_duration: String,
    pub activities: Vec<ListedActivity>,
}

/// Result of `cv activity list`.
#[derive(Debug, Serialize)]
pub struct ActivityList {
    pub title: String,
    pub count: usize,
    pub total_duration: String,
    pub phases: Vec<PhaseListing>,
    pub uncategorized: Vec<ListedActivity>,
}

fn format_row(row: &ListedActivity) -> String {
    let a = &row.activity;
    let mut line = format!(
        "  {:<5} {}  [{}]  {}",
        row.number.as_deref().unwrap_or("-"),
        a.id,
        a.status,
        a.title
    );
    if let Some(ref name) = row.assignee_name {
        line.push_str(&format!("  @{}", name));
    }
    if let Some(ref duration) = a.duration {
        line.push_str(&format!("  {}", duration));
    }
    line
}

impl Output for ActivityList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.count == 0 {
            return format!("{}\n  No activities found for this filter.", self.title);
        }

        let mut lines = vec![format!(
            "{}  {} {}  Total: {}",
            self.title,
            self.count,
            if self.count == 1 { "activity" } else { "activities" },
            self.total_duration
        )];
        for phase in &self.phases {
            lines.push(String::new());
            lines.push(format!(
                "Phase {}: {}  Total: {}",
                phase.number, phase.name, phase.total_duration
            ));
            if phase.activities.is_empty() {
                lines.push("  No activities in this phase.".to_string());
            }
            lines.extend(phase.activities.iter().map(format_row));
        }
        if !self.uncategorized.is_empty() {
            lines.push(String::new());
            lines.push("Uncategorized Activities".to_string());
            lines.extend(self.uncategorized.iter().map(format_row));
        }
        lines.join("\n")
    }
}

/// List activities grouped by phase, optionally filtered by phase and status.
///
/// Display numbers and totals follow the filtered set. A phase filter hides
/// the other phase groups.
pub fn activity_list(
    data_dir: &Path,
    phase: Option<&str>,
    status: Option<&str>,
) -> Result<ActivityList> {
    let storage = Storage::open(data_dir)?;
    let settings = storage.load_settings()?;
    let records = storage.load_activities()?;

    let shown: Vec<Activity> = records
        .iter()
        .filter(|a| phase.is_none_or(|p| a.phase == p))
        .filter(|a| status.is_none_or(|s| a.status == s))
        .cloned()
        .collect();

    let row = |a: &Activity| ListedActivity {
        number: activity_number(a, &settings.phases, &shown),
        activity: a.clone(),
        assignee_name: assignee_label(&settings, a.assignee.as_deref()),
    };

    let grouping = group_by_phase(&shown, &settings.phases);
    let phases = grouping
        .phases
        .iter()
        .filter(|group| phase.is_none_or(|p| group.name == p))
        .map(|group| PhaseListing {
            number: group.number,
            name: group.name.to_string(),
            total_duration: group.total_duration.clone(),
            activities: group.activities.iter().map(|a| row(a)).collect(),
        })
        .collect();
    let uncategorized = grouping.uncategorized.iter().map(|a| row(a)).collect();

    Ok(ActivityList {
        title: settings.activity_list_title.clone(),
        count: shown.len(),
        total_duration: total_duration(&shown),
        phases,
        uncategorized,
    })
}

/// Result of `cv activity log`.
#[derive(Debug, Serialize)]
pub struct ActivityLog {
    pub id: String,
    /// Newest first
    pub entries: Vec<EditLogEntry>,
}

impl Output for ActivityLog {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.entries.is_empty() {
            return format!("No edit history for {}", self.id);
        }
        let mut lines = vec![format!("Edit history for {}:", self.id)];
        for entry in &self.entries {
            lines.push(format!(
                "  {}  {:<12}  {}",
                entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                entry.user,
                entry.action
            ));
        }
        lines.join("\n")
    }
}

/// Audit trail of one activity, newest first.
pub fn activity_log(data_dir: &Path, id: &str) -> Result<ActivityLog> {
    let storage = Storage::open(data_dir)?;
    let activity = storage.get_activity(id)?;
    Ok(ActivityLog {
        id: activity.id.clone(),
        entries: activity.edit_log.newest_first().cloned().collect(),
    })
}

// === Settings Commands ===

/// Planner settings, as shown or after a change.
#[derive(Debug, Serialize)]
pub struct SettingsResult {
    #[serde(flatten)]
    pub settings: Settings,
    #[serde(skip)]
    updated: bool,
}

impl Output for SettingsResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let s = &self.settings;
        let mut lines = Vec::new();
        if self.updated {
            lines.push("Settings updated.".to_string());
        }
        lines.push(format!("{} / {}", s.app_name, s.activity_list_title));
        lines.push("Phases:".to_string());
        for (i, phase) in s.phases.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, phase));
        }
        lines.push(format!("Statuses: {}", s.statuses.join(" -> ")));
        if !s.assignees.is_empty() {
            lines.push("Assignees:".to_string());
            for a in &s.assignees {
                lines.push(format!(
                    "  {}  {}  <{}>  {}",
                    a.id,
                    a.display_name(),
                    a.email,
                    a.timezone
                ));
            }
        }
        if !s.work_hours.is_empty() {
            lines.push("Work hours:".to_string());
            for wh in &s.work_hours {
                lines.push(format!("  {}  {}", wh.id, wh.label));
            }
        }
        lines.join("\n")
    }
}

/// Show planner settings.
pub fn settings_show(data_dir: &Path) -> Result<SettingsResult> {
    let storage = Storage::open(data_dir)?;
    Ok(SettingsResult {
        settings: storage.load_settings()?,
        updated: false,
    })
}

/// Replace planner settings from a JSON document read from `source`
/// (a file path, or `-` for stdin).
pub fn settings_set(data_dir: &Path, source: &str) -> Result<SettingsResult> {
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(source)?
    };
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let settings = Settings::from_json_value(value).map_err(Error::InvalidInput)?;

    let mut storage = Storage::open(data_dir)?;
    storage.save_settings(&settings)?;
    tracing::info!(
        phases = settings.phases.len(),
        statuses = settings.statuses.len(),
        "replaced settings"
    );
    Ok(SettingsResult {
        settings,
        updated: true,
    })
}

/// Set the activity list title.
pub fn settings_title(data_dir: &Path, title: &str) -> Result<SettingsResult> {
    let mut storage = Storage::open(data_dir)?;
    let mut settings = storage.load_settings()?;
    settings.activity_list_title = title.to_string();
    storage.save_settings(&settings)?;
    Ok(SettingsResult {
        settings,
        updated: true,
    })
}

// === Config Commands ===

/// A resolved preference with its source.
#[derive(Debug, Serialize)]
pub struct ConfigValue {
    pub value: String,
    pub source: String,
}

/// Result of `cv config show`.
#[derive(Debug, Serialize)]
pub struct ConfigShowResult {
    pub editor_name: Option<ConfigValue>,
    pub output_format: ConfigValue,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let editor = match &self.editor_name {
            Some(v) => format!("{} ({})", v.value, v.source),
            None => "(unset, edits recorded as System)".to_string(),
        };
        format!(
            "editor-name: {}\noutput-format: {} ({})",
            editor, self.output_format.value, self.output_format.source
        )
    }
}

/// Show resolved CLI preferences with their sources.
pub fn config_show(data_dir: &Path, overrides: &ConfigOverrides) -> Result<ConfigShowResult> {
    let resolved = resolve_config(data_dir, overrides)?;
    Ok(ConfigShowResult {
        editor_name: resolved.editor_name.as_ref().map(|r| ConfigValue {
            value: r.value.clone(),
            source: r.source.to_string(),
        }),
        output_format: ConfigValue {
            value: resolved.output_format.value.to_string(),
            source: resolved.output_format.source.to_string(),
        },
    })
}

/// Result of `cv config set`.
#[derive(Debug, Serialize)]
pub struct ConfigSetResult {
    pub key: String,
    pub value: String,
}

impl Output for ConfigSetResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Set {} = {}", self.key, self.value)
    }
}

/// Set a preference in the data-dir config.kdl.
pub fn config_set(data_dir: &Path, key: &str, value: &str) -> Result<ConfigSetResult> {
    let mut storage = Storage::open(data_dir)?;
    let mut config = storage.load_config()?;
    let update = match key {
        "editor-name" => CutoverConfig {
            editor_name: Some(value.to_string()),
            output_format: None,
        },
        "output-format" => CutoverConfig {
            editor_name: None,
            output_format: Some(OutputFormat::parse(value).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Invalid output format '{}': expected json or human",
                    value
                ))
            })?),
        },
        other => {
            return Err(Error::InvalidInput(format!(
                "Unknown config key '{}': expected editor-name or output-format",
                other
            )));
        }
    };
    config.merge(&update);
    storage.save_config(&config)?;
    Ok(ConfigSetResult {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    fn create(env: &TestEnv, title: &str, phase: &str) -> Activity {
        activity_create(
            env.data_path(),
            &NewActivity {
                title: Some(title.to_string()),
                phase: Some(phase.to_string()),
                ..Default::default()
            },
        )
        .unwrap()
        .activity
    }

    #[test]
    fn test_system_init_reports_first_run() {
        let env = TestEnv::new();
        assert!(system_init(env.data_path()).unwrap().initialized);
        assert!(!system_init(env.data_path()).unwrap().initialized);
    }

    #[test]
    fn test_commands_require_init() {
        let env = TestEnv::new();
        assert!(matches!(
            activity_list(env.data_path(), None, None),
            Err(Error::NotInitialized)
        ));
    }

    #[test]
    fn test_create_uses_first_status_and_numbers_activity() {
        let env = TestEnv::new();
        env.init_storage();
        let detail = activity_create(
            env.data_path(),
            &NewActivity {
                title: Some("Freeze changes".to_string()),
                phase: Some("Phase 1: Pre-Cutover".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(detail.activity.status, "Not Started");
        assert_eq!(detail.number.as_deref(), Some("1.1"));
        assert!(detail.to_human().starts_with("Created activity act-"));
        assert!(detail.to_json().contains("\"number\":\"1.1\""));
    }

    #[test]
    fn test_update_persists_and_cascades() {
        let env = TestEnv::new();
        env.init_storage();
        let a = create(&env, "A", "Phase 1: Pre-Cutover");
        let b = activity_create(
            env.data_path(),
            &NewActivity {
                title: Some("B".to_string()),
                dependency: Some(a.id.clone()),
                ..Default::default()
            },
        )
        .unwrap()
        .activity;

        let result = activity_update(
            env.data_path(),
            &a.id,
            &ActivityUpdate {
                status: Some("Completed".to_string()),
                editor_name: Some("Dana".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(result.outcome.cascaded, vec![b.id.clone()]);

        let b_after = activity_show(env.data_path(), &b.id).unwrap().activity;
        assert_eq!(b_after.begin_time, result.outcome.activity.end_time);

        let log = activity_log(env.data_path(), &a.id).unwrap();
        assert_eq!(log.entries.len(), 2);
        assert_eq!(log.entries[0].user, "Dana");
        assert_eq!(log.entries[1].action, "Created");
    }

    #[test]
    fn test_update_unknown_id_leaves_store_untouched() {
        let env = TestEnv::new();
        env.init_storage();
        create(&env, "A", "Phase 1: Pre-Cutover");

        let err = activity_update(
            env.data_path(),
            "act-00000000",
            &ActivityUpdate {
                title: Some("x".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(activity_list(env.data_path(), None, None).unwrap().count, 1);
    }

    #[test]
    fn test_update_without_fields_is_rejected() {
        let env = TestEnv::new();
        env.init_storage();
        let a = create(&env, "A", "Phase 1: Pre-Cutover");
        assert!(matches!(
            activity_update(env.data_path(), &a.id, &ActivityUpdate::default()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_list_groups_filters_and_keeps_numbers() {
        let env = TestEnv::new();
        env.init_storage();
        create(&env, "Prep 1", "Phase 1: Pre-Cutover");
        let second = create(&env, "Prep 2", "Phase 1: Pre-Cutover");
        create(&env, "Legacy", "Old phase");
        activity_update(
            env.data_path(),
            &second.id,
            &ActivityUpdate {
                status: Some("In Progress".to_string()),
                duration: Some("01:30:00".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let all = activity_list(env.data_path(), None, None).unwrap();
        assert_eq!(all.count, 3);
        assert_eq!(all.uncategorized.len(), 1);
        assert_eq!(all.total_duration, "01:30:00");
        let human = all.to_human();
        assert!(human.contains("Phase 1: Phase 1: Pre-Cutover  Total: 01:30:00"));
        assert!(human.contains("Phase 2: Phase 2: Ramp Down  Total: 00:00:00"));
        assert!(human.contains("No activities in this phase."));
        assert!(human.contains("Uncategorized Activities"));
        assert_eq!(all.phases[0].activities[1].number.as_deref(), Some("1.2"));

        let filtered = activity_list(env.data_path(), None, Some("In Progress")).unwrap();
        assert_eq!(filtered.count, 1);
        assert_eq!(filtered.phases.len(), 5);
        assert_eq!(
            filtered.phases[0].activities[0].number.as_deref(),
            Some("1.1")
        );

        let by_phase = activity_list(env.data_path(), Some("Old phase"), None).unwrap();
        assert_eq!(by_phase.count, 1);
        assert!(by_phase.phases.is_empty());
        assert_eq!(by_phase.uncategorized.len(), 1);
    }

    #[test]
    fn test_delete_and_bulk_delete() {
        let env = TestEnv::new();
        env.init_storage();
        let a = create(&env, "A", "");
        let b = create(&env, "B", "");
        let c = create(&env, "C", "");

        activity_delete(env.data_path(), &a.id).unwrap();
        assert!(matches!(
            activity_delete(env.data_path(), &a.id),
            Err(Error::NotFound(_))
        ));

        let result =
            activity_bulk_delete(env.data_path(), &[b.id.clone(), "ghost".to_string()]).unwrap();
        assert_eq!(result.outcome.deleted, vec![b.id]);
        assert_eq!(result.outcome.missing, vec!["ghost".to_string()]);

        let remaining = activity_list(env.data_path(), None, None).unwrap();
        assert_eq!(remaining.count, 1);
        assert_eq!(remaining.uncategorized[0].activity.id, c.id);
    }

    #[test]
    fn test_bulk_update_applies_to_each() {
        let env = TestEnv::new();
        env.init_storage();
        let a = create(&env, "A", "");
        let b = create(&env, "B", "");

        let result = activity_bulk_update(
            env.data_path(),
            &[a.id.clone(), b.id.clone()],
            &ActivityUpdate {
                phase: Some("Phase 4: Cutover".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(result.outcome.updated.len(), 2);

        let list = activity_list(env.data_path(), Some("Phase 4: Cutover"), None).unwrap();
        assert_eq!(list.count, 2);
        assert_eq!(list.phases.len(), 1);
        assert_eq!(list.phases[0].activities[1].number.as_deref(), Some("4.2"));
    }

    #[test]
    fn test_settings_set_from_file_and_title() {
        let env = TestEnv::new();
        env.init_storage();
        let file = env.data_path().join("new-settings.json");
        std::fs::write(
            &file,
            r#"{"phases": ["Only"], "statuses": ["Open", "Closed"]}"#,
        )
        .unwrap();

        let result = settings_set(env.data_path(), file.to_str().unwrap()).unwrap();
        assert_eq!(result.settings.statuses, vec!["Open", "Closed"]);

        let result = settings_title(env.data_path(), "Weekend Go-Live").unwrap();
        assert_eq!(result.settings.activity_list_title, "Weekend Go-Live");
        assert_eq!(result.settings.phases, vec!["Only"]);

        let a = create(&env, "A", "Only");
        assert_eq!(a.status, "Open");
    }

    #[test]
    fn test_settings_set_rejects_missing_statuses() {
        let env = TestEnv::new();
        env.init_storage();
        let file = env.data_path().join("bad.json");
        std::fs::write(&file, r#"{"phases": ["Only"]}"#).unwrap();

        assert!(matches!(
            settings_set(env.data_path(), file.to_str().unwrap()),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(
            settings_show(env.data_path()).unwrap().settings,
            Settings::default()
        );
    }

    #[test]
    fn test_config_set_validates_keys() {
        let env = TestEnv::new();
        env.init_storage();
        config_set(env.data_path(), "output-format", "human").unwrap();
        assert!(config_set(env.data_path(), "output-format", "xml").is_err());
        assert!(config_set(env.data_path(), "colour", "blue").is_err());

        let shown = config_show(env.data_path(), &ConfigOverrides::new()).unwrap();
        assert_eq!(shown.output_format.value, "human");
        assert_eq!(shown.output_format.source, "session");
    }
}
