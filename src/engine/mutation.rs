//! Applying creation requests and sparse updates to a single activity.
//!
//! Timestamps are inferred from status transitions, durations are recomputed
//! from the endpoints and every change is recorded in the audit trail.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::engine::audit::{self, ACTION_CREATED};
use crate::engine::duration::{compute_duration, parse_instant};
use crate::engine::status::StatusVocabulary;
use crate::models::{Activity, ActivityUpdate, NewActivity, non_empty};

/// Prefix of generated activity ids.
pub const ID_PREFIX: &str = "act";

/// Status used for new activities when the vocabulary is empty.
pub const FALLBACK_STATUS: &str = "Pending";

/// Read-only inputs for one mutation.
#[derive(Debug, Clone, Copy)]
pub struct MutationContext<'a> {
    /// Status vocabulary snapshot for this operation
    pub statuses: &'a StatusVocabulary,
    /// Current record set, used to resolve dependencies
    pub records: &'a [Activity],
    /// The instant this operation happens at
    pub now: DateTime<Utc>,
}

/// Result of applying an update.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub activity: Activity,
    /// Whether `end_time` differs from the prior record (cascade trigger)
    pub end_time_changed: bool,
}

/// Apply a sparse update to `existing`.
///
/// Order matters: dependency sync, then status-driven inference, then
/// explicit begin/end values, which always win.
pub fn apply_update(
    existing: &Activity,
    update: &ActivityUpdate,
    ctx: &MutationContext<'_>,
) -> Mutation {
    let mut activity = existing.clone();
    let new_status = update
        .status
        .clone()
        .unwrap_or_else(|| existing.status.clone());

    if let Some(phase) = &update.phase {
        activity.phase = phase.clone();
    }
    if let Some(title) = &update.title {
        activity.title = title.clone();
    }
    if let Some(description) = &update.description {
        activity.description = description.clone();
    }
    if let Some(assignee) = &update.assignee {
        activity.assignee = non_empty(Some(assignee)).map(str::to_string);
    }

    if let Some(dependency) = &update.dependency {
        activity.dependency = non_empty(Some(dependency)).map(str::to_string);
        if let Some(finish) = activity
            .dependency
            .as_deref()
            .and_then(|id| dependency_finish(ctx.records, id))
        {
            activity.begin_time = Some(finish);
        }
    }

    let transition = ctx
        .statuses
        .classify_transition(&existing.status, &new_status);
    if transition.starts_work() && activity.begin_time.is_none() {
        activity.begin_time = Some(ctx.now);
    }
    if transition.completes_work() {
        activity.end_time = Some(ctx.now);
    }

    if let Some(begin) = &update.begin_time {
        activity.begin_time = parse_instant(begin);
    }
    if let Some(end) = &update.end_time {
        activity.end_time = parse_instant(end);
    }

    if activity.begin_time.is_some() && activity.end_time.is_some() {
        activity.duration = compute_duration(activity.begin_time, activity.end_time);
    }
    if let Some(duration) = &update.duration {
        activity.duration = non_empty(Some(duration)).map(str::to_string);
    }

    activity.status = new_status;

    let changes = describe_changes(existing, &activity, update);
    activity.edit_log.append(
        audit::summarize(&changes),
        update.editor_name.as_deref(),
        ctx.now,
    );

    let end_time_changed = activity.end_time != existing.end_time;
    Mutation {
        activity,
        end_time_changed,
    }
}

/// Build a new activity from a creation request.
///
/// Empty request fields count as absent. The status defaults to the first
/// vocabulary entry. Creating straight into the completed status fills both
/// endpoints with the same instant.
pub fn create_activity(request: &NewActivity, ctx: &MutationContext<'_>) -> Activity {
    let status = non_empty(request.status.as_deref())
        .or_else(|| ctx.statuses.first())
        .unwrap_or(FALLBACK_STATUS)
        .to_string();

    let mut activity = Activity::new(generate_id(request, ctx), status);
    activity.phase = request.phase.clone().unwrap_or_default();
    activity.title = request.title.clone().unwrap_or_default();
    activity.description = request.description.clone().unwrap_or_default();
    activity.assignee = non_empty(request.assignee.as_deref()).map(str::to_string);
    activity.dependency = non_empty(request.dependency.as_deref()).map(str::to_string);
    activity.duration = non_empty(request.duration.as_deref()).map(str::to_string);
    activity.begin_time = request.begin_time.as_deref().and_then(parse_instant);
    activity.end_time = request.end_time.as_deref().and_then(parse_instant);
    activity
        .edit_log
        .append(ACTION_CREATED, request.editor_name.as_deref(), ctx.now);

    if activity.begin_time.is_none() {
        if let Some(finish) = activity
            .dependency
            .as_deref()
            .and_then(|id| dependency_finish(ctx.records, id))
        {
            activity.begin_time = Some(finish);
        }
    }

    let stage = ctx.statuses.stage(&activity.status);
    if stage.is_started() && activity.begin_time.is_none() {
        activity.begin_time = Some(ctx.now);
    }
    if stage.is_completed() && activity.end_time.is_none() {
        activity.end_time = Some(ctx.now);
        if activity.begin_time.is_none() {
            activity.begin_time = activity.end_time;
        }
    }

    if activity.begin_time.is_some() && activity.end_time.is_some() {
        activity.duration = compute_duration(activity.begin_time, activity.end_time);
    }

    activity
}

/// Generate an id that is not yet used in the record set.
///
/// Format: `act-<8 hex chars>`
pub fn generate_id(request: &NewActivity, ctx: &MutationContext<'_>) -> String {
    let seed = request.title.as_deref().unwrap_or_default();
    let mut attempt: u32 = 0;
    loop {
        let mut hasher = Sha256::new();
        hasher.update(seed.as_bytes());
        hasher.update(ctx.now.timestamp_nanos_opt().unwrap_or(0).to_le_bytes());
        hasher.update(attempt.to_le_bytes());
        let hash_hex = format!("{:x}", hasher.finalize());
        let id = format!("{}-{}", ID_PREFIX, &hash_hex[..8]);
        if !ctx.records.iter().any(|r| r.id == id) {
            return id;
        }
        attempt += 1;
    }
}

/// End time of the dependency target, if it exists and has finished.
fn dependency_finish(records: &[Activity], id: &str) -> Option<DateTime<Utc>> {
    records.iter().find(|r| r.id == id).and_then(|r| r.end_time)
}

/// Compare provided fields against the prior record.
///
/// Text fields are reported as coarse "edit" flags without quoting content.
fn describe_changes(
    prior: &Activity,
    updated: &Activity,
    update: &ActivityUpdate,
) -> Vec<String> {
    let mut changes = Vec::new();

    if prior.status != updated.status {
        changes.push(format!("Status to {}", updated.status));
    }
    if let Some(phase) = update.phase.as_ref().filter(|p| **p != prior.phase) {
        changes.push(format!("Phase to {}", phase));
    }
    if let Some(assignee) = update
        .assignee
        .as_ref()
        .filter(|a| a.as_str() != prior.assignee.as_deref().unwrap_or_default())
    {
        changes.push(format!("Assignee to {}", assignee));
    }
    if update.title.as_ref().is_some_and(|t| *t != prior.title) {
        changes.push("Title edit".to_string());
    }
    if update
        .description
        .as_ref()
        .is_some_and(|d| *d != prior.description)
    {
        changes.push("Description edit".to_string());
    }
    if update
        .begin_time
        .as_deref()
        .is_some_and(|b| parse_instant(b) != prior.begin_time)
    {
        changes.push("Begin Time edit".to_string());
    }
    if update
        .end_time
        .as_deref()
        .is_some_and(|e| parse_instant(e) != prior.end_time)
    {
        changes.push("End Time edit".to_string());
    }
    if update
        .dependency
        .as_deref()
        .is_some_and(|d| non_empty(Some(d)) != prior.dependency.as_deref())
    {
        changes.push("Dependency edit".to_string());
    }

    changes
}
