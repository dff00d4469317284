//! Activity temporal state engine.
//!
//! The engine is pure: it operates on an in-memory snapshot of the record set
//! and never touches storage. Callers load a snapshot, run one of the
//! operations below and commit the whole snapshot back (see
//! [`crate::storage::Storage::transact`]).
//!
//! - [`duration`] - Elapsed time computation and `HH:MM:SS` formatting
//! - [`status`] - Status vocabulary classification
//! - [`audit`] - Audit trail appending
//! - [`mutation`] - Creation and sparse updates of a single activity
//! - [`cascade`] - Finish-to-start propagation to direct dependents

pub mod audit;
pub mod cascade;
pub mod duration;
pub mod mutation;
pub mod status;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Activity, ActivityUpdate, NewActivity};
use crate::{Error, Result};

pub use cascade::cascade;
pub use mutation::{Mutation, MutationContext, apply_update, create_activity};
pub use status::{StatusStage, StatusVocabulary, Transition};

/// Result of updating one activity within a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    pub activity: Activity,
    /// Ids of dependents re-based by the cascade
    pub cascaded: Vec<String>,
}

/// Result of a bulk update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkOutcome {
    pub updated: Vec<UpdateOutcome>,
    pub missing: Vec<String>,
}

/// Result of a bulk delete.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkDeleteOutcome {
    pub deleted: Vec<String>,
    pub missing: Vec<String>,
}

/// Create an activity and append it to the snapshot.
pub fn create(
    records: &mut Vec<Activity>,
    request: &NewActivity,
    statuses: &StatusVocabulary,
    now: DateTime<Utc>,
) -> Activity {
    let ctx = MutationContext {
        statuses,
        records: records.as_slice(),
        now,
    };
    let activity = create_activity(request, &ctx);
    records.push(activity.clone());
    activity
}

/// Update the activity `id` in place, cascading to dependents when its end
/// time changed.
pub fn update(
    records: &mut [Activity],
    id: &str,
    request: &ActivityUpdate,
    statuses: &StatusVocabulary,
    now: DateTime<Utc>,
) -> Result<UpdateOutcome> {
    let index = records
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| Error::NotFound(id.to_string()))?;

    let mutation = {
        let ctx = MutationContext {
            statuses,
            records: &*records,
            now,
        };
        apply_update(&records[index], request, &ctx)
    };

    let Mutation {
        activity,
        end_time_changed,
    } = mutation;
    let new_end = activity.end_time;
    records[index] = activity;

    let cascaded = if end_time_changed {
        cascade(records, id, new_end, now)
    } else {
        Vec::new()
    };

    Ok(UpdateOutcome {
        activity: records[index].clone(),
        cascaded,
    })
}

/// Remove the activity `id`.
///
/// Dependents keep their (now dangling) dependency pointer.
pub fn delete(records: &mut Vec<Activity>, id: &str) -> Result<Activity> {
    let index = records
        .iter()
        .position(|r| r.id == id)
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    Ok(records.remove(index))
}

/// Apply the same sparse update to each listed activity, in order.
///
/// Each update runs its own cascade. Unknown ids are collected, not fatal;
/// any other error aborts the whole batch.
pub fn bulk_update(
    records: &mut [Activity],
    ids: &[String],
    request: &ActivityUpdate,
    statuses: &StatusVocabulary,
    now: DateTime<Utc>,
) -> Result<BulkOutcome> {
    let mut outcome = BulkOutcome::default();
    for id in ids {
        match update(records, id, request, statuses, now) {
            Ok(updated) => outcome.updated.push(updated),
            Err(Error::NotFound(_)) => outcome.missing.push(id.clone()),
            Err(e) => return Err(e),
        }
    }
    Ok(outcome)
}

/// Remove every listed activity.
pub fn bulk_delete(records: &mut Vec<Activity>, ids: &[String]) -> Result<BulkDeleteOutcome> {
    let mut outcome = BulkDeleteOutcome::default();
    for id in ids {
        match delete(records, id) {
            Ok(_) => outcome.deleted.push(id.clone()),
            Err(Error::NotFound(_)) => outcome.missing.push(id.clone()),
            Err(e) => return Err(e),
        }
    }
    Ok(outcome)
}
