//! Finish-to-start propagation from a changed activity to its dependents.

use chrono::{DateTime, Utc};

use crate::engine::audit::ACTION_DEPENDENCY_SYNC;
use crate::engine::duration::compute_duration;
use crate::models::Activity;

/// Re-base every direct dependent of `mutated_id` onto `new_end`.
///
/// Single pass, single hop: a dependent whose begin time moves here does not
/// in turn re-base its own dependents, and each record is visited at most
/// once, so cyclic links cannot loop. Dangling links simply never match.
///
/// Returns the ids of the re-based activities in record order.
pub fn cascade(
    records: &mut [Activity],
    mutated_id: &str,
    new_end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut rebased = Vec::new();

    for record in records.iter_mut().filter(|r| r.depends_on(mutated_id)) {
        record.begin_time = new_end;
        if record.begin_time.is_some() && record.end_time.is_some() {
            record.duration = compute_duration(record.begin_time, record.end_time);
        }
        record.edit_log.append(ACTION_DEPENDENCY_SYNC, None, now);

        tracing::debug!(
            dependent = %record.id,
            dependency = mutated_id,
            "re-based begin time from dependency finish"
        );
        rebased.push(record.id.clone());
    }

    rebased
}
