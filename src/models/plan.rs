//! Phase grouping and numbering of activities.
//!
//! Activities are grouped by their phase in configured phase order. Activities
//! whose phase is not configured land in a trailing "uncategorized" bucket and
//! have no number.

use serde::Serialize;

use crate::engine::duration::{format_duration, parse_duration};
use crate::models::Activity;

/// Activities belonging to one configured phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseGroup<'a> {
    /// 1-based position in the configured phase list
    pub number: usize,
    pub name: &'a str,
    pub activities: Vec<&'a Activity>,
    /// Sum of activity durations as `HH:MM:SS`
    pub total_duration: String,
}

/// Activities grouped by phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseGrouping<'a> {
    pub phases: Vec<PhaseGroup<'a>>,
    pub uncategorized: Vec<&'a Activity>,
}

/// Group `records` by configured phase, preserving record order within a phase.
pub fn group_by_phase<'a>(records: &'a [Activity], phases: &'a [String]) -> PhaseGrouping<'a> {
    let groups = phases
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let activities: Vec<&Activity> =
                records.iter().filter(|a| a.phase == *name).collect();
            let total_duration = total_duration(activities.iter().copied());
            PhaseGroup {
                number: index + 1,
                name,
                activities,
                total_duration,
            }
        })
        .collect();

    let uncategorized = records
        .iter()
        .filter(|a| !phases.contains(&a.phase))
        .collect();

    PhaseGrouping {
        phases: groups,
        uncategorized,
    }
}

/// Display number `P.N` of an activity: phase position and position within
/// that phase, both 1-based. `None` for uncategorized activities.
pub fn activity_number(activity: &Activity, phases: &[String], records: &[Activity]) -> Option<String> {
    let phase_index = phases.iter().position(|p| *p == activity.phase)?;
    let position = records
        .iter()
        .filter(|a| a.phase == activity.phase)
        .position(|a| a.id == activity.id)?;
    Some(format!("{}.{}", phase_index + 1, position + 1))
}

/// Sum of durations as `HH:MM:SS`; missing or malformed durations count as zero.
pub fn total_duration<'a>(activities: impl IntoIterator<Item = &'a Activity>) -> String {
    let seconds = activities
        .into_iter()
        .filter_map(|a| a.duration.as_deref())
        .map(parse_duration)
        .fold(0u64, u64::saturating_add);
    format_duration(seconds)
}
