//! Elapsed-time arithmetic and `HH:MM:SS` formatting.

use chrono::{DateTime, Utc};

const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_MINUTE: u64 = 60;

/// Parse an RFC 3339 instant, treating empty or malformed input as absent.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Elapsed time between two instants as `HH:MM:SS`.
///
/// Returns `None` when either endpoint is missing or `end` precedes `begin`.
/// Sub-second remainders are truncated.
pub fn compute_duration(
    begin: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Option<String> {
    let (begin, end) = (begin?, end?);
    if end < begin {
        return None;
    }
    let seconds = (end - begin).num_seconds();
    Some(format_duration(u64::try_from(seconds).unwrap_or(0)))
}

/// Same as [`compute_duration`] for raw timestamp strings.
pub fn compute_duration_str(begin: &str, end: &str) -> Option<String> {
    compute_duration(parse_instant(begin), parse_instant(end))
}

/// Format whole seconds as zero-padded `HH:MM:SS`.
///
/// Hours are at least two digits and grow as needed (`123:00:00`).
pub fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / SECONDS_PER_HOUR;
    let minutes = (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total_seconds % SECONDS_PER_MINUTE;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Parse `HH:MM:SS` into whole seconds.
///
/// Input without exactly three `:`-separated parts yields 0; a part that is
/// not a number counts as 0.
pub fn parse_duration(s: &str) -> u64 {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.len() != 3 {
        return 0;
    }
    let part = |p: &str| p.trim().parse::<u64>().unwrap_or(0);
    part(parts[0])
        .saturating_mul(SECONDS_PER_HOUR)
        .saturating_add(part(parts[1]).saturating_mul(SECONDS_PER_MINUTE))
        .saturating_add(part(parts[2]))
}
