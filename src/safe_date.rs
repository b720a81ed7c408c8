//! Safe-date search over the rain calendar.
//!
//! When an evaluation decides a task cannot run on its date, the finder
//! scans forward day by day for the first candidate with acceptable
//! forecast rain:
//!
//! - heavy rain (`>= rain_mm_heavy`) rejects the day for any task;
//! - light rain (`>= rain_mm_min`) additionally rejects it for
//!   rain-sensitive tasks (spraying-type operations).
//!
//! The scan is bounded by a short lookahead; past that the forecast is
//! too uncertain to trust, so the finder falls back to a fixed offset
//! rather than chasing a dry day that may never come.

use chrono::{Duration, NaiveDate};

use crate::models::{EvalThresholds, RainCalendar, Task};

/// How many days ahead the finder trusts the forecast.
pub const DEFAULT_SAFE_DATE_LOOKAHEAD_DAYS: u32 = 7;

/// Fallback offset when the lookahead is exhausted.
pub const DEFAULT_RESCHEDULE_DAYS: i64 = 2;

/// Outcome of a safe-date search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeDate {
    /// The proposed date.
    pub date: NaiveDate,
    /// Human-readable rationale for the choice.
    pub rationale: String,
    /// Whether the lookahead ran out and the fallback offset was used.
    pub exhausted: bool,
}

fn day_is_safe(
    task: &Task,
    date: NaiveDate,
    calendar: &RainCalendar,
    thresholds: &EvalThresholds,
) -> bool {
    let rain = calendar.rain_on(date);
    if rain >= thresholds.rain_mm_heavy {
        return false;
    }
    if task.is_rain_sensitive() && rain >= thresholds.rain_mm_min {
        return false;
    }
    true
}

/// Finds the first safe day strictly after `target`.
///
/// Scans `target+1 ..= target+lookahead_days`; when every candidate is
/// wet, returns `target + reschedule_days` with `exhausted` set.
pub fn find_safe_date(
    task: &Task,
    target: NaiveDate,
    calendar: &RainCalendar,
    thresholds: &EvalThresholds,
    lookahead_days: u32,
    reschedule_days: i64,
) -> SafeDate {
    for offset in 1..=i64::from(lookahead_days) {
        let candidate = target + Duration::days(offset);
        if day_is_safe(task, candidate, calendar, thresholds) {
            return SafeDate {
                date: candidate,
                rationale: format!(
                    "Next day with acceptable forecast rain ({:.1} mm).",
                    calendar.rain_on(candidate)
                ),
                exhausted: false,
            };
        }
    }
    SafeDate {
        date: target + Duration::days(reschedule_days),
        rationale: format!(
            "No safe day within {lookahead_days} days of forecast; \
             deferred by {reschedule_days} days."
        ),
        exhausted: true,
    }
}
