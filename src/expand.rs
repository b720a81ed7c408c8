//! Template expansion: recurrence rule → concrete task dates.
//!
//! Given a plot's planting start date and a template, emits the ordered,
//! finite sequence of occurrence dates:
//!
//! ```text
//! base     = start_date + start_offset_days
//! end_date = start_date + end_offset_days   (else start_date + horizon)
//! emit base, base+step, base+2*step, ... while <= end_date
//! ```
//!
//! `Once`/`Event` emit a single date when `base <= end_date`. A missing
//! `end_offset_days` always falls back to the horizon, so expansion can
//! never produce an unbounded sequence.

use chrono::{Duration, NaiveDate};

use crate::models::TaskTemplate;

/// Default expansion horizon (days past the planting start).
pub const DEFAULT_HORIZON_DAYS: i64 = 120;

/// Expands a template into concrete occurrence dates, ascending.
pub fn expand_template(
    start_date: NaiveDate,
    template: &TaskTemplate,
    horizon_days: i64,
) -> Vec<NaiveDate> {
    let base = start_date + Duration::days(template.start_offset_days);
    let end_date = match template.end_offset_days {
        Some(offset) => start_date + Duration::days(offset),
        None => start_date + Duration::days(horizon_days),
    };

    let Some(step_days) = template.step_days() else {
        // Once / Event: a single occurrence inside the window.
        return if base <= end_date { vec![base] } else { Vec::new() };
    };

    let step = Duration::days(step_days);
    let mut dates = Vec::new();
    let mut cursor = base;
    while cursor <= end_date {
        dates.push(cursor);
        cursor += step;
    }
    dates
}
