//! Recurrence template model.
//!
//! A template describes a recurring field operation relative to a plot's
//! planting start date. Templates are read-only inputs to the expander:
//! expansion never mutates them.

use serde::{Deserialize, Serialize};

use super::task::TaskKind;

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Single occurrence at the start offset.
    #[default]
    Once,
    /// Single occurrence tied to a crop event (expands like `Once`).
    Event,
    /// Every `interval` days.
    Daily,
    /// Every `7 * interval` days.
    Weekly,
    /// Every `30 * interval` days (calendar-month approximation).
    Monthly,
}

/// A recurring task template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTemplate {
    /// Unique template identifier.
    pub id: String,
    /// Title stamped onto generated tasks.
    pub title: String,
    /// Category stamped onto generated tasks.
    pub kind: TaskKind,
    /// Optional description carried onto generated tasks.
    pub description: Option<String>,
    /// Days from planting start to the first occurrence.
    pub start_offset_days: i64,
    /// Days from planting start to the last allowed occurrence.
    /// `None` falls back to the expansion horizon.
    pub end_offset_days: Option<i64>,
    /// Recurrence frequency.
    pub frequency: Frequency,
    /// Every n units of the frequency. Zero is treated as 1.
    pub interval: u32,
    /// Hormone buffer override for generated tasks (days).
    pub buffer_days: Option<u32>,
    /// Inactive templates are skipped during generation.
    pub active: bool,
}

impl TaskTemplate {
    /// Creates a one-off template at the given start offset.
    pub fn new(id: impl Into<String>, kind: TaskKind, start_offset_days: i64) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            kind,
            description: None,
            start_offset_days,
            end_offset_days: None,
            frequency: Frequency::Once,
            interval: 1,
            buffer_days: None,
            active: true,
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the recurrence frequency.
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Sets the interval.
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the end offset.
    pub fn with_end_offset(mut self, end_offset_days: i64) -> Self {
        self.end_offset_days = Some(end_offset_days);
        self
    }

    /// Sets the hormone buffer override.
    pub fn with_buffer_days(mut self, days: u32) -> Self {
        self.buffer_days = Some(days);
        self
    }

    /// Step between occurrences, in days. `Once`/`Event` have no step.
    pub fn step_days(&self) -> Option<i64> {
        let interval = self.interval.max(1) as i64;
        match self.frequency {
            Frequency::Once | Frequency::Event => None,
            Frequency::Daily => Some(interval),
            Frequency::Weekly => Some(7 * interval),
            Frequency::Monthly => Some(30 * interval),
        }
    }
}
