//! Field task model.
//!
//! A task is a single dated field operation on a plot (watering, weeding,
//! fertilizer application, ...). Tasks carry both their current effective
//! date (`task_date`) and provenance/reschedule metadata:
//!
//! - `original_date` is set once at creation and never mutated — it marks
//!   auto-generated tasks (manual tasks leave it `None`) and preserves the
//!   pre-reschedule date for audit.
//! - `proposed_date` is a pending reschedule candidate awaiting manager
//!   approval.
//!
//! # Status Escalation
//! Within one automated evaluation pass status only escalates
//! (Proceed → Pending → Stop); only the approval workflow resets it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Task execution status.
///
/// Ordered by severity: `Proceed < Pending < Stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Conditions are within thresholds; execute as scheduled.
    #[default]
    Proceed,
    /// A soft breach or pending reschedule; needs attention.
    Pending,
    /// A hard breach; do not execute.
    Stop,
}

impl TaskStatus {
    /// Escalates to `other` if it is more severe; never regresses.
    #[inline]
    pub fn escalate(self, other: TaskStatus) -> TaskStatus {
        self.max(other)
    }

    /// Combines task statuses into a plot-level status:
    /// any Stop wins, else any Pending, else Proceed.
    pub fn combine<I: IntoIterator<Item = TaskStatus>>(statuses: I) -> TaskStatus {
        statuses
            .into_iter()
            .fold(TaskStatus::Proceed, TaskStatus::escalate)
    }

    /// Status label as stored ("Proceed" / "Pending" / "Stop").
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Proceed => "Proceed",
            TaskStatus::Pending => "Pending",
            TaskStatus::Stop => "Stop",
        }
    }

    /// Parses a stored label, tolerating case and the legacy "stopped"
    /// spelling. Unknown labels read as Proceed.
    pub fn parse(value: &str) -> TaskStatus {
        match value.trim().to_ascii_lowercase().as_str() {
            "stop" | "stopped" => TaskStatus::Stop,
            "pending" => TaskStatus::Pending,
            _ => TaskStatus::Proceed,
        }
    }
}

/// Task category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    Watering,
    Irrigation,
    Weeding,
    Fertilization,
    Hormone,
    LandPrep,
    Inspection,
    Harvesting,
    /// Anything outside the known categories (manual entries).
    #[serde(other)]
    Other,
}

impl TaskKind {
    /// Category label as stored (kebab-case).
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Watering => "watering",
            TaskKind::Irrigation => "irrigation",
            TaskKind::Weeding => "weeding",
            TaskKind::Fertilization => "fertilization",
            TaskKind::Hormone => "hormone",
            TaskKind::LandPrep => "land-prep",
            TaskKind::Inspection => "inspection",
            TaskKind::Harvesting => "harvesting",
            TaskKind::Other => "other",
        }
    }

    /// Whether moisture checks use the irrigation limit
    /// (`soil_moisture_max`).
    pub fn is_irrigation_like(&self) -> bool {
        matches!(self, TaskKind::Watering | TaskKind::Irrigation)
    }

    /// Whether moisture checks use the field-work limit
    /// (`soil_moisture_field_max`).
    pub fn is_field_work(&self) -> bool {
        matches!(
            self,
            TaskKind::Weeding | TaskKind::LandPrep | TaskKind::Fertilization
        )
    }
}

/// What produced a pending reschedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RescheduleType {
    /// Threshold evaluation proposed a new date (manager-facing).
    ThresholdReschedule,
    /// Conflict-buffer adjustment (internal, hidden from the approval
    /// queue by default).
    ConflictBufferAdjustment,
}

/// Lifecycle of a reschedule proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalState {
    /// No proposal on record.
    #[default]
    None,
    /// A proposal is awaiting a manager decision.
    Pending,
    /// The proposal was accepted; `task_date` moved.
    Approved,
    /// The proposal was declined; `task_date` unchanged.
    Rejected,
}

/// Worker reference carried on an assigned task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRef {
    /// Worker identifier.
    pub id: String,
    /// Worker display name.
    pub name: String,
}

/// A dated field task on a plot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Owning plot.
    pub plot_id: String,
    /// Human-readable title (also drives keyword classification).
    pub title: String,
    /// Task category.
    pub kind: TaskKind,
    /// Current effective date.
    pub task_date: NaiveDate,
    /// Creation-time date; write-once, `None` for manual tasks.
    pub original_date: Option<NaiveDate>,
    /// Pending reschedule candidate, if any.
    pub proposed_date: Option<NaiveDate>,
    /// Execution status.
    pub status: TaskStatus,
    /// Append-only audit trail (merged with `" | "`).
    pub reason: Option<String>,
    /// Assigned worker, if the roster had anyone.
    pub assigned_worker: Option<WorkerRef>,
    /// Task-specific hormone buffer override (days).
    pub buffer_days: Option<u32>,
    /// What produced the current proposal.
    pub reschedule: Option<RescheduleType>,
    /// Whether the proposal surfaces in the manager approval queue.
    pub reschedule_visible: bool,
    /// Proposal lifecycle state.
    pub approval_state: ApprovalState,
}

impl Task {
    /// Creates a task with the given id, plot, kind, and date.
    pub fn new(
        id: impl Into<String>,
        plot_id: impl Into<String>,
        kind: TaskKind,
        task_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            plot_id: plot_id.into(),
            title: String::new(),
            kind,
            task_date,
            original_date: None,
            proposed_date: None,
            status: TaskStatus::Proceed,
            reason: None,
            assigned_worker: None,
            buffer_days: None,
            reschedule: None,
            reschedule_visible: true,
            approval_state: ApprovalState::None,
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Marks the task as auto-generated on the given creation date.
    pub fn with_original_date(mut self, date: NaiveDate) -> Self {
        self.original_date = Some(date);
        self
    }

    /// Sets the hormone buffer override.
    pub fn with_buffer_days(mut self, days: u32) -> Self {
        self.buffer_days = Some(days);
        self
    }

    /// Seeds `original_date` from the current date if not already set.
    /// `original_date`, once set, is never overwritten.
    pub fn seed_original_date(&mut self) {
        if self.original_date.is_none() {
            self.original_date = Some(self.task_date);
        }
    }

    /// Whether this task was auto-generated (carries an original date).
    #[inline]
    pub fn is_generated(&self) -> bool {
        self.original_date.is_some()
    }

    fn haystack(&self) -> String {
        format!("{} {}", self.title, self.kind.as_str()).to_lowercase()
    }

    /// Hormone application (keyword match on title or category).
    pub fn is_hormone(&self) -> bool {
        self.haystack().contains("hormone")
    }

    /// Fertilizer application: "fertil" (covers both spellings),
    /// "foliar", or "granular" in title or category.
    pub fn is_fertilizer(&self) -> bool {
        let hay = self.haystack();
        ["fertil", "foliar", "granular"]
            .iter()
            .any(|kw| hay.contains(kw))
    }

    /// End-of-cycle marker: once the crop heads to processing, buffer
    /// constraints no longer apply.
    pub fn is_processing_cutoff(&self) -> bool {
        self.title
            .to_lowercase()
            .contains("processing into pineapple juice")
    }

    /// Whether rain washes this task out (spraying-type operations).
    pub fn is_rain_sensitive(&self) -> bool {
        let hay = self.haystack();
        [
            "fertil",
            "spray",
            "hormone",
            "foliar",
            "pesticide",
            "insecticide",
            "flower",
        ]
        .iter()
        .any(|kw| hay.contains(kw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_status_escalates_never_regresses() {
        assert_eq!(
            TaskStatus::Proceed.escalate(TaskStatus::Pending),
            TaskStatus::Pending
        );
        assert_eq!(
            TaskStatus::Pending.escalate(TaskStatus::Stop),
            TaskStatus::Stop
        );
        assert_eq!(
            TaskStatus::Stop.escalate(TaskStatus::Proceed),
            TaskStatus::Stop
        );
        assert_eq!(
            TaskStatus::Pending.escalate(TaskStatus::Proceed),
            TaskStatus::Pending
        );
    }

    #[test]
    fn test_status_combine() {
        use TaskStatus::*;
        assert_eq!(TaskStatus::combine([Proceed, Pending, Proceed]), Pending);
        assert_eq!(TaskStatus::combine([Pending, Stop]), Stop);
        assert_eq!(TaskStatus::combine([Proceed, Proceed]), Proceed);
        assert_eq!(TaskStatus::combine([]), Proceed);
    }

    #[test]
    fn test_status_parse_tolerant() {
        assert_eq!(TaskStatus::parse("stopped"), TaskStatus::Stop);
        assert_eq!(TaskStatus::parse(" Pending "), TaskStatus::Pending);
        assert_eq!(TaskStatus::parse("unknown"), TaskStatus::Proceed);
    }

    #[test]
    fn test_keyword_classification() {
        let hormone = Task::new("T1", "P001", TaskKind::Hormone, date("2026-01-01"))
            .with_title("Hormone application");
        assert!(hormone.is_hormone());
        assert!(hormone.is_rain_sensitive());
        assert!(!hormone.is_fertilizer());

        // British spelling in the title still matches via "fertil"
        let foliar = Task::new("T2", "P001", TaskKind::Fertilization, date("2026-01-03"))
            .with_title("Foliar fertiliser");
        assert!(foliar.is_fertilizer());
        assert!(foliar.is_rain_sensitive());

        let granular = Task::new("T3", "P001", TaskKind::Other, date("2026-01-03"))
            .with_title("Granular feed round 2");
        assert!(granular.is_fertilizer());

        let weeding =
            Task::new("T4", "P001", TaskKind::Weeding, date("2026-01-05")).with_title("Weeding");
        assert!(!weeding.is_fertilizer());
        assert!(!weeding.is_rain_sensitive());

        let cutoff = Task::new("T5", "P001", TaskKind::Other, date("2026-06-01"))
            .with_title("Processing into pineapple juice");
        assert!(cutoff.is_processing_cutoff());
    }

    #[test]
    fn test_original_date_write_once() {
        let mut task = Task::new("T1", "P001", TaskKind::Watering, date("2026-01-10"));
        task.seed_original_date();
        assert_eq!(task.original_date, Some(date("2026-01-10")));

        task.task_date = date("2026-01-15");
        task.seed_original_date();
        assert_eq!(task.original_date, Some(date("2026-01-10")));
    }

    #[test]
    fn test_kind_serde_kebab_case() {
        let json = serde_json::to_string(&TaskKind::LandPrep).unwrap();
        assert_eq!(json, "\"land-prep\"");
        let kind: TaskKind = serde_json::from_str("\"weeding\"").unwrap();
        assert_eq!(kind, TaskKind::Weeding);
        // Unknown categories fall back to Other
        let kind: TaskKind = serde_json::from_str("\"pruning\"").unwrap();
        assert_eq!(kind, TaskKind::Other);
    }
}
