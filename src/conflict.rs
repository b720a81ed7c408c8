//! Hormone/fertilizer conflict resolution.
//!
//! Fertilizer applied too soon after a hormone application interferes
//! with uptake, so every hormone task at date `d` with buffer `b` blocks
//! the interval `[d, d+b]` for fertilizer tasks on the same plot.
//!
//! Hormone tasks dated after a processing-cutoff task (end of the active
//! crop cycle) are excluded from window construction, and fertilizer
//! tasks past the cutoff are never adjusted.
//!
//! # Modes
//! - [`ResolutionMode::Shift`] rewrites `task_date` itself — used at
//!   generation time, before tasks are persisted.
//! - [`ResolutionMode::Propose`] only sets `proposed_date` — used for
//!   persisted tasks, subject to manager approval.
//!
//! Either way, resolved tasks are tagged as conflict-buffer reschedules
//! and hidden from the approval queue; only threshold-driven proposals
//! surface there by default.

use chrono::{Duration, NaiveDate};

use crate::models::{RescheduleType, Task, TaskStatus};
use crate::reason::{merge_reasons, CONFLICT_BUFFER_REASON};

/// Default hormone buffer (days) when neither the task nor its template
/// carries an override.
pub const DEFAULT_HORMONE_BUFFER_DAYS: u32 = 7;

/// Bound on the forward scan for an unblocked day.
pub const DEFAULT_CONFLICT_LOOKAHEAD_DAYS: u32 = 120;

/// How a resolved date is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMode {
    /// Rewrite `task_date` (generation time, pre-persistence).
    Shift,
    /// Only set `proposed_date` (persisted tasks, needs approval).
    Propose,
}

/// A blocked interval `[start, start + buffer_days]` after a hormone
/// application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HormoneWindow {
    /// Hormone application date.
    pub start: NaiveDate,
    /// Buffer length in days.
    pub buffer_days: u32,
}

impl HormoneWindow {
    /// Last blocked day (inclusive).
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(i64::from(self.buffer_days))
    }

    /// Whether a date falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end()
    }
}

/// Earliest processing-cutoff date among the tasks, if any.
pub fn processing_cutoff_date(tasks: &[Task]) -> Option<NaiveDate> {
    tasks
        .iter()
        .filter(|t| t.is_processing_cutoff())
        .map(|t| t.task_date)
        .min()
}

/// Builds blocked windows from the hormone tasks in `tasks`.
///
/// Hormone applications dated after the cutoff belong to the next cycle
/// and are skipped.
pub fn build_hormone_windows(tasks: &[Task], default_buffer_days: u32) -> Vec<HormoneWindow> {
    let cutoff = processing_cutoff_date(tasks);
    tasks
        .iter()
        .filter(|t| t.is_hormone())
        .filter(|t| cutoff.is_none_or(|c| t.task_date <= c))
        .map(|t| HormoneWindow {
            start: t.task_date,
            buffer_days: t.buffer_days.unwrap_or(default_buffer_days),
        })
        .collect()
}

fn is_blocked(date: NaiveDate, windows: &[HormoneWindow]) -> bool {
    windows.iter().any(|w| w.contains(date))
}

fn latest_block_end(date: NaiveDate, windows: &[HormoneWindow]) -> Option<NaiveDate> {
    windows
        .iter()
        .filter(|w| w.contains(date))
        .map(|w| w.end())
        .max()
}

/// Scans forward from `start` for the first day not covered by any
/// window, honoring the cutoff as a second escape.
///
/// The scan is bounded: after `max_lookahead_days` the farthest-scanned
/// candidate is returned rather than an error, so a task is never
/// silently dropped.
pub fn find_next_available_date(
    start: NaiveDate,
    windows: &[HormoneWindow],
    cutoff: Option<NaiveDate>,
    max_lookahead_days: u32,
) -> NaiveDate {
    let mut candidate = start;
    for _ in 0..max_lookahead_days {
        if cutoff.is_some_and(|c| candidate > c) {
            return candidate;
        }
        if !is_blocked(candidate, windows) {
            return candidate;
        }
        candidate += Duration::days(1);
    }
    candidate
}

/// Resolves fertilizer/hormone collisions.
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    default_buffer_days: u32,
    max_lookahead_days: u32,
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self {
            default_buffer_days: DEFAULT_HORMONE_BUFFER_DAYS,
            max_lookahead_days: DEFAULT_CONFLICT_LOOKAHEAD_DAYS,
        }
    }
}

impl ConflictResolver {
    /// Creates a resolver with explicit buffer and lookahead bounds.
    pub fn new(default_buffer_days: u32, max_lookahead_days: u32) -> Self {
        Self {
            default_buffer_days,
            max_lookahead_days,
        }
    }

    /// Resolves a single candidate date against the windows built from
    /// `context` tasks. Returns the resolved date (unchanged when not
    /// blocked or past the cutoff).
    pub fn resolve_date(&self, candidate: NaiveDate, context: &[Task]) -> NaiveDate {
        let windows = build_hormone_windows(context, self.default_buffer_days);
        let cutoff = processing_cutoff_date(context);
        if cutoff.is_some_and(|c| candidate > c) || !is_blocked(candidate, &windows) {
            return candidate;
        }
        let Some(latest_end) = latest_block_end(candidate, &windows) else {
            return candidate;
        };
        find_next_available_date(
            latest_end + Duration::days(1),
            &windows,
            cutoff,
            self.max_lookahead_days,
        )
    }

    /// Adjusts the fertilizer tasks in `tasks` that collide with hormone
    /// windows built from `tasks` ∪ `context`.
    ///
    /// Writes on each adjusted task: `original_date` seeded,
    /// `proposed_date` set, `task_date` rewritten in [`ResolutionMode::Shift`],
    /// status escalated Proceed → Pending, the conflict note merged into
    /// `reason`, and the conflict-buffer reschedule tag applied.
    ///
    /// Returns the ids of adjusted tasks.
    pub fn resolve(
        &self,
        tasks: &mut [Task],
        context: &[Task],
        mode: ResolutionMode,
    ) -> Vec<String> {
        let mut all: Vec<Task> = tasks.to_vec();
        all.extend_from_slice(context);
        let windows = build_hormone_windows(&all, self.default_buffer_days);
        let cutoff = processing_cutoff_date(&all);

        let mut adjusted = Vec::new();
        for task in tasks.iter_mut() {
            if !task.is_fertilizer() {
                continue;
            }
            if cutoff.is_some_and(|c| task.task_date > c) {
                continue;
            }
            if !is_blocked(task.task_date, &windows) {
                continue;
            }
            let Some(latest_end) = latest_block_end(task.task_date, &windows) else {
                continue;
            };
            let new_date = find_next_available_date(
                latest_end + Duration::days(1),
                &windows,
                cutoff,
                self.max_lookahead_days,
            );

            task.seed_original_date();
            task.proposed_date = Some(new_date);
            if mode == ResolutionMode::Shift {
                task.task_date = new_date;
            }
            task.status = task.status.escalate(TaskStatus::Pending);
            task.reason = merge_reasons(task.reason.as_deref(), CONFLICT_BUFFER_REASON);
            task.reschedule = Some(RescheduleType::ConflictBufferAdjustment);
            task.reschedule_visible = false;
            adjusted.push(task.id.clone());
        }
        adjusted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskKind;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn hormone(id: &str, day: &str) -> Task {
        Task::new(id, "P001", TaskKind::Hormone, date(day)).with_title("Hormone application")
    }

    fn fertilizer(id: &str, day: &str) -> Task {
        Task::new(id, "P001", TaskKind::Fertilization, date(day)).with_title("Granular fertiliser")
    }

    #[test]
    fn test_same_day_collision_shifts_past_buffer() {
        let h = hormone("H1", "2026-01-01");
        let mut tasks = vec![fertilizer("F1", "2026-01-01")];

        let resolver = ConflictResolver::default();
        let adjusted = resolver.resolve(&mut tasks, &[h], ResolutionMode::Shift);

        assert_eq!(adjusted, vec!["F1".to_string()]);
        assert_eq!(tasks[0].task_date, date("2026-01-09"));
        assert_eq!(tasks[0].proposed_date, Some(date("2026-01-09")));
        assert_eq!(tasks[0].status, TaskStatus::Pending);
        assert_eq!(tasks[0].original_date, Some(date("2026-01-01")));
        assert!(tasks[0]
            .reason
            .as_deref()
            .unwrap()
            .contains("Avoid fertiliser application near hormone application"));
        assert_eq!(
            tasks[0].reschedule,
            Some(RescheduleType::ConflictBufferAdjustment)
        );
        assert!(!tasks[0].reschedule_visible);
    }

    #[test]
    fn test_collision_inside_buffer_shifts_forward() {
        // Hormone 2026-01-01, buffer 7 → window [01-01, 01-08];
        // fertilizer on 01-03 moves to 01-09.
        let h = hormone("H1", "2026-01-01");
        let mut tasks = vec![fertilizer("F1", "2026-01-03")];

        let resolver = ConflictResolver::default();
        resolver.resolve(&mut tasks, &[h], ResolutionMode::Shift);

        assert_eq!(tasks[0].task_date, date("2026-01-09"));
        assert_eq!(tasks[0].proposed_date, Some(date("2026-01-09")));
        assert_eq!(tasks[0].status, TaskStatus::Pending);
    }

    #[test]
    fn test_propose_mode_leaves_task_date() {
        let h = hormone("H1", "2026-03-05");
        let mut tasks = vec![fertilizer("F1", "2026-03-08")];

        let resolver = ConflictResolver::default();
        resolver.resolve(&mut tasks, &[h], ResolutionMode::Propose);

        assert_eq!(tasks[0].task_date, date("2026-03-08"));
        assert_eq!(tasks[0].proposed_date, Some(date("2026-03-13")));
    }

    #[test]
    fn test_overlapping_windows_use_latest_end() {
        // Windows [01-01, 01-08] and [01-06, 01-13] overlap; fertilizer
        // on 01-07 must clear both → 01-14.
        let h1 = hormone("H1", "2026-01-01");
        let h2 = hormone("H2", "2026-01-06");
        let mut tasks = vec![fertilizer("F1", "2026-01-07")];

        let resolver = ConflictResolver::default();
        resolver.resolve(&mut tasks, &[h1, h2], ResolutionMode::Shift);

        assert_eq!(tasks[0].task_date, date("2026-01-14"));
    }

    #[test]
    fn test_task_buffer_override() {
        let h = hormone("H1", "2026-01-01").with_buffer_days(3);
        let mut tasks = vec![fertilizer("F1", "2026-01-02")];

        let resolver = ConflictResolver::default();
        resolver.resolve(&mut tasks, &[h], ResolutionMode::Shift);

        // Window [01-01, 01-04] → first clear day 01-05.
        assert_eq!(tasks[0].task_date, date("2026-01-05"));
    }

    #[test]
    fn test_fertilizer_past_cutoff_untouched() {
        let h = hormone("H1", "2026-05-28");
        let cutoff = Task::new("C1", "P001", TaskKind::Other, date("2026-06-01"))
            .with_title("Processing into pineapple juice");
        let mut tasks = vec![fertilizer("F1", "2026-06-10")];

        let resolver = ConflictResolver::default();
        let adjusted = resolver.resolve(&mut tasks, &[h, cutoff], ResolutionMode::Shift);

        assert!(adjusted.is_empty());
        assert_eq!(tasks[0].task_date, date("2026-06-10"));
        assert_eq!(tasks[0].status, TaskStatus::Proceed);
    }

    #[test]
    fn test_hormone_past_cutoff_builds_no_window() {
        let cutoff = Task::new("C1", "P001", TaskKind::Other, date("2026-06-01"))
            .with_title("Processing into pineapple juice");
        let late_hormone = hormone("H1", "2026-07-01");

        let windows =
            build_hormone_windows(&[cutoff, late_hormone], DEFAULT_HORMONE_BUFFER_DAYS);
        assert!(windows.is_empty());
    }

    #[test]
    fn test_non_fertilizer_tasks_ignored() {
        let h = hormone("H1", "2026-01-01");
        let mut tasks = vec![
            Task::new("W1", "P001", TaskKind::Weeding, date("2026-01-03")).with_title("Weeding"),
        ];

        let resolver = ConflictResolver::default();
        let adjusted = resolver.resolve(&mut tasks, &[h], ResolutionMode::Shift);
        assert!(adjusted.is_empty());
    }

    #[test]
    fn test_lookahead_exhaustion_returns_farthest_candidate() {
        // Daily hormone applications keep every day blocked; the scan
        // must still terminate and return a date.
        let context: Vec<Task> = (0..200)
            .map(|i| {
                hormone(
                    &format!("H{i}"),
                    &(date("2026-01-01") + Duration::days(i)).to_string(),
                )
            })
            .collect();
        let windows = build_hormone_windows(&context, 7);
        let resolved = find_next_available_date(date("2026-01-02"), &windows, None, 120);
        assert_eq!(resolved, date("2026-01-02") + Duration::days(120));
    }

    #[test]
    fn test_status_not_downgraded_on_resolution() {
        let h = hormone("H1", "2026-01-01");
        let mut tasks = vec![fertilizer("F1", "2026-01-03").with_status(TaskStatus::Stop)];

        let resolver = ConflictResolver::default();
        resolver.resolve(&mut tasks, &[h], ResolutionMode::Shift);
        assert_eq!(tasks[0].status, TaskStatus::Stop);
    }

    #[test]
    fn test_resolve_date_for_unblocked_candidate() {
        let h = hormone("H1", "2026-01-01");
        let resolver = ConflictResolver::default();
        assert_eq!(
            resolver.resolve_date(date("2026-02-01"), &[h.clone()]),
            date("2026-02-01")
        );
        assert_eq!(
            resolver.resolve_date(date("2026-01-05"), &[h]),
            date("2026-01-09")
        );
    }
}
