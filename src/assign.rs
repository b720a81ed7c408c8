//! Deterministic round-robin worker assignment.
//!
//! The roster is the active field workers sorted by name; the starting
//! index is a stable hash of the plot id modulo the roster length, and
//! tasks are assigned in date order from there. Regenerating the same
//! plot's schedule with the same roster therefore reproduces the exact
//! same assignments.

use crate::models::{Task, Worker, WorkerRef};

/// FNV-1a, 64-bit. Stable across platforms and runs, unlike the stdlib
/// `DefaultHasher`.
pub fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x100_0000_01b3;
    bytes.iter().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(PRIME)
    })
}

/// Builds the assignment roster: active field workers, name-sorted.
pub fn assignment_roster(workers: &[Worker]) -> Vec<&Worker> {
    let mut roster: Vec<&Worker> = workers.iter().filter(|w| w.is_assignable()).collect();
    roster.sort_by(|a, b| a.name.cmp(&b.name));
    roster
}

/// Assigns workers to `tasks` (in slice order) round-robin.
///
/// With an empty roster every task is left unassigned; generation never
/// fails for lack of staff.
pub fn assign_round_robin(tasks: &mut [Task], plot_id: &str, workers: &[Worker]) {
    let roster = assignment_roster(workers);
    if roster.is_empty() {
        return;
    }
    let start = (fnv1a(plot_id.as_bytes()) % roster.len() as u64) as usize;
    for (offset, task) in tasks.iter_mut().enumerate() {
        let worker = roster[(start + offset) % roster.len()];
        task.assigned_worker = Some(WorkerRef {
            id: worker.id.clone(),
            name: worker.name.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskKind;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn tasks(n: usize) -> Vec<Task> {
        (0..n)
            .map(|i| {
                Task::new(
                    format!("T{i}"),
                    "P001",
                    TaskKind::Weeding,
                    date("2026-01-01"),
                )
            })
            .collect()
    }

    #[test]
    fn test_roster_filters_and_sorts() {
        let workers = vec![
            Worker::new("W3", "Chen"),
            Worker::new("W1", "Aisha"),
            Worker::new("W2", "Ben").inactive(),
            Worker::new("W4", "Dana").with_role("Manager"),
        ];
        let roster = assignment_roster(&workers);
        let names: Vec<&str> = roster.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Aisha", "Chen"]);
    }

    #[test]
    fn test_assignment_is_deterministic() {
        let workers = vec![
            Worker::new("W1", "Aisha"),
            Worker::new("W2", "Ben"),
            Worker::new("W3", "Chen"),
        ];
        let mut first = tasks(5);
        let mut second = tasks(5);
        assign_round_robin(&mut first, "P001", &workers);
        assign_round_robin(&mut second, "P001", &workers);

        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.assigned_worker, b.assigned_worker);
        }
    }

    #[test]
    fn test_consecutive_tasks_rotate_through_roster() {
        let workers = vec![
            Worker::new("W1", "Aisha"),
            Worker::new("W2", "Ben"),
            Worker::new("W3", "Chen"),
        ];
        let mut assigned = tasks(4);
        assign_round_robin(&mut assigned, "P001", &workers);

        let ids: Vec<&str> = assigned
            .iter()
            .map(|t| t.assigned_worker.as_ref().unwrap().id.as_str())
            .collect();
        // Consecutive tasks get consecutive roster slots, wrapping.
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_eq!(ids[0], ids[3]);
    }

    #[test]
    fn test_fnv1a_is_stable() {
        // Known FNV-1a 64-bit vectors.
        assert_eq!(fnv1a(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_empty_roster_leaves_tasks_unassigned() {
        let workers = vec![Worker::new("W1", "Aisha").inactive()];
        let mut assigned = tasks(3);
        assign_round_robin(&mut assigned, "P001", &workers);
        assert!(assigned.iter().all(|t| t.assigned_worker.is_none()));
    }
}
