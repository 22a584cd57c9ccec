//! Energy-aware task ranking.
//!
//! Scores are additive integers built from two independent components:
//!
//! - deadline urgency: +50 under 24 hours left (overdue included), +20 under 72;
//! - energy match against the user's current level:
//!   - high user: +30 for a high task, +10 for anything else;
//!   - low user: +40 for a low task, -20 for a high task;
//!   - medium user: no adjustment.
//!
//! Only pending tasks are ranked; the filter is applied here and nowhere else.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::model::{EnergyLevel, TaskRecord, TaskStatus};

/// Maximum number of suggestions returned by [`rank`].
pub const SUGGESTION_LIMIT: usize = 5;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// A task paired with its score. Internal to ranking.
struct ScoredTask<'a> {
    task: &'a TaskRecord,
    score: i32,
}

fn deadline_score(task: &TaskRecord, now: DateTime<Utc>) -> i32 {
    let Some(deadline) = task.deadline else {
        return 0;
    };
    let hours_left = (deadline.to_utc() - now).num_seconds() as f64 / SECONDS_PER_HOUR;
    if hours_left < 24.0 {
        50
    } else if hours_left < 72.0 {
        20
    } else {
        0
    }
}

fn energy_score(required: EnergyLevel, current: EnergyLevel) -> i32 {
    match (current.value(), required.value()) {
        (3, 3) => 30,
        (3, _) => 10,
        (1, 1) => 40,
        (1, 3) => -20,
        _ => 0,
    }
}

/// Score one task for a user at `current_energy`.
pub fn score_task(task: &TaskRecord, current_energy: EnergyLevel, now: DateTime<Utc>) -> i32 {
    deadline_score(task, now) + energy_score(task.energy_required, current_energy)
}

/// Rank pending tasks by descending score and return at most
/// [`SUGGESTION_LIMIT`]. Equal scores keep the input order.
pub fn rank(tasks: &[TaskRecord], current_energy: EnergyLevel, now: DateTime<Utc>) -> Vec<TaskRecord> {
    let mut scored: Vec<ScoredTask<'_>> = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Pending)
        .map(|task| ScoredTask {
            task,
            score: score_task(task, current_energy, now),
        })
        .collect();

    // `sort_by` is stable, so ties keep fetch order.
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    debug!(
        candidates = scored.len(),
        energy = %current_energy,
        top_score = scored.first().map(|s| s.score),
        "ranked pending tasks"
    );

    scored
        .into_iter()
        .take(SUGGESTION_LIMIT)
        .map(|s| s.task.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap()
    }

    fn task(id: i64, energy: EnergyLevel, deadline_in_hours: Option<i64>) -> TaskRecord {
        TaskRecord {
            id,
            user_id: 1,
            title: format!("task {id}"),
            energy_required: energy,
            deadline: deadline_in_hours.map(|h| (now() + Duration::hours(h)).into()),
            planned_start: None,
            planned_end: None,
            status: TaskStatus::Pending,
            is_completed: false,
        }
    }

    #[test]
    fn deadline_buckets() {
        let n = now();
        assert_eq!(deadline_score(&task(1, EnergyLevel::Medium, Some(-5)), n), 50);
        assert_eq!(deadline_score(&task(1, EnergyLevel::Medium, Some(23)), n), 50);
        assert_eq!(deadline_score(&task(1, EnergyLevel::Medium, Some(24)), n), 20);
        assert_eq!(deadline_score(&task(1, EnergyLevel::Medium, Some(71)), n), 20);
        assert_eq!(deadline_score(&task(1, EnergyLevel::Medium, Some(72)), n), 0);
        assert_eq!(deadline_score(&task(1, EnergyLevel::Medium, None), n), 0);
    }

    #[test]
    fn energy_matrix() {
        use EnergyLevel::*;
        assert_eq!(energy_score(High, High), 30);
        assert_eq!(energy_score(Medium, High), 10);
        assert_eq!(energy_score(Low, High), 10);
        assert_eq!(energy_score(Low, Low), 40);
        assert_eq!(energy_score(Medium, Low), 0);
        assert_eq!(energy_score(High, Low), -20);
        assert_eq!(energy_score(Low, Medium), 0);
        assert_eq!(energy_score(Medium, Medium), 0);
        assert_eq!(energy_score(High, Medium), 0);
    }

    #[test]
    fn non_pending_tasks_are_skipped() {
        let mut done = task(1, EnergyLevel::Low, Some(1));
        done.status = TaskStatus::Completed;
        let open = task(2, EnergyLevel::Low, None);
        let ranked = rank(&[done, open], EnergyLevel::Low, now());
        let ids: Vec<i64> = ranked.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn at_most_five_and_ties_keep_order() {
        let tasks: Vec<TaskRecord> = (1..=7).map(|id| task(id, EnergyLevel::Medium, None)).collect();
        let ranked = rank(&tasks, EnergyLevel::Medium, now());
        let ids: Vec<i64> = ranked.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }
}
