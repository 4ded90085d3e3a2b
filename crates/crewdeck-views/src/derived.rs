// File: crewdeck-views/src/derived.rs
// Purpose: Read-only summaries computed from snapshots
//
// Everything here is a pure function of its snapshot arguments,
// recomputed on every snapshot change and never cached.

use chrono::{DateTime, Duration, Utc};

use crewdeck::{Record, Snapshot};

use crate::ops::parse_when;

/// Completion progress of a to-do list
#[derive(Debug, Clone, PartialEq)]
pub struct TodoProgress {
    pub total: usize,
    pub completed: usize,
    /// completed/total as a percentage; 0 when the list is empty
    pub percent: f64,
}

pub fn todo_progress(todos: &Snapshot) -> TodoProgress {
    let total = todos.len();
    let completed = todos.records.iter().filter(|r| r.flag("completed")).count();
    let percent = if total > 0 {
        (completed as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    TodoProgress {
        total,
        completed,
        percent,
    }
}

/// Task counts by status
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusSummary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

pub fn status_summary(tasks: &Snapshot) -> StatusSummary {
    let mut summary = StatusSummary {
        total: tasks.len(),
        ..Default::default()
    };

    for record in &tasks.records {
        match record.text("status") {
            "Pending" => summary.pending += 1,
            "In Progress" => summary.in_progress += 1,
            "Completed" => summary.completed += 1,
            _ => {}
        }
    }

    summary
}

/// Tasks due after `now`, soonest first, at most `limit` of them
pub fn upcoming_deadlines(tasks: &Snapshot, now: DateTime<Utc>, limit: usize) -> Vec<Record> {
    let mut upcoming: Vec<(DateTime<Utc>, Record)> = tasks
        .records
        .iter()
        .filter_map(|record| {
            let deadline = record.get("deadline").and_then(parse_when)?;
            (deadline > now).then(|| (deadline, record.clone()))
        })
        .collect();

    upcoming.sort_by_key(|(deadline, _)| *deadline);
    upcoming.into_iter().take(limit).map(|(_, r)| r).collect()
}

/// Tasks whose reminder falls within the next 24 hours
pub fn due_soon(tasks: &Snapshot, now: DateTime<Utc>) -> Vec<Record> {
    let horizon = now + Duration::hours(24);

    tasks
        .records
        .iter()
        .filter(|record| {
            record
                .get("reminder")
                .and_then(parse_when)
                .map(|reminder| reminder > now && reminder <= horizon)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Everything the dashboard renders, in one recompute
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub status: StatusSummary,
    pub progress: TodoProgress,
    pub upcoming: Vec<Record>,
    pub due_soon: Vec<Record>,
}

pub fn dashboard_summary(
    tasks: &Snapshot,
    todos: &Snapshot,
    now: DateTime<Utc>,
) -> DashboardSummary {
    DashboardSummary {
        status: status_summary(tasks),
        progress: todo_progress(todos),
        upcoming: upcoming_deadlines(tasks, now, 5),
        due_soon: due_soon(tasks, now),
    }
}
