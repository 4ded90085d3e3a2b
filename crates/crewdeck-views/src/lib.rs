// File: crewdeck-views/src/lib.rs
// Purpose: Main entry point for the crewdeck-views library

//! # crewdeck-views
//!
//! The reusable synchronization unit for collection-backed views: a
//! [`LiveViewModel`] mirrors one collection's snapshot and holds the
//! single edit draft, a [`MutationDispatcher`] turns user actions into
//! exactly one validated store mutation each, and the derived modules
//! compute the read-only summaries views render.
//!
//! All writes travel store-first: a commit never touches the local
//! snapshot, the update arrives through the subscription like any other
//! remote change.

pub mod assignment;
pub mod derived;
pub mod dispatcher;
pub mod live_view;
pub mod ops;
pub mod reminders;

// Re-export main types
pub use assignment::{assign_task, team_board, tasks_by_team, MemberTasks, TeamAssignmentView, TeamBoard};
pub use derived::{
    dashboard_summary, due_soon, status_summary, todo_progress, upcoming_deadlines,
    DashboardSummary, StatusSummary, TodoProgress,
};
pub use dispatcher::{MutationDispatcher, Notice, Outcome};
pub use live_view::LiveViewModel;
pub use reminders::{ReminderEntry, ReminderQueue};
