// File: crewdeck-views/src/assignment.rs
// Purpose: Team/task join and assignment operations

use std::collections::BTreeMap;

use tokio_stream::{StreamExt, StreamMap};

use crewdeck::{CommitError, FieldValue, Record, RecordId, Snapshot, StoreError, ValidationError};
use crewdeck_sync::{Gateway, SnapshotStream};

use crate::dispatcher::Outcome;

/// One member's slice of the team's tasks
#[derive(Debug, Clone, PartialEq)]
pub struct MemberTasks {
    pub member: String,
    pub tasks: Vec<Record>,
}

/// A selected team joined with its tasks, grouped per member
#[derive(Debug, Clone, PartialEq)]
pub struct TeamBoard {
    pub team: Record,
    pub assignments: Vec<MemberTasks>,
}

/// Member names stored on a team record
pub fn members_of(team: &Record) -> Vec<String> {
    team.get("members")
        .and_then(|v| v.as_list())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_text().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Tasks whose foreign key points at the given team
///
/// A task pointing at no existing team simply never shows up in any
/// board; there is no orphan handling.
pub fn tasks_by_team(tasks: &Snapshot, team_id: &RecordId) -> Vec<Record> {
    tasks
        .records
        .iter()
        .filter(|task| task.text("team_id") == team_id.as_str())
        .cloned()
        .collect()
}

/// Join the two snapshots for one selected team
///
/// Linear scan on every recompute: filter the team's tasks, then group
/// them by member name via the single-value `assigned_to` field.
pub fn team_board(teams: &Snapshot, tasks: &Snapshot, team_id: &RecordId) -> Option<TeamBoard> {
    let team = teams.get(team_id)?.clone();
    let team_tasks = tasks_by_team(tasks, team_id);

    let assignments = members_of(&team)
        .into_iter()
        .map(|member| {
            let tasks = team_tasks
                .iter()
                .filter(|task| task.text("assigned_to") == member)
                .cloned()
                .collect();
            MemberTasks { member, tasks }
        })
        .collect();

    Some(TeamBoard { team, assignments })
}

/// Assign a task to the selected members
///
/// Issues one update per member. The `assigned_to` field holds a single
/// value, so the last member processed wins.
pub async fn assign_task(
    gateway: &dyn Gateway,
    task_id: &RecordId,
    members: &[String],
) -> Result<Outcome, CommitError> {
    if task_id.is_empty() || members.is_empty() {
        return Err(ValidationError::field(
            "assignees",
            "Select a task and at least one assignee.",
        )
        .into());
    }

    for member in members {
        let mut fields = BTreeMap::new();
        fields.insert("assigned_to".to_string(), FieldValue::Text(member.clone()));

        if let Err(err) = gateway.update("tasks", task_id, fields).await {
            tracing::error!(task = %task_id, member = %member, %err, "assignment failed");
            return Err(err.into());
        }
    }

    Ok(Outcome::Updated)
}

/// Joint observer of the teams and tasks collections
///
/// Merges both subscriptions into one pump so the board recomputes on
/// every change to either snapshot.
pub struct TeamAssignmentView {
    teams: Snapshot,
    tasks: Snapshot,
    streams: StreamMap<&'static str, SnapshotStream>,
}

impl TeamAssignmentView {
    pub async fn attach(gateway: &dyn Gateway) -> Result<Self, StoreError> {
        let teams_sub = gateway.subscribe("teams", None, None).await?;
        let tasks_sub = gateway.subscribe("tasks", None, None).await?;

        let mut streams = StreamMap::new();
        streams.insert("teams", teams_sub.into_stream());
        streams.insert("tasks", tasks_sub.into_stream());

        Ok(Self {
            teams: Snapshot::empty("teams"),
            tasks: Snapshot::empty("tasks"),
            streams,
        })
    }

    /// Apply the next delivery from either collection
    pub async fn pump(&mut self) -> bool {
        match self.streams.next().await {
            Some((_, snapshot)) => {
                match snapshot.collection.as_str() {
                    "teams" => self.teams = snapshot,
                    "tasks" => self.tasks = snapshot,
                    other => tracing::warn!(collection = other, "unexpected delivery"),
                }
                true
            }
            None => false,
        }
    }

    pub fn teams(&self) -> &Snapshot {
        &self.teams
    }

    pub fn tasks(&self) -> &Snapshot {
        &self.tasks
    }

    pub fn board(&self, team_id: &RecordId) -> Option<TeamBoard> {
        team_board(&self.teams, &self.tasks, team_id)
    }
}
