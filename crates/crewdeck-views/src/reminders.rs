// File: crewdeck-views/src/reminders.rs
// Purpose: Deadline reminder scheduling

use chrono::{DateTime, Duration, Utc};

use crewdeck::{RecordId, Snapshot};
use crewdeck_sync::Subscription;

/// A reminder stays deliverable for one minute past its due time
fn notify_window() -> Duration {
    Duration::seconds(60)
}

/// One scheduled reminder
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderEntry {
    pub due: DateTime<Utc>,
    pub task_id: RecordId,
    pub title: String,
}

impl ReminderEntry {
    pub fn message(&self) -> String {
        format!("Reminder: Task \"{}\" is due soon!", self.title)
    }
}

/// Reminders ordered by due time
///
/// Rebuilt from the tasks snapshot on every delivery instead of
/// rescanning the whole collection on a timer tick; the runner sleeps
/// exactly until the soonest entry.
#[derive(Debug, Default)]
pub struct ReminderQueue {
    /// Sorted by (due, task id)
    entries: Vec<ReminderEntry>,
}

impl ReminderQueue {
    /// Build the queue for a tasks snapshot
    pub fn rebuild(tasks: &Snapshot) -> Self {
        let mut entries: Vec<ReminderEntry> = tasks
            .records
            .iter()
            .filter_map(|record| {
                let due = record.get("reminder").and_then(crate::ops::parse_when)?;
                Some(ReminderEntry {
                    due,
                    task_id: record.id.clone(),
                    title: record.text("title").to_string(),
                })
            })
            .collect();

        entries.sort_by(|a, b| (a.due, &a.task_id).cmp(&(b.due, &b.task_id)));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time until the soonest entry still worth waking for
    ///
    /// Entries already due return a zero duration; entries whose window
    /// has fully passed are skipped.
    pub fn next_wake(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        self.entries
            .iter()
            .find(|entry| entry.due + notify_window() > now)
            .map(|entry| (entry.due - now).to_std().unwrap_or_default())
    }

    /// Remove and return the entries due right now
    ///
    /// An entry is due when its time has arrived but its one-minute
    /// window has not passed. Entries that expired undelivered are
    /// dropped silently.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<ReminderEntry> {
        let mut due = Vec::new();

        self.entries.retain(|entry| {
            if entry.due > now {
                return true;
            }
            if entry.due + notify_window() > now {
                due.push(entry.clone());
            }
            false
        });

        due
    }
}

/// Drive reminders for a tasks subscription
///
/// Rebuilds the queue on every snapshot delivery and sleeps until the
/// next due time in between. Ends when the subscription does.
pub async fn drive<F>(mut subscription: Subscription, mut notify: F)
where
    F: FnMut(ReminderEntry),
{
    let mut queue = ReminderQueue::default();

    loop {
        let wake = queue.next_wake(Utc::now());

        tokio::select! {
            delivery = subscription.next() => {
                match delivery {
                    Some(snapshot) => queue = ReminderQueue::rebuild(&snapshot),
                    None => break,
                }
            }
            _ = sleep_or_forever(wake) => {
                for entry in queue.take_due(Utc::now()) {
                    tracing::debug!(task = %entry.task_id, "reminder due");
                    notify(entry);
                }
            }
        }
    }
}

async fn sleep_or_forever(duration: Option<std::time::Duration>) {
    match duration {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use crewdeck::{FieldValue, Record};

    use super::*;

    fn task_with_reminder(id: &str, title: &str, due: DateTime<Utc>) -> Record {
        Record::new(RecordId::from(id), BTreeMap::new())
            .with_field("title", title)
            .with_field("reminder", due)
    }

    fn snapshot(records: Vec<Record>) -> Snapshot {
        Snapshot {
            collection: "tasks".into(),
            version: 1,
            records,
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 9, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_rebuild_orders_by_due_time() {
        let queue = ReminderQueue::rebuild(&snapshot(vec![
            task_with_reminder("b", "second", at(12)),
            task_with_reminder("a", "first", at(9)),
            Record::new(RecordId::from("c"), BTreeMap::new()).with_field("title", "no reminder"),
        ]));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.next_wake(at(8)), Some(std::time::Duration::from_secs(3600)));
    }

    #[test]
    fn test_next_wake_is_zero_for_due_entries() {
        let queue = ReminderQueue::rebuild(&snapshot(vec![task_with_reminder(
            "a",
            "due",
            at(9),
        )]));

        assert_eq!(queue.next_wake(at(9)), Some(std::time::Duration::ZERO));
        // Window fully passed: nothing left to wake for
        assert_eq!(queue.next_wake(at(10)), None);
    }

    #[test]
    fn test_take_due_respects_window() {
        let due = at(9);
        let mut queue = ReminderQueue::rebuild(&snapshot(vec![
            task_with_reminder("a", "now", due),
            task_with_reminder("b", "later", at(12)),
        ]));

        // 30 seconds after due: inside the window
        let taken = queue.take_due(due + Duration::seconds(30));
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].title, "now");
        assert_eq!(taken[0].message(), "Reminder: Task \"now\" is due soon!");

        // Already taken; the later entry is untouched
        assert_eq!(queue.len(), 1);
        assert!(queue.take_due(due + Duration::seconds(31)).is_empty());
    }

    #[test]
    fn test_expired_entries_are_dropped_silently() {
        let due = at(9);
        let mut queue = ReminderQueue::rebuild(&snapshot(vec![task_with_reminder(
            "a", "missed", due,
        )]));

        // Two minutes late: past the window, dropped without delivery
        let taken = queue.take_due(due + Duration::seconds(120));
        assert!(taken.is_empty());
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_drive_notifies_for_due_reminders() {
        use crewdeck_sync::{Gateway, MemoryGateway};
        use tokio::sync::mpsc;

        let gateway = MemoryGateway::new();

        // A reminder already inside its window when the driver starts
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), FieldValue::Text("ship it".into()));
        fields.insert("reminder".to_string(), FieldValue::Timestamp(Utc::now()));
        gateway.create("tasks", fields).await.unwrap();

        let subscription = gateway.subscribe("tasks", None, None).await.unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let driver = tokio::spawn(drive(subscription, move |entry| {
            let _ = tx.send(entry);
        }));

        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.title, "ship it");

        driver.abort();
    }
}
