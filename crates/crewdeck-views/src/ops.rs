// File: crewdeck-views/src/ops.rs
// Purpose: Pure pre-dispatch computations for specific collections

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crewdeck::{Draft, FieldValue, ValidationError};
use crewdeck::validation::validators;

/// Interpret a field as a point in time
///
/// Accepts real timestamps, RFC 3339 text, and the `YYYY-MM-DD` text a
/// date input produces (read as midnight UTC).
pub fn parse_when(value: &FieldValue) -> Option<DateTime<Utc>> {
    match value {
        FieldValue::Timestamp(ts) => Some(*ts),
        FieldValue::Text(s) => {
            if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                return Some(ts.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}

/// Reminder time for a deadline: one day before
pub fn reminder_for(deadline: DateTime<Utc>) -> DateTime<Utc> {
    deadline - Duration::days(1)
}

/// Fill computed side fields before a create is dispatched
///
/// Pure and deterministic; runs before dispatch, never after. Tasks get
/// a reminder derived from their deadline.
pub fn apply_side_fields(collection: &str, fields: &mut BTreeMap<String, FieldValue>) {
    if collection == "tasks" {
        if let Some(deadline) = fields.get("deadline").and_then(parse_when) {
            fields.insert(
                "reminder".to_string(),
                FieldValue::Timestamp(reminder_for(deadline)),
            );
        }
    }
}

/// Build an invitation draft: fresh token, unused, stamped now
pub fn invitation_draft(email: &str) -> Result<Draft, ValidationError> {
    if !validators::is_valid_email(email) {
        return Err(ValidationError::field(
            "email",
            "enter a valid email address",
        ));
    }

    let mut draft = Draft::default();
    draft.set("email", email);
    draft.set("token", Uuid::new_v4().to_string());
    draft.set("used", false);
    draft.set("created_at", Utc::now());
    Ok(draft)
}

/// Full invitation link for a generated token
pub fn invite_link(base: &str, token: &str) -> String {
    format!("{}/invite/{}", base.trim_end_matches('/'), token)
}

/// Build a message draft; blank content is rejected before dispatch
pub fn message_draft(
    sender_id: &str,
    receiver_id: &str,
    content: &str,
) -> Result<Draft, ValidationError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ValidationError::field("content", "message is empty"));
    }

    let mut draft = Draft::default();
    draft.set("sender_id", sender_id);
    draft.set("receiver_id", receiver_id);
    draft.set("content", content);
    draft.set("sent_at", Utc::now());
    draft.set("kind", "individual");
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_when_accepts_dates_and_timestamps() {
        let midnight = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        assert_eq!(parse_when(&FieldValue::Text("2025-01-10".into())), Some(midnight));
        assert_eq!(parse_when(&FieldValue::Timestamp(midnight)), Some(midnight));
        assert_eq!(
            parse_when(&FieldValue::Text("2025-01-10T00:00:00Z".into())),
            Some(midnight)
        );
        assert_eq!(parse_when(&FieldValue::Text("soon".into())), None);
        assert_eq!(parse_when(&FieldValue::Bool(true)), None);
    }

    #[test]
    fn test_reminder_is_one_day_before_deadline() {
        let deadline = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2025, 1, 9, 0, 0, 0).unwrap();
        assert_eq!(reminder_for(deadline), expected);
    }

    #[test]
    fn test_apply_side_fields_sets_task_reminder() {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), FieldValue::Text("Design".into()));
        fields.insert("deadline".to_string(), FieldValue::Text("2025-01-10".into()));

        apply_side_fields("tasks", &mut fields);

        let reminder = fields.get("reminder").and_then(|v| v.as_timestamp()).unwrap();
        assert_eq!(reminder, Utc.with_ymd_and_hms(2025, 1, 9, 0, 0, 0).unwrap());

        // Other collections are untouched
        let mut todo = BTreeMap::new();
        todo.insert("deadline".to_string(), FieldValue::Text("2025-01-10".into()));
        apply_side_fields("todo_items", &mut todo);
        assert!(!todo.contains_key("reminder"));
    }

    #[test]
    fn test_invitation_draft() {
        let draft = invitation_draft("ann@example.com").unwrap();
        assert_eq!(draft.get("email"), Some(&FieldValue::Text("ann@example.com".into())));
        assert_eq!(draft.get("used"), Some(&FieldValue::Bool(false)));

        let token = draft.get("token").and_then(|v| v.as_text()).unwrap();
        assert!(!token.is_empty());

        assert!(invitation_draft("nope").is_err());
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = invitation_draft("ann@example.com").unwrap();
        let b = invitation_draft("ann@example.com").unwrap();
        assert_ne!(a.get("token"), b.get("token"));
    }

    #[test]
    fn test_invite_link() {
        assert_eq!(
            invite_link("https://app.example.com", "tok-1"),
            "https://app.example.com/invite/tok-1"
        );
        assert_eq!(
            invite_link("https://app.example.com/", "tok-1"),
            "https://app.example.com/invite/tok-1"
        );
    }

    #[test]
    fn test_message_draft_trims_and_rejects_blank() {
        let draft = message_draft("u1", "u2", "  hello  ").unwrap();
        assert_eq!(draft.get("content"), Some(&FieldValue::Text("hello".into())));
        assert_eq!(draft.get("kind"), Some(&FieldValue::Text("individual".into())));

        assert!(message_draft("u1", "u2", "   ").is_err());
    }
}
