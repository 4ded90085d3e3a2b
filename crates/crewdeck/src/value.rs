// File: src/value.rs
// Purpose: Field value types stored inside records

use chrono::{DateTime, Utc};

/// Supported value types for record fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<FieldValue>),
    Timestamp(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Convert value to string for display
    pub fn display(&self) -> String {
        match self {
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => {
                // Format number nicely (remove .0 for integers)
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => {
                let items: Vec<String> = items.iter().map(|v| v.display()).collect();
                items.join(", ")
            }
            FieldValue::Timestamp(ts) => ts.to_rfc3339(),
            FieldValue::Null => String::new(),
        }
    }

    /// Convert value to boolean
    pub fn truthy(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => *n != 0.0,
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::List(items) => !items.is_empty(),
            FieldValue::Timestamp(_) => true,
            FieldValue::Null => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Convert to a JSON value for storage
    ///
    /// Timestamps are stored as RFC 3339 strings so any JSON-backed store
    /// can hold them without a custom type.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Text(s) => serde_json::Value::String(s.clone()),
            FieldValue::List(items) => {
                serde_json::Value::Array(items.iter().map(|v| v.to_json()).collect())
            }
            FieldValue::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
            FieldValue::Null => serde_json::Value::Null,
        }
    }

    /// Convert from a JSON value read back from storage
    ///
    /// Strings that parse as RFC 3339 timestamps come back as timestamps,
    /// which makes the JSON round-trip stable.
    pub fn from_json(value: &serde_json::Value) -> FieldValue {
        match value {
            serde_json::Value::Bool(b) => FieldValue::Bool(*b),
            serde_json::Value::Number(n) => {
                FieldValue::Number(n.as_f64().unwrap_or(0.0))
            }
            serde_json::Value::String(s) => match DateTime::parse_from_rfc3339(s) {
                Ok(ts) => FieldValue::Timestamp(ts.with_timezone(&Utc)),
                Err(_) => FieldValue::Text(s.clone()),
            },
            serde_json::Value::Array(items) => {
                FieldValue::List(items.iter().map(FieldValue::from_json).collect())
            }
            serde_json::Value::Object(_) => FieldValue::Null,
            serde_json::Value::Null => FieldValue::Null,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::List(items)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(ts: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Number(3.0).display(), "3");
        assert_eq!(FieldValue::Number(3.5).display(), "3.5");
        assert_eq!(FieldValue::Text("hi".into()).display(), "hi");
        assert_eq!(FieldValue::Null.display(), "");
        assert_eq!(
            FieldValue::List(vec!["a".into(), "b".into()]).display(),
            "a, b"
        );
    }

    #[test]
    fn test_truthy() {
        assert!(FieldValue::Bool(true).truthy());
        assert!(!FieldValue::Bool(false).truthy());
        assert!(!FieldValue::Text(String::new()).truthy());
        assert!(FieldValue::Text("x".into()).truthy());
        assert!(!FieldValue::Null.truthy());
        assert!(!FieldValue::List(vec![]).truthy());
    }

    #[test]
    fn test_json_round_trip() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 9, 12, 0, 0).unwrap();
        let values = vec![
            FieldValue::Bool(true),
            FieldValue::Number(42.0),
            FieldValue::Text("hello".into()),
            FieldValue::List(vec!["a".into(), FieldValue::Bool(false)]),
            FieldValue::Timestamp(ts),
            FieldValue::Null,
        ];

        for value in values {
            let json = value.to_json();
            assert_eq!(FieldValue::from_json(&json), value);
        }
    }

    #[test]
    fn test_plain_date_stays_text() {
        // Date-only strings are not RFC 3339 and must not be coerced
        let json = serde_json::Value::String("2025-01-10".into());
        assert_eq!(FieldValue::from_json(&json), FieldValue::Text("2025-01-10".into()));
    }
}
