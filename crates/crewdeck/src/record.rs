// File: src/record.rs
// Purpose: Record, edit draft, and snapshot types

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::value::FieldValue;

/// Immutable, store-assigned record identifier
///
/// Assigned once on create and never reused after deletion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    /// Mint a fresh identifier (UUID v4)
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One persisted document: identifier plus named fields
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: RecordId, fields: BTreeMap<String, FieldValue>) -> Self {
        Self { id, fields }
    }

    /// Builder-style field setter, mostly used by tests and fixtures
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Text field accessor; missing and non-text fields read as ""
    pub fn text(&self, name: &str) -> &str {
        self.get(name).and_then(|v| v.as_text()).unwrap_or("")
    }

    /// Bool field accessor; missing fields read as false
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(|v| v.as_bool()).unwrap_or(false)
    }
}

/// The single in-progress edit buffer for a view
///
/// Tagged with a record identifier while editing an existing record,
/// untagged while creating a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub editing: Option<RecordId>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Draft {
    /// Start a create draft from a set of schema defaults
    pub fn create(defaults: BTreeMap<String, FieldValue>) -> Self {
        Self {
            editing: None,
            fields: defaults,
        }
    }

    /// Start an edit draft by copying a record's fields
    pub fn edit(record: &Record) -> Self {
        Self {
            editing: Some(record.id.clone()),
            fields: record.fields.clone(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.editing.is_none() && self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.editing = None;
        self.fields.clear();
    }
}

/// Serialize a field map to a JSON object for storage
pub fn fields_to_json(fields: &BTreeMap<String, FieldValue>) -> serde_json::Value {
    serde_json::Value::Object(
        fields
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect(),
    )
}

/// Read a field map back from a stored JSON object
///
/// Non-object values yield an empty map rather than an error; a damaged
/// row degrades to an empty record instead of poisoning the snapshot.
pub fn fields_from_json(value: &serde_json::Value) -> BTreeMap<String, FieldValue> {
    match value {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(name, value)| (name.clone(), FieldValue::from_json(value)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// Full current state of one collection, as last observed
///
/// Every delivery is a complete replacement of the prior snapshot, never
/// a delta the observer must merge. The version increases strictly with
/// each delivery for one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub collection: String,
    pub version: u64,
    pub records: Vec<Record>,
}

impl Snapshot {
    pub fn empty(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            version: 0,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }
}
