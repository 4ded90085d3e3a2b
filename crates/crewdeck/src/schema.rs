// File: src/schema.rs
// Purpose: Explicit per-collection schemas checked at the dispatch boundary

use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::validation::{validators, ValidationResult};
use crate::value::FieldValue;

/// Kind of value a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Bool,
    Number,
    Email,
    Timestamp,
    /// List of text values (member emails, assignee names)
    TextList,
    /// Identifier of a record in another collection
    Reference,
}

/// One field of a collection schema
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<FieldValue>,
}

/// Schema of one collection: named fields, required/optional, defaults
///
/// Built with the `required`/`optional`/`optional_with` builder methods,
/// mirrored by the catalogue in [`collections`].
#[derive(Debug, Clone)]
pub struct CollectionSchema {
    pub name: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl CollectionSchema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    pub fn required(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            required: true,
            default: None,
        });
        self
    }

    pub fn optional(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            required: false,
            default: None,
        });
        self
    }

    pub fn optional_with(
        mut self,
        name: &'static str,
        kind: FieldKind,
        default: impl Into<FieldValue>,
    ) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            required: false,
            default: Some(default.into()),
        });
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Defaults applied once, when a create draft is opened
    pub fn defaults(&self) -> BTreeMap<String, FieldValue> {
        self.fields
            .iter()
            .filter_map(|f| f.default.clone().map(|v| (f.name.to_string(), v)))
            .collect()
    }

    /// Validate a full draft before a create is dispatched
    ///
    /// Required fields must be present and non-blank; all present fields
    /// must match their declared kind. Fails without any store call.
    pub fn validate(&self, fields: &BTreeMap<String, FieldValue>) -> Result<(), ValidationError> {
        let mut result = ValidationResult::new();

        for spec in &self.fields {
            match fields.get(spec.name) {
                None | Some(FieldValue::Null) => {
                    if spec.required {
                        result.add_error(spec.name, format!("{} is required", spec.name));
                    }
                }
                Some(value) => check_kind(spec, value, &mut result),
            }
        }

        result.into_result()
    }

    /// Validate only the fields present in a partial update
    pub fn validate_partial(
        &self,
        fields: &BTreeMap<String, FieldValue>,
    ) -> Result<(), ValidationError> {
        let mut result = ValidationResult::new();

        for (name, value) in fields {
            if let Some(spec) = self.field(name) {
                if value.is_null() {
                    if spec.required {
                        result.add_error(spec.name, format!("{} is required", spec.name));
                    }
                } else {
                    check_kind(spec, value, &mut result);
                }
            }
        }

        result.into_result()
    }
}

fn check_kind(spec: &FieldSpec, value: &FieldValue, result: &mut ValidationResult) {
    match spec.kind {
        FieldKind::Text | FieldKind::Reference => match value {
            FieldValue::Text(s) => {
                if spec.required && !validators::is_present(s) {
                    result.add_error(spec.name, format!("{} is required", spec.name));
                }
            }
            _ => result.add_error(spec.name, format!("{} must be text", spec.name)),
        },
        FieldKind::Email => match value {
            FieldValue::Text(s) if validators::is_valid_email(s) => {}
            _ => result.add_error(spec.name, format!("{} must be a valid email address", spec.name)),
        },
        FieldKind::Bool => {
            if value.as_bool().is_none() {
                result.add_error(spec.name, format!("{} must be true or false", spec.name));
            }
        }
        FieldKind::Number => {
            if value.as_number().is_none() {
                result.add_error(spec.name, format!("{} must be a number", spec.name));
            }
        }
        FieldKind::Timestamp => match value {
            FieldValue::Timestamp(_) => {}
            // Date inputs arrive as plain text; accept non-blank text
            FieldValue::Text(s) if validators::is_present(s) => {}
            _ => result.add_error(spec.name, format!("{} must be a date", spec.name)),
        },
        FieldKind::TextList => match value {
            FieldValue::List(items) => {
                if spec.required && items.is_empty() {
                    result.add_error(spec.name, format!("{} must not be empty", spec.name));
                } else if items.iter().any(|v| v.as_text().is_none()) {
                    result.add_error(spec.name, format!("{} must be a list of text values", spec.name));
                }
            }
            _ => result.add_error(spec.name, format!("{} must be a list", spec.name)),
        },
    }
}

/// The collection catalogue of the product
pub mod collections {
    use super::{CollectionSchema, FieldKind};

    pub fn tasks() -> CollectionSchema {
        CollectionSchema::new("tasks")
            .required("title", FieldKind::Text)
            .required("deadline", FieldKind::Timestamp)
            .optional("description", FieldKind::Text)
            .optional_with("priority", FieldKind::Text, "Low")
            .optional_with("status", FieldKind::Text, "Pending")
            .optional("reminder", FieldKind::Timestamp)
            .optional("assigned_to", FieldKind::Text)
            .optional("team_id", FieldKind::Reference)
    }

    pub fn todo_items() -> CollectionSchema {
        CollectionSchema::new("todo_items")
            .required("title", FieldKind::Text)
            .optional_with("completed", FieldKind::Bool, false)
            .optional("created_at", FieldKind::Timestamp)
    }

    pub fn teams() -> CollectionSchema {
        CollectionSchema::new("teams")
            .required("name", FieldKind::Text)
            .required("members", FieldKind::TextList)
            .optional("created_at", FieldKind::Timestamp)
    }

    pub fn people() -> CollectionSchema {
        CollectionSchema::new("people")
            .required("name", FieldKind::Text)
            .required("email", FieldKind::Email)
    }

    pub fn customers() -> CollectionSchema {
        CollectionSchema::new("customers")
            .required("name", FieldKind::Text)
            .optional("contact", FieldKind::Text)
            .optional("company", FieldKind::Text)
            .optional_with("status", FieldKind::Text, "prospective")
    }

    pub fn leads() -> CollectionSchema {
        CollectionSchema::new("leads")
            .required("customer_id", FieldKind::Reference)
            .optional("source", FieldKind::Text)
            .optional_with("interest_level", FieldKind::Text, "medium")
            .optional_with("status", FieldKind::Text, "contacted")
    }

    pub fn interactions() -> CollectionSchema {
        CollectionSchema::new("interactions")
            .required("customer_id", FieldKind::Reference)
            .required("date", FieldKind::Timestamp)
            .optional_with("kind", FieldKind::Text, "call")
            .optional("notes", FieldKind::Text)
    }

    pub fn invitations() -> CollectionSchema {
        CollectionSchema::new("invitations")
            .required("email", FieldKind::Email)
            .required("token", FieldKind::Text)
            .optional("created_at", FieldKind::Timestamp)
            .optional_with("used", FieldKind::Bool, false)
    }

    pub fn messages() -> CollectionSchema {
        CollectionSchema::new("messages")
            .required("sender_id", FieldKind::Reference)
            .required("receiver_id", FieldKind::Reference)
            .required("content", FieldKind::Text)
            .optional("sent_at", FieldKind::Timestamp)
            .optional_with("kind", FieldKind::Text, "individual")
    }

    /// Every collection, for stores that pre-create their tables
    pub fn all() -> Vec<CollectionSchema> {
        vec![
            tasks(),
            todo_items(),
            teams(),
            people(),
            customers(),
            leads(),
            interactions(),
            invitations(),
            messages(),
        ]
    }

    /// Look up a schema by collection name
    pub fn by_name(name: &str) -> Option<CollectionSchema> {
        all().into_iter().find(|schema| schema.name == name)
    }
}
