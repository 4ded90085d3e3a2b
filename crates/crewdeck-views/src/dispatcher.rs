// File: crewdeck-views/src/dispatcher.rs
// Purpose: Translate user actions into single validated store mutations

use std::collections::BTreeMap;
use std::sync::Arc;

use crewdeck::{CollectionSchema, CommitError, Draft, FieldValue, RecordId};
use crewdeck_sync::Gateway;

use crate::ops;

/// What a successful dispatch did
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created(RecordId),
    Updated,
    Deleted,
    /// Nothing was dispatched (empty identifier)
    Noop,
}

/// User-visible transient failure notice
///
/// Remote failures degrade to one of these and an unchanged snapshot;
/// the user re-triggers the action if they still want it.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&CommitError> for Notice {
    fn from(err: &CommitError) -> Self {
        Self::new(err.to_string())
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Applies exactly one store mutation per user action
///
/// Validation runs before any store contact; remote failures are caught
/// here, logged, and reported to the caller, never escalated. Commits do
/// not touch the snapshot: the UI update arrives when the subscription
/// delivers the next snapshot.
pub struct MutationDispatcher {
    gateway: Arc<dyn Gateway>,
    schema: CollectionSchema,
}

impl MutationDispatcher {
    pub fn new(gateway: Arc<dyn Gateway>, schema: CollectionSchema) -> Self {
        Self { gateway, schema }
    }

    pub fn collection(&self) -> &str {
        self.schema.name
    }

    /// Create a record from a draft
    ///
    /// Takes the draft by value: the edit buffer is consumed on dispatch
    /// regardless of the eventual outcome. Computed side fields (a
    /// task's reminder) are filled in before dispatch.
    pub async fn commit_create(&self, draft: Draft) -> Result<Outcome, CommitError> {
        let mut fields = draft.fields;
        self.schema.validate(&fields)?;

        ops::apply_side_fields(self.schema.name, &mut fields);

        match self.gateway.create(self.schema.name, fields).await {
            Ok(id) => Ok(Outcome::Created(id)),
            Err(err) => {
                tracing::error!(collection = self.schema.name, %err, "create failed");
                Err(err.into())
            }
        }
    }

    /// Save an edit draft back to its record
    ///
    /// Sends only the fields present in the draft. A draft with no
    /// record tag is a no-op.
    pub async fn commit_update(&self, draft: Draft) -> Result<Outcome, CommitError> {
        let id = match &draft.editing {
            Some(id) if !id.is_empty() => id.clone(),
            _ => return Ok(Outcome::Noop),
        };

        self.schema.validate_partial(&draft.fields)?;

        match self.gateway.update(self.schema.name, &id, draft.fields).await {
            Ok(()) => Ok(Outcome::Updated),
            Err(err) => {
                tracing::error!(collection = self.schema.name, id = %id, %err, "update failed");
                Err(err.into())
            }
        }
    }

    /// Delete a record; the only local check is a non-empty identifier
    pub async fn commit_delete(&self, id: &RecordId) -> Result<Outcome, CommitError> {
        if id.is_empty() {
            return Ok(Outcome::Noop);
        }

        match self.gateway.delete(self.schema.name, id).await {
            Ok(()) => Ok(Outcome::Deleted),
            Err(err) => {
                tracing::error!(collection = self.schema.name, id = %id, %err, "delete failed");
                Err(err.into())
            }
        }
    }

    /// Flip a boolean field, for completion checkboxes
    pub async fn commit_toggle(
        &self,
        id: &RecordId,
        field: &str,
        current: bool,
    ) -> Result<Outcome, CommitError> {
        if id.is_empty() {
            return Ok(Outcome::Noop);
        }

        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), FieldValue::Bool(!current));

        match self.gateway.update(self.schema.name, id, fields).await {
            Ok(()) => Ok(Outcome::Updated),
            Err(err) => {
                tracing::error!(collection = self.schema.name, id = %id, %err, "toggle failed");
                Err(err.into())
            }
        }
    }
}
