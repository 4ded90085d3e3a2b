// File: src/error.rs
// Purpose: Error taxonomy for the data layer

use std::collections::HashMap;

use thiserror::Error;

/// Local rejection raised before a mutation reaches the store
///
/// Carries a field name to error-message map so forms can show errors
/// next to the offending inputs.
#[derive(Debug, Clone, Error)]
#[error("validation failed: {}", summarize(.errors))]
pub struct ValidationError {
    errors: HashMap<String, Vec<String>>,
}

fn summarize(errors: &HashMap<String, Vec<String>>) -> String {
    let mut fields: Vec<&str> = errors.keys().map(|k| k.as_str()).collect();
    fields.sort_unstable();
    fields.join(", ")
}

impl ValidationError {
    pub fn new(errors: HashMap<String, Vec<String>>) -> Self {
        Self { errors }
    }

    /// Single-field convenience constructor
    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = HashMap::new();
        errors.insert(name.into(), vec![message.into()]);
        Self { errors }
    }

    pub fn errors(&self) -> &HashMap<String, Vec<String>> {
        &self.errors
    }

    pub fn field_error(&self, field: &str) -> Option<&String> {
        self.errors.get(field).and_then(|e| e.first())
    }
}

/// Remote rejection from the document store
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("record {id} not found in {collection}")]
    NotFound { collection: String, id: String },

    #[error("already subscribed to {0}")]
    AlreadySubscribed(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Identity provider rejection
///
/// Session state is left unchanged whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("this email is already registered")]
    EmailInUse,

    #[error("enter a valid email address")]
    InvalidEmail,

    #[error("password must be at least {min_len} characters")]
    WeakPassword { min_len: usize },
}

/// Outcome of a dispatch call: either rejected locally or failed remotely
#[derive(Debug, Clone, Error)]
pub enum CommitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
