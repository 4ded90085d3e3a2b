// crewdeck - headless task/team management data layer
// Core types: field values, records, collection schemas, validation, config

pub mod config;
pub mod error;
pub mod record;
pub mod schema;
pub mod validation;
pub mod value;

// Re-export core types
pub use config::Config;
pub use error::{AuthError, CommitError, StoreError, ValidationError};
pub use record::{fields_from_json, fields_to_json, Draft, Record, RecordId, Snapshot};
pub use schema::{collections, CollectionSchema, FieldKind, FieldSpec};
pub use validation::ValidationResult;
pub use value::FieldValue;
