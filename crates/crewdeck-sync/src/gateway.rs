// File: crewdeck-sync/src/gateway.rs
// Purpose: Gateway trait and query expressions

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;

use crewdeck::{FieldValue, Record, RecordId, StoreError};

use crate::subscription::Subscription;

/// Equality predicate on one field of a collection
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpr {
    pub field: String,
    pub value: FieldValue,
}

impl FilterExpr {
    pub fn eq(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        record.get(&self.field) == Some(&self.value)
    }
}

/// Sort direction for an order expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Sort on one field of a collection
#[derive(Debug, Clone, PartialEq)]
pub struct OrderExpr {
    pub field: String,
    pub direction: Direction,
}

impl OrderExpr {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }
}

/// External document store abstraction
///
/// Implementations deliver a fresh full snapshot to every subscriber of a
/// collection after each successful mutation. A snapshot is a complete
/// replacement, never a delta. Constructed explicitly and injected
/// (`Arc<dyn Gateway>`) so tests can substitute their own store.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Open a live subscription to a collection
    ///
    /// The first delivery is the collection's current state. Store order
    /// applies unless an order expression is given.
    async fn subscribe(
        &self,
        collection: &str,
        filter: Option<FilterExpr>,
        order: Option<OrderExpr>,
    ) -> Result<Subscription, StoreError>;

    /// Create a document; the store assigns and returns its identifier
    async fn create(
        &self,
        collection: &str,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<RecordId, StoreError>;

    /// Update the given fields of an existing document
    ///
    /// Fields absent from the map are left untouched. Fails with
    /// `StoreError::NotFound` when the identifier does not exist.
    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<(), StoreError>;

    /// Delete a document; deleting an absent identifier is a no-op
    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), StoreError>;
}

/// Order records by one field (pure function)
///
/// Missing fields sort last regardless of direction; the sort is stable
/// so equal keys keep store order.
pub fn apply_order(records: &mut [Record], order: &OrderExpr) {
    records.sort_by(|a, b| {
        let ordering = compare_fields(a.get(&order.field), b.get(&order.field));
        match order.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    });
}

/// Keep only records matching the filter (pure function)
pub fn apply_filter(records: Vec<Record>, filter: &FilterExpr) -> Vec<Record> {
    records.into_iter().filter(|r| filter.matches(r)).collect()
}

fn compare_fields(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare_values(a, b),
    }
}

fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Number(a), FieldValue::Number(b)) => {
            a.partial_cmp(b).unwrap_or(Ordering::Equal)
        }
        (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
        (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
        (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
        // Mixed kinds have no meaningful order; keep store order
        _ => Ordering::Equal,
    }
}
