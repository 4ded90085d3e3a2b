// File: crewdeck-sync/src/memory.rs
// Purpose: In-memory gateway backend

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use crewdeck::{Config, FieldValue, Record, RecordId, Snapshot, StoreError};

use crate::gateway::{FilterExpr, Gateway, OrderExpr};
use crate::subscription::Subscription;

/// One collection's live state
struct CollectionState {
    records: Vec<Record>,
    version: u64,
    tx: broadcast::Sender<Snapshot>,
}

impl CollectionState {
    fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            records: Vec::new(),
            version: 0,
            tx,
        }
    }

    fn snapshot(&self, collection: &str) -> Snapshot {
        Snapshot {
            collection: collection.to_string(),
            version: self.version,
            records: self.records.clone(),
        }
    }

    /// Bump the version and fan out the full current state
    fn publish(&mut self, collection: &str) {
        self.version += 1;
        // Send fails only when nobody is subscribed, which is fine
        let _ = self.tx.send(self.snapshot(collection));
    }
}

/// In-memory gateway backend
///
/// Keeps each collection as a vector in insertion order behind an async
/// RwLock, with one broadcast channel per collection. Fast and
/// non-persistent; the backend used by tests and local sessions.
#[derive(Clone)]
pub struct MemoryGateway {
    capacity: usize,
    collections: Arc<RwLock<HashMap<String, CollectionState>>>,
}

impl MemoryGateway {
    /// Create a new memory gateway with the default channel capacity
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_capacity(config.sync.channel_capacity)
    }

    /// Number of records currently held in a collection
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|state| state.records.len())
            .unwrap_or(0)
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn subscribe(
        &self,
        collection: &str,
        filter: Option<FilterExpr>,
        order: Option<OrderExpr>,
    ) -> Result<Subscription, StoreError> {
        let mut collections = self.collections.write().await;
        let state = collections
            .entry(collection.to_string())
            .or_insert_with(|| CollectionState::new(self.capacity));

        let rx = state.tx.subscribe();
        let initial = state.snapshot(collection);
        tracing::debug!(collection, "subscription opened");

        Ok(Subscription::new(collection, filter, order, initial, rx))
    }

    async fn create(
        &self,
        collection: &str,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<RecordId, StoreError> {
        let mut collections = self.collections.write().await;
        let state = collections
            .entry(collection.to_string())
            .or_insert_with(|| CollectionState::new(self.capacity));

        let id = RecordId::new();
        state.records.push(Record::new(id.clone(), fields));
        state.publish(collection);

        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let state = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::not_found(collection, id.as_str()))?;

        let record = state
            .records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| StoreError::not_found(collection, id.as_str()))?;

        // Merge: fields absent from the update are left untouched
        record.fields.extend(fields);
        state.publish(collection);

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let state = match collections.get_mut(collection) {
            Some(state) => state,
            // Deleting from an unknown collection is a no-op
            None => return Ok(()),
        };

        let before = state.records.len();
        state.records.retain(|r| &r.id != id);

        if state.records.len() != before {
            state.publish(collection);
        }

        Ok(())
    }
}
