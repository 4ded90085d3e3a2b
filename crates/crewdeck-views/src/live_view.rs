// File: crewdeck-views/src/live_view.rs
// Purpose: Per-view snapshot mirror with a single edit draft

use std::sync::Arc;

use crewdeck::{CollectionSchema, Draft, FieldValue, Record, Snapshot, StoreError};
use crewdeck_sync::{FilterExpr, Gateway, OrderExpr, Subscription};

use crate::dispatcher::MutationDispatcher;

/// The reusable synchronization unit behind every collection view
///
/// Owns its snapshot copy and one edit draft exclusively; two view
/// models on the same collection are independent observers with no
/// shared cache. At most one subscription is active per view model.
pub struct LiveViewModel {
    gateway: Arc<dyn Gateway>,
    schema: CollectionSchema,
    snapshot: Snapshot,
    draft: Draft,
    subscription: Option<Subscription>,
}

impl LiveViewModel {
    pub fn new(gateway: Arc<dyn Gateway>, schema: CollectionSchema) -> Self {
        let snapshot = Snapshot::empty(schema.name);
        Self {
            gateway,
            schema,
            snapshot,
            draft: Draft::default(),
            subscription: None,
        }
    }

    pub fn schema(&self) -> &CollectionSchema {
        &self.schema
    }

    /// A dispatcher bound to the same gateway and collection
    pub fn dispatcher(&self) -> MutationDispatcher {
        MutationDispatcher::new(self.gateway.clone(), self.schema.clone())
    }

    /// Open the live subscription
    ///
    /// Calling this while already attached is a caller error; detach
    /// first.
    pub async fn attach(&mut self) -> Result<(), StoreError> {
        self.attach_with(None, None).await
    }

    pub async fn attach_with(
        &mut self,
        filter: Option<FilterExpr>,
        order: Option<OrderExpr>,
    ) -> Result<(), StoreError> {
        if self.subscription.is_some() {
            return Err(StoreError::AlreadySubscribed(self.schema.name.to_string()));
        }

        let subscription = self
            .gateway
            .subscribe(self.schema.name, filter, order)
            .await?;
        self.subscription = Some(subscription);
        Ok(())
    }

    /// Apply the next snapshot delivery
    ///
    /// Returns false once detached or the store side is gone; deliveries
    /// that race a detach are dropped, never applied. Out-of-order
    /// deliveries (older version than already applied) are skipped.
    pub async fn pump(&mut self) -> bool {
        let subscription = match self.subscription.as_mut() {
            Some(subscription) => subscription,
            None => return false,
        };

        match subscription.next().await {
            Some(snapshot) => {
                if snapshot.version >= self.snapshot.version {
                    self.snapshot = snapshot;
                }
                true
            }
            None => {
                self.subscription = None;
                false
            }
        }
    }

    /// Release the subscription; idempotent
    pub fn detach(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Last observed state of the collection
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Start editing an existing record
    ///
    /// Copies the record's fields into the draft and tags it with the
    /// record's identifier. Any prior unsaved draft is discarded. The
    /// record is not required to still exist in the latest snapshot;
    /// a stale save surfaces as a store failure at commit time.
    pub fn begin_edit(&mut self, record: &Record) {
        self.draft = Draft::edit(record);
    }

    /// Start a create draft, field-defaulted from the schema
    pub fn begin_create(&mut self) {
        self.draft = Draft::create(self.schema.defaults());
    }

    /// Set one draft field; the store is not touched
    pub fn update_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.draft.set(name, value);
    }

    pub fn clear_draft(&mut self) {
        self.draft.clear();
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Hand the draft to a commit, leaving the buffer empty
    pub fn take_draft(&mut self) -> Draft {
        std::mem::take(&mut self.draft)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use crewdeck::{collections, FieldValue, RecordId};
    use crewdeck_sync::MemoryGateway;

    use super::*;

    fn title_fields(title: &str) -> BTreeMap<String, FieldValue> {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), FieldValue::Text(title.into()));
        fields
    }

    #[tokio::test]
    async fn test_pump_applies_deliveries() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut view = LiveViewModel::new(gateway.clone(), collections::todo_items());

        view.attach().await.unwrap();
        assert!(view.pump().await); // initial state
        assert!(view.snapshot().is_empty());

        gateway.create("todo_items", title_fields("buy milk")).await.unwrap();
        assert!(view.pump().await);
        assert_eq!(view.snapshot().len(), 1);
        assert_eq!(view.snapshot().records[0].text("title"), "buy milk");
    }

    #[tokio::test]
    async fn test_double_attach_is_an_error() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut view = LiveViewModel::new(gateway, collections::todo_items());

        view.attach().await.unwrap();
        let err = view.attach().await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadySubscribed(_)));
    }

    #[tokio::test]
    async fn test_detach_is_idempotent_and_stops_pumping() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut view = LiveViewModel::new(gateway.clone(), collections::todo_items());

        view.attach().await.unwrap();
        view.detach();
        view.detach();
        assert!(!view.is_attached());

        // A mutation that lands after detach is never applied
        gateway.create("todo_items", title_fields("late")).await.unwrap();
        assert!(!view.pump().await);
        assert!(view.snapshot().is_empty());

        // Detached views can attach again
        view.attach().await.unwrap();
        assert!(view.pump().await);
        assert_eq!(view.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_two_views_keep_independent_snapshots() {
        let gateway = Arc::new(MemoryGateway::new());
        let mut first = LiveViewModel::new(gateway.clone(), collections::todo_items());
        let mut second = LiveViewModel::new(gateway.clone(), collections::todo_items());

        first.attach().await.unwrap();
        second.attach().await.unwrap();
        first.pump().await;
        second.pump().await;

        gateway.create("todo_items", title_fields("shared")).await.unwrap();

        // Only the pumped view advances
        first.pump().await;
        assert_eq!(first.snapshot().len(), 1);
        assert_eq!(second.snapshot().len(), 0);

        second.pump().await;
        assert_eq!(second.snapshot().len(), 1);
    }

    #[test]
    fn test_draft_lifecycle() {
        let gateway: Arc<dyn Gateway> = Arc::new(MemoryGateway::new());
        let mut view = LiveViewModel::new(gateway, collections::tasks());

        view.begin_create();
        assert_eq!(view.draft().get("priority"), Some(&FieldValue::Text("Low".into())));
        assert_eq!(view.draft().editing, None);

        view.update_field("title", "Design");
        assert_eq!(view.draft().get("title"), Some(&FieldValue::Text("Design".into())));

        // Starting an edit silently replaces the unsaved create draft
        let record = Record::new(RecordId::from("t1"), BTreeMap::new())
            .with_field("title", "Other")
            .with_field("deadline", "2025-01-10");
        view.begin_edit(&record);
        assert_eq!(view.draft().editing, Some(RecordId::from("t1")));
        assert_eq!(view.draft().get("title"), Some(&FieldValue::Text("Other".into())));

        let taken = view.take_draft();
        assert_eq!(taken.editing, Some(RecordId::from("t1")));
        assert!(view.draft().is_empty());
    }
}
