// File: crewdeck-sync/src/subscription.rs
// Purpose: Live snapshot subscription handle

use std::pin::Pin;

use futures::Stream;
use tokio::sync::broadcast;

use crewdeck::Snapshot;

use crate::gateway::{apply_filter, apply_order, FilterExpr, OrderExpr};

/// Boxed stream of snapshots, for merging several subscriptions
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Snapshot> + Send>>;

/// Handle to one live collection subscription
///
/// The first `next()` returns the state captured when the subscription
/// was opened; later calls await broadcast deliveries. `unsubscribe` is
/// idempotent and guarantees no further deliveries.
pub struct Subscription {
    collection: String,
    filter: Option<FilterExpr>,
    order: Option<OrderExpr>,
    pending: Option<Snapshot>,
    rx: Option<broadcast::Receiver<Snapshot>>,
}

impl Subscription {
    pub(crate) fn new(
        collection: impl Into<String>,
        filter: Option<FilterExpr>,
        order: Option<OrderExpr>,
        initial: Snapshot,
        rx: broadcast::Receiver<Snapshot>,
    ) -> Self {
        Self {
            collection: collection.into(),
            filter,
            order,
            pending: Some(initial),
            rx: Some(rx),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn is_active(&self) -> bool {
        self.rx.is_some()
    }

    /// Release the subscription; safe to call more than once
    pub fn unsubscribe(&mut self) {
        if self.rx.take().is_some() {
            tracing::debug!(collection = %self.collection, "subscription released");
        }
        self.pending = None;
    }

    /// Await the next snapshot delivery
    ///
    /// Returns `None` once unsubscribed or when the store side is gone.
    /// A lagged receiver skips ahead to the most recent delivery, which
    /// is safe because each snapshot is a full replacement.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if let Some(initial) = self.pending.take() {
            return Some(self.shape(initial));
        }

        loop {
            let received = match self.rx.as_mut() {
                Some(rx) => rx.recv().await,
                None => return None,
            };

            match received {
                Ok(snapshot) => return Some(self.shape(snapshot)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(
                        collection = %self.collection,
                        skipped,
                        "subscription lagged; catching up to latest snapshot"
                    );
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.rx = None;
                    return None;
                }
            }
        }
    }

    /// Convert into a stream, for merging with other subscriptions
    pub fn into_stream(mut self) -> SnapshotStream {
        Box::pin(async_stream::stream! {
            while let Some(snapshot) = self.next().await {
                yield snapshot;
            }
        })
    }

    /// Apply the subscription's filter and order to a delivered snapshot
    fn shape(&self, mut snapshot: Snapshot) -> Snapshot {
        if let Some(filter) = &self.filter {
            snapshot.records = apply_filter(snapshot.records, filter);
        }
        if let Some(order) = &self.order {
            apply_order(&mut snapshot.records, order);
        }
        snapshot
    }
}
