// File: crewdeck-sync/src/sqlite.rs
// Purpose: SQLite-backed gateway with one JSON document table

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tokio::sync::{broadcast, RwLock};

use crewdeck::{
    fields_from_json, fields_to_json, Config, FieldValue, Record, RecordId, Snapshot, StoreError,
};

use crate::gateway::{FilterExpr, Gateway, OrderExpr};
use crate::subscription::Subscription;

/// SQLite-backed gateway
///
/// All collections share one `documents` table holding the field map as
/// JSON text. Row order (created_at, then id) is the store order that
/// snapshots are delivered in. Broadcast discipline matches the memory
/// backend: every successful mutation re-reads the collection and fans
/// out a full snapshot.
pub struct SqliteGateway {
    pool: SqlitePool,
    capacity: usize,
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<Snapshot>>>>,
    versions: Arc<RwLock<HashMap<String, u64>>>,
}

impl SqliteGateway {
    /// Connect to a SQLite database and prepare the document table
    ///
    /// A single pooled connection: SQLite has one writer anyway, and
    /// `sqlite::memory:` databases are per-connection.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(StoreError::backend)?;
        Self::with_pool(pool, 1000).await
    }

    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&config.store.url)
            .await
            .map_err(StoreError::backend)?;
        Self::with_pool(pool, config.sync.channel_capacity).await
    }

    pub async fn with_pool(pool: SqlitePool, capacity: usize) -> Result<Self, StoreError> {
        Self::init_table(&pool).await?;
        tracing::info!("sqlite gateway ready");

        Ok(Self {
            pool,
            capacity,
            channels: Arc::new(RwLock::new(HashMap::new())),
            versions: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    async fn init_table(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                collection TEXT NOT NULL,
                fields TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(StoreError::backend)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_documents_collection
            ON documents(collection)
            "#,
        )
        .execute(pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }

    /// Read a collection's full current state in store order
    async fn load_records(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, fields FROM documents
            WHERE collection = ?
            ORDER BY created_at, id
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        let records = rows
            .iter()
            .map(|row| {
                let id: String = row.get("id");
                let fields_text: String = row.get("fields");
                let fields = serde_json::from_str(&fields_text)
                    .map(|json| fields_from_json(&json))
                    .unwrap_or_default();
                Record::new(RecordId::from(id), fields)
            })
            .collect();

        Ok(records)
    }

    /// Re-read the collection and fan out a fresh snapshot
    async fn publish(&self, collection: &str) -> Result<(), StoreError> {
        let records = self.load_records(collection).await?;

        let version = {
            let mut versions = self.versions.write().await;
            let version = versions.entry(collection.to_string()).or_insert(0);
            *version += 1;
            *version
        };

        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(collection) {
            let _ = tx.send(Snapshot {
                collection: collection.to_string(),
                version,
                records,
            });
        }

        Ok(())
    }

    fn encode_fields(fields: &BTreeMap<String, FieldValue>) -> Result<String, StoreError> {
        serde_json::to_string(&fields_to_json(fields)).map_err(StoreError::backend)
    }
}

#[async_trait]
impl Gateway for SqliteGateway {
    async fn subscribe(
        &self,
        collection: &str,
        filter: Option<FilterExpr>,
        order: Option<OrderExpr>,
    ) -> Result<Subscription, StoreError> {
        let rx = {
            let mut channels = self.channels.write().await;
            let tx = channels
                .entry(collection.to_string())
                .or_insert_with(|| broadcast::channel(self.capacity).0);
            tx.subscribe()
        };

        let records = self.load_records(collection).await?;
        let version = *self.versions.read().await.get(collection).unwrap_or(&0);
        let initial = Snapshot {
            collection: collection.to_string(),
            version,
            records,
        };
        tracing::debug!(collection, "subscription opened");

        Ok(Subscription::new(collection, filter, order, initial, rx))
    }

    async fn create(
        &self,
        collection: &str,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<RecordId, StoreError> {
        let id = RecordId::new();
        let encoded = Self::encode_fields(&fields)?;

        sqlx::query("INSERT INTO documents (id, collection, fields) VALUES (?, ?, ?)")
            .bind(id.as_str())
            .bind(collection)
            .bind(&encoded)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        self.publish(collection).await?;
        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<(), StoreError> {
        let row = sqlx::query("SELECT fields FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?
            .ok_or_else(|| StoreError::not_found(collection, id.as_str()))?;

        // Merge into the stored fields so absent fields are left untouched
        let stored: String = row.get("fields");
        let mut merged = serde_json::from_str(&stored)
            .map(|json| fields_from_json(&json))
            .unwrap_or_default();
        merged.extend(fields);

        let encoded = Self::encode_fields(&merged)?;
        sqlx::query("UPDATE documents SET fields = ? WHERE collection = ? AND id = ?")
            .bind(&encoded)
            .bind(collection)
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        self.publish(collection).await
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        // Deleting an absent identifier is a no-op, and publishes nothing
        if result.rows_affected() > 0 {
            self.publish(collection).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn gateway() -> SqliteGateway {
        SqliteGateway::connect("sqlite::memory:").await.unwrap()
    }

    fn title_fields(title: &str) -> BTreeMap<String, FieldValue> {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), FieldValue::Text(title.into()));
        fields
    }

    #[tokio::test]
    async fn test_create_and_load() {
        let gateway = gateway().await;
        let id = gateway.create("tasks", title_fields("Design")).await.unwrap();

        let mut sub = gateway.subscribe("tasks", None, None).await.unwrap();
        let snapshot = sub.next().await.unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get(&id).unwrap().text("title"), "Design");
    }

    #[tokio::test]
    async fn test_subscription_sees_mutations() {
        let gateway = gateway().await;
        let mut sub = gateway.subscribe("todo_items", None, None).await.unwrap();
        assert!(sub.next().await.unwrap().is_empty());

        let id = gateway.create("todo_items", title_fields("buy milk")).await.unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 1);

        gateway.delete("todo_items", &id).await.unwrap();
        assert!(sub.next().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_and_preserves_other_fields() {
        let gateway = gateway().await;

        let mut fields = title_fields("Design");
        fields.insert("status".to_string(), FieldValue::Text("Pending".into()));
        let id = gateway.create("tasks", fields).await.unwrap();

        let mut partial = BTreeMap::new();
        partial.insert("status".to_string(), FieldValue::Text("Completed".into()));
        gateway.update("tasks", &id, partial).await.unwrap();

        let records = gateway.load_records("tasks").await.unwrap();
        assert_eq!(records[0].text("title"), "Design");
        assert_eq!(records[0].text("status"), "Completed");
    }

    #[tokio::test]
    async fn test_update_unknown_id_fails() {
        let gateway = gateway().await;
        let err = gateway
            .update("tasks", &RecordId::from("missing"), title_fields("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_absent_id_is_noop() {
        let gateway = gateway().await;
        assert!(gateway.delete("tasks", &RecordId::from("missing")).await.is_ok());
    }

    #[tokio::test]
    async fn test_documents_persist_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}/documents.db?mode=rwc", dir.path().display());

        let id = {
            let gateway = SqliteGateway::connect(&url).await.unwrap();
            gateway.create("tasks", title_fields("survives")).await.unwrap()
        };

        let reopened = SqliteGateway::connect(&url).await.unwrap();
        let records = reopened.load_records("tasks").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].text("title"), "survives");
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let gateway = gateway().await;
        gateway.create("tasks", title_fields("a task")).await.unwrap();
        gateway.create("todo_items", title_fields("an item")).await.unwrap();

        let tasks = gateway.load_records("tasks").await.unwrap();
        let todos = gateway.load_records("todo_items").await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(todos.len(), 1);
        assert_eq!(tasks[0].text("title"), "a task");
    }
}
