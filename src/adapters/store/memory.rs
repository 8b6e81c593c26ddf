//! In-memory document store
//!
//! Backs the test-suite and local rehearsals of repair commands. Documents
//! are kept in the shape they were written and normalised on read, the same
//! contract the MongoDB adapter honours.

use super::document::{document_id, normalize};
use super::query::{Filter, Update, UpdateOutcome};
use super::traits::DocumentStore;
use crate::domain::{Result, StoreError, WaypointError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

pub struct MemoryStore {
    database: String,
    collections: Mutex<BTreeMap<String, Vec<Value>>>,
    close_calls: AtomicU64,
    closed: AtomicBool,
    unreachable: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl MemoryStore {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collections: Mutex::new(BTreeMap::new()),
            close_calls: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            unreachable: AtomicBool::new(false),
        }
    }

    /// Make `ping` fail as if the server were down
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Insert documents into a collection, creating it if needed
    pub async fn seed(&self, collection: &str, documents: Vec<Value>) {
        let mut collections = self.collections.lock().await;
        let docs = collections.entry(collection.to_string()).or_default();
        for mut document in documents {
            ensure_id(&mut document);
            docs.push(document);
        }
    }

    /// Normalised snapshot of a collection
    pub async fn documents(&self, collection: &str) -> Vec<Value> {
        self.collections
            .lock()
            .await
            .get(collection)
            .map(|docs| docs.iter().cloned().map(normalize).collect())
            .unwrap_or_default()
    }

    /// How many times `close` has been called
    pub fn close_calls(&self) -> u64 {
        self.close_calls.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(WaypointError::Store(StoreError::Closed));
        }
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
        many: bool,
    ) -> Result<UpdateOutcome> {
        self.ensure_open()?;
        let mut collections = self.collections.lock().await;
        let mut outcome = UpdateOutcome::default();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(outcome);
        };

        for document in docs.iter_mut() {
            if !filter.matches(&normalize(document.clone())) {
                continue;
            }
            outcome.matched += 1;
            if update
                .apply(document)
                .map_err(|e| WaypointError::Store(StoreError::UpdateFailed(e)))?
            {
                outcome.modified += 1;
            }
            if !many {
                break;
            }
        }
        Ok(outcome)
    }
}

/// Keep any `_id` already present; generate one only when missing
fn ensure_id(document: &mut Value) -> String {
    if let Some(existing) = document.get("_id") {
        return document_id(&normalize(document.clone())).unwrap_or_else(|| existing.to_string());
    }
    let id = uuid::Uuid::new_v4().simple().to_string();
    if let Some(object) = document.as_object_mut() {
        object.insert("_id".to_string(), Value::String(id.clone()));
    }
    id
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn database_name(&self) -> &str {
        &self.database
    }

    async fn ping(&self) -> Result<()> {
        self.ensure_open()?;
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(WaypointError::Store(StoreError::ConnectionFailed(
                "server selection timed out".to_string(),
            )));
        }
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        self.ensure_open()?;
        Ok(self.collections.lock().await.keys().cloned().collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        Ok(self.find(collection, filter, None).await?.len() as u64)
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Value>> {
        self.ensure_open()?;
        let collections = self.collections.lock().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .cloned()
            .map(normalize)
            .filter(|doc| filter.matches(doc))
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn insert_one(&self, collection: &str, mut document: Value) -> Result<String> {
        self.ensure_open()?;
        if !document.is_object() {
            return Err(WaypointError::Store(StoreError::InsertFailed(
                "document must be a JSON object".to_string(),
            )));
        }
        let id = ensure_id(&mut document);
        let mut collections = self.collections.lock().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs
            .iter()
            .any(|existing| document_id(&normalize(existing.clone())).as_deref() == Some(id.as_str()))
        {
            return Err(WaypointError::Store(StoreError::InsertFailed(format!(
                "duplicate key _id: {id}"
            ))));
        }
        docs.push(document);
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateOutcome> {
        self.update(collection, filter, update, false).await
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateOutcome> {
        self.update(collection, filter, update, true).await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64> {
        self.ensure_open()?;
        let mut collections = self.collections.lock().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs
            .iter()
            .position(|doc| filter.matches(&normalize(doc.clone())))
        {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn close(&self) -> Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_generates_id() {
        let store = MemoryStore::default();
        let id = store
            .insert_one("contracttemplates", json!({"title": "probe"}))
            .await
            .unwrap();
        assert_eq!(id.len(), 32);

        let found = store
            .find_one("contracttemplates", &Filter::id(id.clone()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["title"], "probe");
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_id() {
        let store = MemoryStore::default();
        store.seed("users", vec![json!({"_id": "u1"})]).await;
        let err = store
            .insert_one("users", json!({"_id": "u1"}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WaypointError::Store(StoreError::InsertFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_collection_is_noop() {
        let store = MemoryStore::default();
        let outcome = store
            .update_many("users", &Filter::All, &Update::new().set("x", 1))
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::default());
    }

    #[tokio::test]
    async fn test_update_one_stops_after_first_match() {
        let store = MemoryStore::default();
        store
            .seed("users", vec![json!({"role": "admin"}), json!({"role": "admin"})])
            .await;
        let outcome = store
            .update_one(
                "users",
                &Filter::eq("role", "admin"),
                &Update::new().set("isApproved", true),
            )
            .await
            .unwrap();
        assert_eq!(outcome.matched, 1);
        assert_eq!(
            store
                .count("users", &Filter::eq("isApproved", true))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_dates_are_normalised_on_read() {
        let store = MemoryStore::default();
        store
            .seed(
                "quotes",
                vec![json!({"_id": "q1", "updatedAt": {"$date": "2024-01-02T00:00:00.000Z"}})],
            )
            .await;
        let docs = store.documents("quotes").await;
        assert_eq!(docs[0]["updatedAt"], "2024-01-02T00:00:00.000Z");
    }

    #[tokio::test]
    async fn test_closed_store_rejects_operations() {
        let store = MemoryStore::default();
        store.close().await.unwrap();
        store.close().await.unwrap();
        assert_eq!(store.close_calls(), 2);
        assert!(matches!(
            store.ping().await,
            Err(WaypointError::Store(StoreError::Closed))
        ));
    }

    #[tokio::test]
    async fn test_list_collections_sorted() {
        let store = MemoryStore::default();
        store.seed("users", vec![]).await;
        store.seed("packages", vec![]).await;
        assert_eq!(
            store.list_collections().await.unwrap(),
            vec!["packages".to_string(), "users".to_string()]
        );
    }
}
