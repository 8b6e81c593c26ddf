//! MongoDB document store
//!
//! Thin adapter over the official driver. Every driver error is mapped to a
//! [`StoreError`] so callers never see driver types.

use super::convert::{filter_document, from_document, id_to_string, to_document, update_document};
use crate::adapters::store::{DocumentStore, Filter, Update, UpdateOutcome};
use crate::config::DatabaseConfig;
use crate::domain::{Result, StoreError, WaypointError};
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Database used when neither the config nor the connection string names one
const FALLBACK_DATABASE: &str = "test";

pub struct MongoStore {
    client: Client,
    database: Database,
    closed: AtomicBool,
}

impl MongoStore {
    /// Build a client from the configured connection string
    ///
    /// The driver connects lazily; the first round trip happens in
    /// [`DocumentStore::ping`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the connection string is missing and
    /// `StoreError::ConnectionFailed` when the driver rejects it.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let uri = config.connection_string()?;

        let mut options = ClientOptions::parse(uri).await.map_err(|e| {
            WaypointError::Store(StoreError::ConnectionFailed(format!(
                "Invalid connection string: {e}"
            )))
        })?;
        options.app_name = Some("waypoint".to_string());
        options.server_selection_timeout = Some(Duration::from_secs(
            config.server_selection_timeout_seconds,
        ));

        let database_name = config
            .database_name
            .clone()
            .or_else(|| options.default_database.clone())
            .unwrap_or_else(|| FALLBACK_DATABASE.to_string());

        let client = Client::with_options(options).map_err(|e| {
            WaypointError::Store(StoreError::ConnectionFailed(format!(
                "Failed to create MongoDB client: {e}"
            )))
        })?;
        let database = client.database(&database_name);

        tracing::info!(
            target_host = %config.redacted_connection_string(),
            database = %database_name,
            "MongoDB client created"
        );

        Ok(Self {
            client,
            database,
            closed: AtomicBool::new(false),
        })
    }

    fn collection(&self, name: &str) -> Result<Collection<Document>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(WaypointError::Store(StoreError::Closed));
        }
        Ok(self.database.collection::<Document>(name))
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    fn database_name(&self) -> &str {
        self.database.name()
    }

    async fn ping(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(WaypointError::Store(StoreError::Closed));
        }
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| {
                tracing::error!(error = %e, labels = ?e.labels(), "MongoDB ping failed");
                WaypointError::Store(StoreError::ConnectionFailed(e.to_string()))
            })?;
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(WaypointError::Store(StoreError::Closed));
        }
        let mut names = self
            .database
            .list_collection_names()
            .await
            .map_err(|e| WaypointError::Store(StoreError::QueryFailed(e.to_string())))?;
        names.sort();
        Ok(names)
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        self.collection(collection)?
            .count_documents(filter_document(filter)?)
            .await
            .map_err(|e| WaypointError::Store(StoreError::QueryFailed(e.to_string())))
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Value>> {
        let coll = self.collection(collection)?;
        let mut action = coll.find(filter_document(filter)?);
        if let Some(limit) = limit {
            action = action.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        let cursor = action
            .await
            .map_err(|e| WaypointError::Store(StoreError::QueryFailed(e.to_string())))?;
        let documents: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| WaypointError::Store(StoreError::QueryFailed(e.to_string())))?;
        Ok(documents.into_iter().map(from_document).collect())
    }

    async fn insert_one(&self, collection: &str, document: Value) -> Result<String> {
        let result = self
            .collection(collection)?
            .insert_one(to_document(&document)?)
            .await
            .map_err(|e| WaypointError::Store(StoreError::InsertFailed(e.to_string())))?;
        Ok(id_to_string(&result.inserted_id))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateOutcome> {
        let result = self
            .collection(collection)?
            .update_one(filter_document(filter)?, update_document(update)?)
            .await
            .map_err(|e| WaypointError::Store(StoreError::UpdateFailed(e.to_string())))?;
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateOutcome> {
        let result = self
            .collection(collection)?
            .update_many(filter_document(filter)?, update_document(update)?)
            .await
            .map_err(|e| WaypointError::Store(StoreError::UpdateFailed(e.to_string())))?;
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let result = self
            .collection(collection)?
            .delete_one(filter_document(filter)?)
            .await
            .map_err(|e| WaypointError::Store(StoreError::DeleteFailed(e.to_string())))?;
        Ok(result.deleted_count)
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("MongoDB client already closed");
            return Ok(());
        }
        self.client.clone().shutdown().await;
        tracing::debug!("MongoDB client shut down");
        Ok(())
    }
}
