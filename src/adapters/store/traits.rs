//! Document store abstraction
//!
//! This module defines the trait that document store adapters implement.
//! Maintenance operations only ever see `&dyn DocumentStore`.

use super::query::{Filter, Update, UpdateOutcome};
use crate::domain::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Connection to the document store holding the application's records
///
/// Documents cross this boundary as normalised JSON (see
/// [`super::document::normalize`]). Implementations must make `close` safe
/// to call more than once.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;

    /// Name of the database the store is bound to
    fn database_name(&self) -> &str;

    /// Round trip to the server
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConnectionFailed` if the server cannot be reached.
    async fn ping(&self) -> Result<()>;

    /// Names of the collections in the database, sorted
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// Number of documents matching `filter`
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64>;

    /// Documents matching `filter`, in natural order, up to `limit`
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Value>>;

    /// First document matching `filter`
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>> {
        Ok(self
            .find(collection, filter, Some(1))
            .await?
            .into_iter()
            .next())
    }

    /// Insert a document, returning its `_id`
    ///
    /// A document without `_id` gets a generated one.
    async fn insert_one(&self, collection: &str, document: Value) -> Result<String>;

    /// Update the first matching document
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateOutcome>;

    /// Update every matching document
    ///
    /// A filter that matches nothing yields `matched == 0`; it is not an error.
    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateOutcome>;

    /// Delete the first matching document, returning the deleted count
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64>;

    /// Release the connection
    async fn close(&self) -> Result<()>;
}
