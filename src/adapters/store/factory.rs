//! Document store factory

use super::traits::DocumentStore;
use crate::adapters::mongodb::MongoStore;
use crate::config::DatabaseConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the document store described by the configuration
///
/// The returned store has not been pinged yet; see
/// [`crate::core::session::MaintenanceSession::open`].
///
/// # Errors
///
/// Returns an error if the connection string is missing or malformed.
pub async fn connect_store(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>> {
    tracing::info!("Creating MongoDB document store");
    let store = MongoStore::connect(config).await?;
    Ok(Arc::new(store) as Arc<dyn DocumentStore>)
}
