//! Connect, operate, report, close
//!
//! Every database-backed command runs inside a [`MaintenanceSession`]. The
//! session owns one store, runs exactly one operation against it and then
//! releases the connection, whether the operation succeeded or not.

use crate::adapters::store::{connect_store, DocumentStore};
use crate::config::DatabaseConfig;
use crate::domain::Result;
use std::future::Future;
use std::sync::Arc;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotConnected,
    Connected,
    OperationComplete,
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::NotConnected => "not-connected",
            SessionState::Connected => "connected",
            SessionState::OperationComplete => "operation-complete",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// One connection, one operation
pub struct MaintenanceSession {
    store: Arc<dyn DocumentStore>,
    state: SessionState,
}

impl MaintenanceSession {
    /// Connect to the configured database and prove the connection
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no connection string is set and a
    /// connection failure when the server cannot be reached. In the latter
    /// case the client has already been released.
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let store = connect_store(config).await?;
        Self::attach(store).await
    }

    /// Start a session on an existing store
    ///
    /// The store is pinged first; on failure it is closed before the error is
    /// returned.
    pub async fn attach(store: Arc<dyn DocumentStore>) -> Result<Self> {
        tracing::debug!(
            backend = store.backend_name(),
            state = %SessionState::NotConnected,
            "Opening maintenance session"
        );

        if let Err(e) = store.ping().await {
            tracing::error!(
                backend = store.backend_name(),
                database = store.database_name(),
                error = %e,
                "Connection check failed"
            );
            if let Err(close_err) = store.close().await {
                tracing::warn!(error = %close_err, "Failed to release connection after failed ping");
            }
            tracing::debug!(state = %SessionState::Closed, "Session closed");
            return Err(e);
        }

        let mut session = Self {
            store,
            state: SessionState::NotConnected,
        };
        session.transition(SessionState::Connected);
        tracing::info!(
            backend = session.store.backend_name(),
            database = session.store.database_name(),
            "Connected"
        );
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Run the operation, then close the store exactly once
    ///
    /// An operation error takes precedence over a close error. A close error
    /// alone is returned as the result.
    pub async fn run<T, F, Fut>(mut self, operation: F) -> Result<T>
    where
        F: FnOnce(Arc<dyn DocumentStore>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let result = operation(Arc::clone(&self.store)).await;
        match &result {
            Ok(_) => self.transition(SessionState::OperationComplete),
            Err(e) => tracing::error!(error = %e, "Operation failed"),
        }

        let closed = self.store.close().await;
        self.transition(SessionState::Closed);

        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(close_err)) => {
                tracing::error!(error = %close_err, "Failed to close connection");
                Err(close_err)
            }
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                tracing::warn!(error = %close_err, "Failed to close connection after operation error");
                Err(e)
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = %self.state, to = %next, "Session state change");
        self.state = next;
    }
}
