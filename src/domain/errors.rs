//! Domain error types
//!
//! This module defines the error hierarchy for Waypoint. Adapter errors are
//! flattened into domain variants so third-party driver types never leak
//! past the adapter boundary.

use thiserror::Error;

/// Main Waypoint error type
///
/// This is the primary error type used throughout the application.
/// It wraps the adapter-specific error types and carries context for
/// operator-facing reporting.
#[derive(Debug, Error)]
pub enum WaypointError {
    /// Configuration-related errors (missing connection string, bad values)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Document store errors
    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    /// Outbound mail errors
    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    /// Application API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl WaypointError {
    /// Whether the error happened while acquiring a connection
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            WaypointError::Store(StoreError::ConnectionFailed(_))
                | WaypointError::Api(ApiError::ConnectionFailed(_))
                | WaypointError::Mail(MailError::Transport { .. })
        )
    }
}

/// Document store errors
///
/// These errors don't expose driver types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect or the ping round trip failed
    #[error("Failed to connect to document store: {0}")]
    ConnectionFailed(String),

    /// Read query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Insert failed
    #[error("Failed to insert document: {0}")]
    InsertFailed(String),

    /// Update failed
    #[error("Failed to update document: {0}")]
    UpdateFailed(String),

    /// Delete failed
    #[error("Failed to delete document: {0}")]
    DeleteFailed(String),

    /// A stored document could not be converted
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The store was used after `close()`
    #[error("Document store connection is closed")]
    Closed,
}

/// Outbound mail errors
#[derive(Debug, Error)]
pub enum MailError {
    /// `[mail]` is incomplete
    #[error("Mail transport not configured: {0}")]
    NotConfigured(String),

    /// The recipient or sender address could not be parsed
    #[error("Invalid email address '{address}': {message}")]
    InvalidAddress { address: String, message: String },

    /// The MIME message could not be assembled
    #[error("Email build error: {0}")]
    Build(String),

    /// SMTP transport-level failure, with the server reply code when one was received
    #[error("SMTP transport error{}: {message}", code.as_ref().map(|c| format!(" (code {c})")).unwrap_or_default())]
    Transport {
        message: String,
        code: Option<String>,
    },
}

/// Application REST API errors
///
/// Non-2xx responses are not errors; they are reported by the probe.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Base URL or path could not be joined into a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to reach the server
    #[error("Failed to connect to API: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl From<std::io::Error> for WaypointError {
    fn from(err: std::io::Error) -> Self {
        WaypointError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for WaypointError {
    fn from(err: serde_json::Error) -> Self {
        WaypointError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for WaypointError {
    fn from(err: toml::de::Error) -> Self {
        WaypointError::Configuration(format!("TOML parse error: {err}"))
    }
}
