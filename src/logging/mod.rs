//! Logging and observability
//!
//! Structured logging via `tracing`, with optional JSON file output.
//!
//! # Example
//!
//! ```no_run
//! use waypoint::logging::init_logging;
//! use waypoint::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(collection = "users", "Inspecting collection");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a maintenance operation
///
/// # Example
///
/// ```no_run
/// use waypoint::log_operation_start;
///
/// log_operation_start!("approve-admins", "users");
/// ```
#[macro_export]
macro_rules! log_operation_start {
    ($operation:expr, $collection:expr) => {
        tracing::info!(
            operation = $operation,
            collection = $collection,
            "Starting operation"
        );
    };
}

/// Log the matched/modified counts of a write
///
/// # Example
///
/// ```no_run
/// use waypoint::log_write_outcome;
/// use waypoint::adapters::store::UpdateOutcome;
///
/// let outcome = UpdateOutcome { matched: 2, modified: 1 };
/// log_write_outcome!("approve-admins", "users", outcome);
/// ```
#[macro_export]
macro_rules! log_write_outcome {
    ($operation:expr, $collection:expr, $outcome:expr) => {
        tracing::info!(
            operation = $operation,
            collection = $collection,
            matched = $outcome.matched,
            modified = $outcome.modified,
            "Write completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use waypoint::log_error_with_context;
/// use waypoint::domain::WaypointError;
///
/// let error = WaypointError::Configuration("MONGODB_URI is not set".to_string());
/// log_error_with_context!(&error, "Failed to open session");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
