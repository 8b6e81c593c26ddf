//! CLI command implementations
//!
//! Every command returns its process exit code: 0 for a normal run
//! (including "not found" outcomes), 1 for configuration, connection and
//! operation failures.

pub mod env;
pub mod init;
pub mod inspect;
pub mod mail;
pub mod probe;
pub mod repair;
pub mod validate;

use crate::adapters::store::DocumentStore;
use crate::config::{load_config, WaypointConfig};
use crate::core::session::MaintenanceSession;
use crate::domain::{Result, WaypointError};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Options shared by every command
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config_path: String,
    pub dry_run: bool,
}

impl CommandContext {
    /// Load the configuration, folding `--dry-run` into `application.dry_run`
    pub fn load(&self) -> Result<WaypointConfig> {
        let mut config = load_config(&self.config_path)?;
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
        Ok(config)
    }
}

/// Print an error the way every command reports failures and return exit code 1
pub fn report_failure(context: &str, error: &WaypointError) -> i32 {
    crate::log_error_with_context!(error, context);
    println!("❌ {context}");
    println!("   Error: {error}");
    if error.is_connection_failure() {
        println!("   The remote server could not be reached or refused the connection.");
    }
    EXIT_FAILURE
}

/// Load config, open a session, run `operation`, print its report
pub async fn run_with_store<T, F, Fut>(ctx: &CommandContext, label: &str, operation: F) -> i32
where
    T: Display,
    F: FnOnce(WaypointConfig, Arc<dyn DocumentStore>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let config = match ctx.load() {
        Ok(config) => config,
        Err(e) => return report_failure("Failed to load configuration", &e),
    };

    let session = match MaintenanceSession::open(&config.database).await {
        Ok(session) => session,
        Err(e) => return report_failure("Failed to connect to database", &e),
    };

    match session.run(|store| operation(config, store)).await {
        Ok(report) => {
            println!("{report}");
            EXIT_OK
        }
        Err(e) => report_failure(&format!("{label} failed"), &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_failure_returns_one() {
        let err = WaypointError::Configuration("MONGODB_URI is not set".to_string());
        assert_eq!(report_failure("Failed to load configuration", &err), EXIT_FAILURE);
    }

    #[test]
    fn test_context_applies_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = CommandContext {
            config_path: dir
                .path()
                .join("absent.toml")
                .to_string_lossy()
                .into_owned(),
            dry_run: true,
        };
        let config = ctx.load().unwrap();
        assert!(config.application.dry_run);
    }
}
