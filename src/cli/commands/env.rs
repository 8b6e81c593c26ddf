//! Check env command implementation

use super::{EXIT_FAILURE, EXIT_OK};
use crate::core::env_check::check_environment;
use clap::Args;

/// Arguments for the check-env command
#[derive(Args, Debug)]
pub struct CheckEnvArgs {}

impl CheckEnvArgs {
    /// Execute the check-env command
    ///
    /// Reads the process environment, which includes anything loaded from
    /// `.env` at startup.
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!("Checking environment variables");

        let report = check_environment(|name| std::env::var(name).ok());
        println!("{report}");

        if report.is_complete() {
            Ok(EXIT_OK)
        } else {
            tracing::error!(missing = ?report.missing(), "Required environment variables are missing");
            Ok(EXIT_FAILURE)
        }
    }
}
