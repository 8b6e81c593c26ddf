//! Probe commands: probe-contract, probe-api

use super::{report_failure, CommandContext, EXIT_FAILURE, EXIT_OK};
use crate::adapters::api::ApiClient;
use crate::core::api_probe::{parse_request_body, probe_api};
use crate::core::contracts::probe_contract_save;
use crate::core::session::MaintenanceSession;
use crate::domain::WaypointError;
use clap::Args;

/// Arguments for the probe-contract command
#[derive(Args, Debug)]
pub struct ProbeContractArgs {
    /// User id recorded on the probe signature (defaults to targets.probe_user_id)
    #[arg(long)]
    pub user_id: Option<String>,
}

impl ProbeContractArgs {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        let config = match ctx.load() {
            Ok(config) => config,
            Err(e) => return Ok(report_failure("Failed to load configuration", &e)),
        };
        if config.application.dry_run {
            let err = WaypointError::Validation(
                "probe-contract writes and deletes records and cannot run with --dry-run"
                    .to_string(),
            );
            return Ok(report_failure("Refusing to probe in dry-run mode", &err));
        }

        let session = match MaintenanceSession::open(&config.database).await {
            Ok(session) => session,
            Err(e) => return Ok(report_failure("Failed to connect to database", &e)),
        };

        let user_id = self
            .user_id
            .clone()
            .or_else(|| config.targets.probe_user_id.clone());
        let collections = config.database.collections.clone();
        let result = session
            .run(|store| async move {
                probe_contract_save(store.as_ref(), &collections, user_id.as_deref(), false).await
            })
            .await;

        match result {
            Ok(report) => {
                println!("{report}");
                if report.succeeded() {
                    Ok(EXIT_OK)
                } else {
                    Ok(EXIT_FAILURE)
                }
            }
            Err(e) => Ok(report_failure("Contract probe failed", &e)),
        }
    }
}

/// Arguments for the probe-api command
#[derive(Args, Debug)]
pub struct ProbeApiArgs {
    /// HTTP method
    #[arg(long, default_value = "GET")]
    pub method: String,

    /// Path appended to api.base_url, e.g. /api/quotes
    #[arg(long)]
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub body: Option<String>,

    /// Bearer token (overrides api.auth_token)
    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl ProbeApiArgs {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        let config = match ctx.load() {
            Ok(config) => config,
            Err(e) => return Ok(report_failure("Failed to load configuration", &e)),
        };

        let body = match self.body.as_deref().map(parse_request_body).transpose() {
            Ok(body) => body,
            Err(e) => return Ok(report_failure("Invalid request body", &e)),
        };

        let client = match ApiClient::new(&config.api) {
            Ok(client) => client.with_token(self.token.clone()),
            Err(e) => return Ok(report_failure("Invalid API configuration", &e)),
        };

        println!("🌐 Probing {}", client.base_url());
        match probe_api(&client, &self.method, &self.path, body.as_ref()).await {
            Ok(report) => {
                println!("{report}");
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("API request failed", &e)),
        }
    }
}
