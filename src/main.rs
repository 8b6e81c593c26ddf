// Waypoint - Travel back-office maintenance toolkit
// Copyright (c) 2025 Waypoint Contributors
// Licensed under the MIT License

use clap::Parser;
use std::process;
use waypoint::cli::commands::{CommandContext, EXIT_FAILURE};
use waypoint::cli::{Cli, Commands};
use waypoint::config::{load_config, LoggingConfig};
use waypoint::logging::init_logging;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging only when the config asks for it; config errors are
    // reported by the command itself
    let logging_config = load_config(&cli.config)
        .map(|config| config.logging)
        .unwrap_or_else(|_| LoggingConfig::default());
    let log_level = cli.log_level.as_deref().unwrap_or("info");
    let _guard = match init_logging(log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FAILURE);
        }
    };

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        "Waypoint - Travel back-office maintenance toolkit"
    );

    let ctx = CommandContext {
        config_path: cli.config.clone(),
        dry_run: cli.dry_run,
    };

    let exit_code = match execute_command(&cli, &ctx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FAILURE
        }
    };

    // Flush file logs before exiting
    drop(_guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, ctx: &CommandContext) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::CheckEnv(args) => args.execute().await,
        Commands::PingDb(args) => args.execute(ctx).await,
        Commands::Packages(args) => args.execute(ctx).await,
        Commands::Users(args) => args.execute(ctx).await,
        Commands::ApproveAdmins(args) => args.execute(ctx).await,
        Commands::ApproveUser(args) => args.execute(ctx).await,
        Commands::PatchRecord(args) => args.execute(ctx).await,
        Commands::EnrichQuote(args) => args.execute(ctx).await,
        Commands::ProbeContract(args) => args.execute(ctx).await,
        Commands::ProbeApi(args) => args.execute(ctx).await,
        Commands::VerifyMail(args) => args.execute(ctx).await,
        Commands::SendTestEmail(args) => args.execute(ctx).await,
        Commands::NotifyApproved(args) => args.execute(ctx).await,
        Commands::ValidateConfig(args) => args.execute(ctx).await,
        Commands::Init(args) => args.execute().await,
    }
}
