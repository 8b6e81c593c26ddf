//! CLI interface and argument parsing
//!
//! One subcommand per maintenance task, parsed with clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Waypoint - travel back-office maintenance toolkit
#[derive(Parser, Debug)]
#[command(name = "waypoint")]
#[command(version, about, long_about = None)]
#[command(author = "Waypoint Contributors")]
pub struct Cli {
    /// Path to configuration file (optional; environment variables are enough)
    #[arg(short, long, default_value = "waypoint.toml", env = "WAYPOINT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "WAYPOINT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Report what repair commands would change without writing
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the recognised environment variables are set
    CheckEnv(commands::env::CheckEnvArgs),

    /// Connect to the database and list collections with counts
    PingDb(commands::inspect::PingDbArgs),

    /// Inspect the package collection
    Packages(commands::inspect::PackagesArgs),

    /// List users, optionally by role
    Users(commands::inspect::UsersArgs),

    /// Approve every admin user that is not approved yet
    ApproveAdmins(commands::repair::ApproveAdminsArgs),

    /// Approve one user by email
    ApproveUser(commands::repair::ApproveUserArgs),

    /// Set fields on one document by id
    PatchRecord(commands::repair::PatchRecordArgs),

    /// Add active events to a quote's selected events
    EnrichQuote(commands::repair::EnrichQuoteArgs),

    /// Save and delete a transient contract template and signature
    ProbeContract(commands::probe::ProbeContractArgs),

    /// Call one back-office API endpoint and print the response
    ProbeApi(commands::probe::ProbeApiArgs),

    /// Check that the SMTP server accepts a connection
    VerifyMail(commands::mail::VerifyMailArgs),

    /// Send a test email
    SendTestEmail(commands::mail::SendTestEmailArgs),

    /// Resend the "account approved" notification to a user
    NotifyApproved(commands::mail::NotifyApprovedArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_ping_db() {
        let cli = Cli::parse_from(["waypoint", "ping-db"]);
        assert_eq!(cli.config, "waypoint.toml");
        assert!(!cli.dry_run);
        assert!(matches!(cli.command, Commands::PingDb(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["waypoint", "--config", "custom.toml", "check-env"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["waypoint", "--log-level", "debug", "users"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_dry_run_after_subcommand() {
        let cli = Cli::parse_from(["waypoint", "approve-admins", "--dry-run"]);
        assert!(cli.dry_run);
    }

    #[test]
    fn test_cli_parse_patch_record() {
        let cli = Cli::parse_from([
            "waypoint",
            "patch-record",
            "--collection",
            "quotes",
            "--id",
            "65a1f0c2e4b0a1b2c3d4e5f6",
            "--set",
            "status=sent",
            "--set",
            "total=990",
        ]);
        match cli.command {
            Commands::PatchRecord(args) => {
                assert_eq!(args.collection, "quotes");
                assert_eq!(args.set.len(), 2);
                assert_eq!(args.set[1].value, serde_json::json!(990));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_patch_record_rejects_bad_assignment() {
        let result = Cli::try_parse_from([
            "waypoint",
            "patch-record",
            "--collection",
            "quotes",
            "--id",
            "q1",
            "--set",
            "no-separator",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_probe_api() {
        let cli = Cli::parse_from([
            "waypoint",
            "probe-api",
            "--method",
            "post",
            "--path",
            "/api/quotes",
            "--body",
            r#"{"leadName":"Ana"}"#,
        ]);
        match cli.command {
            Commands::ProbeApi(args) => {
                assert_eq!(args.method, "post");
                assert_eq!(args.path, "/api/quotes");
                assert!(args.body.is_some());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_send_test_email_requires_recipient() {
        assert!(Cli::try_parse_from(["waypoint", "send-test-email"]).is_err());
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["waypoint", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
