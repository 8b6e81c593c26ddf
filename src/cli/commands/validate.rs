//! Validate config command implementation
//!
//! Loads the effective configuration (file, `${VAR}` substitution and
//! environment overrides) and prints a summary with secrets masked.

use super::{CommandContext, EXIT_FAILURE, EXIT_OK};
use crate::config::{load_config, mask_secret, WaypointConfig};
use crate::domain::records::display_or_dash;
use clap::Args;
use secrecy::ExposeSecret;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        let config_path = ctx.config_path.as_str();
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration: {config_path}");
        if !Path::new(config_path).exists() {
            println!("   (file not found; using defaults and environment variables)");
        }
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration loaded and valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_FAILURE);
            }
        };

        println!();
        print_summary(&config);
        Ok(EXIT_OK)
    }
}

fn print_summary(config: &WaypointConfig) {
    let collections = &config.database.collections;
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Dry Run: {}", config.application.dry_run);
    println!(
        "  MongoDB: {}",
        config
            .database
            .connection_string
            .as_ref()
            .map(|_| config.database.redacted_connection_string())
            .unwrap_or_else(|| "not set".to_string())
    );
    println!(
        "  Database: {}",
        config
            .database
            .database_name
            .as_deref()
            .unwrap_or("(from connection string)")
    );
    println!(
        "  Collections: users={}, packages={}, quotes={}, events={}, templates={}, signatures={}",
        collections.users,
        collections.packages,
        collections.quotes,
        collections.events,
        collections.contract_templates,
        collections.contract_signatures
    );
    println!(
        "  SMTP: {}:{} (secure: {})",
        display_or_dash(&config.mail.host),
        config.mail.port,
        config.mail.secure
    );
    println!("  SMTP User: {}", display_or_dash(&config.mail.username));
    println!(
        "  SMTP Password: {}",
        config
            .mail
            .password
            .as_ref()
            .map(|p| mask_secret(p.expose_secret().as_str()))
            .unwrap_or_else(|| "not set".to_string())
    );
    println!("  Sender: {}", display_or_dash(&config.mail.from));
    println!("  API Base URL: {}", config.api.base_url);
    println!(
        "  API Token: {}",
        if config.api.auth_token.is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!("  Admin Role: {}", config.targets.admin_role);
    println!("  Quote Target: {}", display_or_dash(&config.targets.quote_id));
    println!(
        "  Package Target: {}",
        display_or_dash(&config.targets.package_name)
    );
    println!(
        "  File Logging: {}",
        if config.logging.local_enabled {
            config.logging.local_path.as_str()
        } else {
            "disabled"
        }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_invalid_file_exits_with_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbase_url = \"ftp://example.com\"").unwrap();
        let ctx = CommandContext {
            config_path: file.path().to_string_lossy().into_owned(),
            dry_run: false,
        };
        assert_eq!(ValidateArgs {}.execute(&ctx).await.unwrap(), EXIT_FAILURE);
    }
}
