//! Init command implementation
//!
//! Writes a sample `waypoint.toml`. Secrets are referenced as `${VAR}`
//! placeholders so the file can be committed safely.

use super::{EXIT_FAILURE, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "waypoint.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Waypoint configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_FAILURE);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Put MONGODB_URI, SMTP_* and APP_BASE_URL in .env or the environment");
                println!("  3. Check the environment: waypoint check-env");
                println!("  4. Validate configuration: waypoint validate-config");
                println!("  5. Check connectivity: waypoint ping-db");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FAILURE)
            }
        }
    }

    /// Sample configuration content
    fn sample_config() -> String {
        r#"# Waypoint Configuration File
# Back-office maintenance toolkit
#
# Every value can also come from the environment; environment variables
# override the file.

[application]
log_level = "info"
# Report what repair commands would change without writing
dry_run = false

# ============================================================================
# Document store (MONGODB_URI, MONGODB_DB)
# ============================================================================
[database]
connection_string = "${MONGODB_URI}"
# database_name = "backoffice"    # defaults to the database in the URI
server_selection_timeout_seconds = 10

[database.collections]
users = "users"
packages = "packages"
quotes = "quotes"
events = "events"
contract_templates = "contracttemplates"
contract_signatures = "contractsignatures"

# ============================================================================
# Outbound mail (SMTP_HOST, SMTP_PORT, SMTP_USER, SMTP_PASS, SMTP_FROM)
# ============================================================================
[mail]
# host = "smtp.example.com"
port = 587                          # 465 uses implicit TLS, others STARTTLS
# username = "${SMTP_USER}"
# password = "${SMTP_PASS}"
# from = "Back Office <office@example.com>"
secure = true

# ============================================================================
# Back-office REST API (APP_BASE_URL, API_TOKEN)
# ============================================================================
[api]
base_url = "http://localhost:3000"
timeout_seconds = 30
# auth_token = "${API_TOKEN}"

# ============================================================================
# Default targets for repair commands
# ============================================================================
[targets]
admin_role = "admin"
# quote_id = "65a1f0c2e4b0a1b2c3d4e5f6"
# package_name = "Bali Escape"
# probe_user_id = "65a1f0c2e4b0a1b2c3d4e5f7"

# ============================================================================
# Logging
# ============================================================================
[logging]
local_enabled = false
local_path = "/var/log/waypoint"
local_rotation = "daily"            # daily or hourly
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_with;
    use std::collections::HashMap;

    #[test]
    fn test_sample_config_sections() {
        let config = InitArgs::sample_config();
        assert!(config.contains("[database]"));
        assert!(config.contains("[database.collections]"));
        assert!(config.contains("[mail]"));
        assert!(config.contains("[targets]"));
    }

    #[test]
    fn test_sample_config_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waypoint.toml");
        fs::write(&path, InitArgs::sample_config()).unwrap();

        let env: HashMap<&str, &str> =
            HashMap::from([("MONGODB_URI", "mongodb://localhost:27017/backoffice")]);
        let config = load_config_with(&path, |name| env.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.targets.admin_role, "admin");
        assert_eq!(config.database.collections.contract_templates, "contracttemplates");
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let args = InitArgs {
            output: file.path().to_string_lossy().into_owned(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_FAILURE);
    }
}
