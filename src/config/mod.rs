//! Configuration management for Waypoint.
//!
//! Waypoint reads an optional TOML file, substitutes `${VAR_NAME}`
//! placeholders, then layers the back-office application's own environment
//! variables (`MONGODB_URI`, `SMTP_*`, `APP_BASE_URL`, ...) on top. Running
//! with no file at all is supported; each command checks for the settings it
//! needs when it runs.
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level and dry-run mode
//! - [`DatabaseConfig`] - connection string, database and collection names
//! - [`MailConfig`] - SMTP transport and sender identity
//! - [`ApiConfig`] - application base URL and probe token
//! - [`TargetsConfig`] - identifiers the repair commands act on
//! - [`LoggingConfig`] - optional JSON file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [database]
//! connection_string = "${MONGODB_URI}"
//! database_name = "agency"
//!
//! [mail]
//! host = "smtp.example.com"
//! port = 587
//! username = "mailer"
//! password = "${SMTP_PASS}"
//! from = "Bookings <bookings@example.com>"
//!
//! [targets]
//! quote_id = "65a1f0c2e4b0a1b2c3d4e5f6"
//! admin_role = "admin"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_with};
pub use schema::{
    ApiConfig, ApplicationConfig, CollectionNames, DatabaseConfig, LoggingConfig, MailConfig,
    TargetsConfig, WaypointConfig,
};
pub use secret::{mask_secret, secret_string, secret_string_opt, SecretString, SecretValue};
