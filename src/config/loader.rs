//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::WaypointConfig;
use super::secret::secret_string;
use crate::domain::errors::WaypointError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file, falling back to defaults
///
/// This function:
/// 1. Reads the TOML file if it exists (a missing file is not an error)
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into WaypointConfig
/// 4. Applies the application's environment variables as overrides
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - The file exists but cannot be read
/// - TOML parsing fails
/// - A `${VAR}` placeholder references an unset variable
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use waypoint::config::loader::load_config;
///
/// let config = load_config("waypoint.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<WaypointConfig> {
    load_config_with(path, |name| std::env::var(name).ok())
}

/// Loads configuration using an explicit environment lookup
///
/// [`load_config`] passes `std::env::var`; tests pass a map.
pub fn load_config_with<F>(path: impl AsRef<Path>, lookup: F) -> Result<WaypointConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let path = path.as_ref();

    let mut config = if path.exists() {
        let contents = fs::read_to_string(path).map_err(|e| {
            WaypointError::Configuration(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        let contents = substitute_env_vars(&contents, &lookup)?;

        toml::from_str::<WaypointConfig>(&contents)
            .map_err(|e| WaypointError::Configuration(format!("Failed to parse TOML: {e}")))?
    } else {
        tracing::debug!(path = %path.display(), "Configuration file not found, using environment only");
        WaypointConfig::default()
    };

    apply_env_overrides(&mut config, &lookup)?;

    config.validate().map_err(|e| {
        WaypointError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied verbatim.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars<F>(input: &str, lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let re = placeholder_regex();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match lookup(var_name) {
                Some(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                None => {
                    if !missing_vars.iter().any(|m| m == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(WaypointError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// First non-blank value among the given variable names
fn first_set<F>(lookup: &F, names: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
}

/// Parses a boolean environment value
///
/// # Errors
///
/// Returns a configuration error for anything but true/false, 1/0, yes/no
/// or on/off, so a typo never silently flips a safety switch.
fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(WaypointError::Configuration(format!(
            "{name} must be true/false, 1/0, yes/no or on/off, got '{value}'"
        ))),
    }
}

/// Applies the application's environment variables as overrides
///
/// These are the same variables the back-office application reads, so a
/// shell that runs the application can run Waypoint unchanged.
///
/// # Errors
///
/// Returns a configuration error when a boolean variable does not parse
fn apply_env_overrides<F>(config: &mut WaypointConfig, lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = first_set(lookup, &["WAYPOINT_LOG_LEVEL"]) {
        config.application.log_level = val.to_lowercase();
    }
    if let Some(val) = first_set(lookup, &["WAYPOINT_DRY_RUN"]) {
        config.application.dry_run = parse_flag("WAYPOINT_DRY_RUN", &val)?;
    }

    // Document store
    if let Some(val) = first_set(lookup, &["MONGODB_URI", "MONGO_URI"]) {
        config.database.connection_string = Some(secret_string(val));
    }
    if let Some(val) = first_set(lookup, &["MONGODB_DB"]) {
        config.database.database_name = Some(val);
    }

    // Mail transport
    if let Some(val) = first_set(lookup, &["SMTP_HOST"]) {
        config.mail.host = Some(val);
    }
    if let Some(val) = first_set(lookup, &["SMTP_PORT"]) {
        match val.parse() {
            Ok(port) => config.mail.port = port,
            Err(_) => tracing::warn!(value = %val, "Ignoring unparsable SMTP_PORT"),
        }
    }
    if let Some(val) = first_set(lookup, &["SMTP_USER"]) {
        config.mail.username = Some(val);
    }
    if let Some(val) = first_set(lookup, &["SMTP_PASS", "SMTP_PASSWORD"]) {
        config.mail.password = Some(secret_string(val));
    }
    if let Some(val) = first_set(lookup, &["SMTP_FROM", "EMAIL_FROM"]) {
        config.mail.from = Some(val);
    }
    if let Some(val) = first_set(lookup, &["SMTP_SECURE"]) {
        config.mail.secure = parse_flag("SMTP_SECURE", &val)?;
    }

    // Application API
    if let Some(val) = first_set(lookup, &["APP_BASE_URL"]) {
        config.api.base_url = val.trim_end_matches('/').to_string();
    }
    if let Some(val) = first_set(lookup, &["API_TOKEN"]) {
        config.api.auth_token = Some(secret_string(val));
    }
    Ok(())
}
