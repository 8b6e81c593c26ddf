//! Environment variable check
//!
//! Reports which recognised variables are set, with secrets masked. The
//! lookup is injected so the check never depends on the process environment
//! in tests.

use crate::config::{mask_secret, schema::redact_connection_string};
use std::fmt;

/// How a variable's value is shown in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exposure {
    Plain,
    Secret,
    ConnectionString,
}

/// A recognised environment variable
#[derive(Debug, Clone, Copy)]
pub struct EnvVariable {
    pub name: &'static str,
    pub description: &'static str,
    pub exposure: Exposure,
}

pub const RECOGNISED_VARIABLES: &[EnvVariable] = &[
    EnvVariable {
        name: "MONGODB_URI",
        description: "document store connection string",
        exposure: Exposure::ConnectionString,
    },
    EnvVariable {
        name: "SMTP_HOST",
        description: "outbound mail host",
        exposure: Exposure::Plain,
    },
    EnvVariable {
        name: "SMTP_PORT",
        description: "outbound mail port",
        exposure: Exposure::Plain,
    },
    EnvVariable {
        name: "SMTP_USER",
        description: "outbound mail username",
        exposure: Exposure::Plain,
    },
    EnvVariable {
        name: "SMTP_PASS",
        description: "outbound mail password",
        exposure: Exposure::Secret,
    },
    EnvVariable {
        name: "SMTP_FROM",
        description: "sender identity",
        exposure: Exposure::Plain,
    },
    EnvVariable {
        name: "APP_BASE_URL",
        description: "application base URL",
        exposure: Exposure::Plain,
    },
    EnvVariable {
        name: "SESSION_SECRET",
        description: "session signing secret",
        exposure: Exposure::Secret,
    },
];

/// One line of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    pub name: &'static str,
    pub description: &'static str,
    /// Masked value, `None` when missing
    pub display_value: Option<String>,
}

impl EnvEntry {
    pub fn is_set(&self) -> bool {
        self.display_value.is_some()
    }
}

/// Result of checking the recognised variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvReport {
    pub entries: Vec<EnvEntry>,
}

impl EnvReport {
    /// Names of the variables that are unset or blank
    pub fn missing(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|entry| !entry.is_set())
            .map(|entry| entry.name)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(EnvEntry::is_set)
    }
}

impl fmt::Display for EnvReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Environment variables:")?;
        for entry in &self.entries {
            match &entry.display_value {
                Some(value) => writeln!(f, "  ✅ {} = {}", entry.name, value)?,
                None => writeln!(f, "  ❌ {} is not set ({})", entry.name, entry.description)?,
            }
        }
        let missing = self.missing();
        if missing.is_empty() {
            write!(f, "All {} variables are set", self.entries.len())
        } else {
            write!(f, "Missing: {}", missing.join(", "))
        }
    }
}

/// Check every recognised variable through `lookup`
///
/// A variable holding only whitespace counts as missing.
pub fn check_environment<F>(lookup: F) -> EnvReport
where
    F: Fn(&str) -> Option<String>,
{
    let entries = RECOGNISED_VARIABLES
        .iter()
        .map(|var| {
            let display_value = lookup(var.name)
                .filter(|value| !value.trim().is_empty())
                .map(|value| match var.exposure {
                    Exposure::Plain => value,
                    Exposure::Secret => mask_secret(&value),
                    Exposure::ConnectionString => redact_connection_string(&value),
                });
            EnvEntry {
                name: var.name,
                description: var.description,
                display_value,
            }
        })
        .collect();

    let report = EnvReport { entries };
    tracing::info!(
        total = report.entries.len(),
        missing = report.missing().len(),
        "Environment check completed"
    );
    report
}
