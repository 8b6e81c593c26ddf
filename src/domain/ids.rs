//! Record identifier type with validation
//!
//! Records owned by the back-office application are keyed by MongoDB
//! ObjectIds, but older documents and test fixtures may carry plain string
//! ids. [`RecordId`] keeps the id as text and knows which form it has.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record identifier newtype wrapper
///
/// # Examples
///
/// ```
/// use waypoint::domain::ids::RecordId;
///
/// let id = RecordId::new("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
/// assert!(id.is_object_id());
///
/// let legacy = RecordId::new("quote-2024-0017").unwrap();
/// assert!(!legacy.is_object_id());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a new RecordId, rejecting blank input
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Record ID cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id is a 24 character hex ObjectId
    pub fn is_object_id(&self) -> bool {
        self.0.len() == 24 && self.0.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
