//! Record views over the back-office application's documents
//!
//! The application owns these schemas; Waypoint only reads the fields its
//! maintenance operations need. Every optional field defaults so partially
//! populated documents still decode, and unknown fields are ignored. Fields
//! are read leniently: a `null` or wrongly typed value becomes the default
//! instead of failing the whole document.

use super::errors::{StoreError, WaypointError};
use super::ids::RecordId;
use super::result::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Registered user of the back office
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", deserialize_with = "lenient::record_id")]
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_approved: bool,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: Option<String>,
}

/// Travel package / offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(rename = "_id", deserialize_with = "lenient::record_id")]
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub created_at: Option<String>,
}

/// Customer quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(rename = "_id", deserialize_with = "lenient::record_id")]
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient::text")]
    pub lead_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub selected_events: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub updated_at: Option<String>,
}

impl Quote {
    /// Event ids already referenced by `selectedEvents`
    ///
    /// Entries may reference their event as `eventId`, `event` or `_id`
    /// depending on which version of the application wrote them.
    pub fn selected_event_ids(&self) -> Vec<String> {
        self.selected_events
            .iter()
            .filter_map(|entry| {
                ["eventId", "event", "_id"]
                    .iter()
                    .find_map(|key| entry.get(*key))
                    .and_then(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Object(map) => map
                            .get("$oid")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        _ => None,
                    })
            })
            .collect()
    }
}

/// Bookable event used to enrich quotes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id", deserialize_with = "lenient::record_id")]
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

/// Contract template created by the probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractTemplate {
    pub title: String,
    pub version: String,
    pub content: String,
    pub is_active: bool,
}

/// Contract signature created by the probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractSignature {
    pub template_id: String,
    pub user_id: String,
    pub signature: String,
    pub signature_type: String,
}

/// Field deserializers that never fail on a wrong type
///
/// The application's schema has drifted over time: flags stored as strings,
/// statuses stored as numbers, prices left `null`.
mod lenient {
    use super::{Deserialize, Deserializer, RecordId, Value};
    use serde::de::Error;

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => b,
            Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            _ => false,
        })
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64().unwrap_or_default(),
            Value::String(s) => s.trim().parse().unwrap_or_default(),
            _ => 0.0,
        })
    }

    pub fn list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items,
            _ => Vec::new(),
        })
    }

    /// String and numeric ids are accepted; anything else is a broken document
    pub fn record_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RecordId, D::Error> {
        let raw = match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            other => return Err(D::Error::custom(format!("unsupported _id {other}"))),
        };
        RecordId::new(raw).map_err(D::Error::custom)
    }
}

/// Decode a normalised store document into a record view
pub fn decode<T: DeserializeOwned>(document: Value) -> Result<T> {
    serde_json::from_value(document).map_err(|e| {
        WaypointError::Store(StoreError::InvalidDocument(format!(
            "{} ({e})",
            std::any::type_name::<T>()
                .rsplit("::")
                .next()
                .unwrap_or("record")
        )))
    })
}

/// Decode a list of documents, failing on the first bad one
pub fn decode_all<T: DeserializeOwned>(documents: Vec<Value>) -> Result<Vec<T>> {
    documents.into_iter().map(decode).collect()
}

/// Render an optional text field for console output
pub fn display_or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}
