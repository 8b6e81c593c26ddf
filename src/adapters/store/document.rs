//! Document normalisation helpers shared by every store
//!
//! Stores hand documents to the rest of the crate as plain JSON: ObjectIds
//! and dates arrive as strings. Writes use the extended-JSON date shape so
//! the MongoDB adapter stores a real BSON date.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{json, Map, Value};

/// Extended-JSON date for `at`, the shape written into documents
pub fn timestamp(at: DateTime<Utc>) -> Value {
    json!({ "$date": at.to_rfc3339_opts(SecondsFormat::Millis, true) })
}

/// Extended-JSON date for the current time
pub fn now() -> Value {
    timestamp(Utc::now())
}

/// Replace extended-JSON wrappers with plain values, recursively
///
/// - `{"$oid": "..."}` becomes the hex string
/// - `{"$date": "..."}` and `{"$date": {"$numberLong": "..."}}` become RFC 3339 strings
/// - `{"$numberDecimal": "..."}` and `{"$numberLong": "..."}` become numbers when they parse
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => match unwrap_extended(&map) {
            Some(plain) => plain,
            None => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, normalize(value)))
                    .collect(),
            ),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        other => other,
    }
}

fn unwrap_extended(map: &Map<String, Value>) -> Option<Value> {
    if map.len() != 1 {
        return None;
    }
    let (key, inner) = map.iter().next()?;
    match (key.as_str(), inner) {
        ("$oid", Value::String(hex)) => Some(Value::String(hex.clone())),
        ("$date", Value::String(iso)) => Some(Value::String(iso.clone())),
        ("$date", Value::Object(_)) => {
            let millis: i64 = inner.get("$numberLong")?.as_str()?.parse().ok()?;
            let at = Utc.timestamp_millis_opt(millis).single()?;
            Some(Value::String(
                at.to_rfc3339_opts(SecondsFormat::Millis, true),
            ))
        }
        ("$numberLong", Value::String(raw)) => raw.parse::<i64>().ok().map(Value::from),
        ("$numberDecimal", Value::String(raw)) => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

/// The `_id` of a normalised document as text
pub fn document_id(document: &Value) -> Option<String> {
    match document.get("_id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_object_id_and_date() {
        let raw = json!({
            "_id": {"$oid": "65a1f0c2e4b0a1b2c3d4e5f6"},
            "createdAt": {"$date": "2024-03-01T09:30:00Z"},
            "selectedEvents": [{"event": {"$oid": "65a1f0c2e4b0a1b2c3d4e5f7"}}]
        });
        let doc = normalize(raw);
        assert_eq!(doc["_id"], "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(doc["createdAt"], "2024-03-01T09:30:00Z");
        assert_eq!(doc["selectedEvents"][0]["event"], "65a1f0c2e4b0a1b2c3d4e5f7");
    }

    #[test]
    fn test_normalize_canonical_date() {
        let doc = normalize(json!({"signedAt": {"$date": {"$numberLong": "0"}}}));
        assert_eq!(doc["signedAt"], "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_normalize_numbers() {
        let doc = normalize(json!({
            "price": {"$numberDecimal": "149.90"},
            "views": {"$numberLong": "12"}
        }));
        assert_eq!(doc["price"], json!(149.9));
        assert_eq!(doc["views"], json!(12));
    }

    #[test]
    fn test_normalize_leaves_ordinary_objects() {
        let raw = json!({"meta": {"$oid": "x", "extra": 1}});
        assert_eq!(normalize(raw.clone()), raw);
    }

    #[test]
    fn test_timestamp_shape() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(
            timestamp(at),
            json!({"$date": "2024-05-01T10:00:00.000Z"})
        );
        assert_eq!(
            normalize(timestamp(at)),
            json!("2024-05-01T10:00:00.000Z")
        );
    }
}
