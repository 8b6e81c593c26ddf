//! Conversions between the crate's JSON documents and BSON

use crate::adapters::store::document::normalize;
use crate::adapters::store::{Filter, Update};
use crate::domain::{RecordId, Result, StoreError, WaypointError};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson, Document};
use serde_json::Value;

/// Convert a JSON value (extended JSON allowed) to BSON
pub fn to_bson(value: &Value) -> Result<Bson> {
    Bson::try_from(value.clone()).map_err(|e| {
        WaypointError::Store(StoreError::InvalidDocument(format!(
            "cannot convert value to BSON: {e}"
        )))
    })
}

/// Convert a JSON object to a BSON document
///
/// A 24-hex string `_id` is stored as an ObjectId, matching what the
/// application's own writes produce.
pub fn to_document(value: &Value) -> Result<Document> {
    let mut document = match to_bson(value)? {
        Bson::Document(document) => document,
        other => {
            return Err(WaypointError::Store(StoreError::InvalidDocument(format!(
                "expected a JSON object, got {:?}",
                other.element_type()
            ))))
        }
    };
    if let Some(Bson::String(id)) = document.get("_id") {
        if let Ok(oid) = ObjectId::parse_str(id) {
            document.insert("_id", oid);
        }
    }
    Ok(document)
}

/// Convert a stored BSON document to normalised JSON
pub fn from_document(document: Document) -> Value {
    normalize(Bson::Document(document).into_relaxed_extjson())
}

/// BSON rendering of an `_id` string
///
/// An ObjectId-shaped or integer id could have been stored either way, so
/// both forms are accepted.
fn id_filter(id: &str) -> Bson {
    let is_object_id = RecordId::new(id)
        .map(|rid| rid.is_object_id())
        .unwrap_or(false);
    if is_object_id {
        if let Ok(oid) = ObjectId::parse_str(id) {
            return Bson::Document(doc! { "$in": [oid, id] });
        }
    }
    match id.parse::<i64>() {
        Ok(number) => Bson::Document(doc! { "$in": [id, number] }),
        Err(_) => Bson::String(id.to_string()),
    }
}

/// Translate a [`Filter`] into a query document
pub fn filter_document(filter: &Filter) -> Result<Document> {
    Ok(match filter {
        Filter::All => Document::new(),
        Filter::Id(id) => doc! { "_id": id_filter(id) },
        Filter::Eq(field, value) => doc! { field.as_str(): to_bson(value)? },
        Filter::Ne(field, value) => doc! { field.as_str(): { "$ne": to_bson(value)? } },
        Filter::In(field, values) => {
            let values = values.iter().map(to_bson).collect::<Result<Vec<_>>>()?;
            doc! { field.as_str(): { "$in": values } }
        }
        Filter::And(filters) if filters.is_empty() => Document::new(),
        Filter::And(filters) => {
            let parts = filters
                .iter()
                .map(|f| filter_document(f).map(Bson::Document))
                .collect::<Result<Vec<_>>>()?;
            doc! { "$and": parts }
        }
    })
}

/// Translate an [`Update`] into an update document
pub fn update_document(update: &Update) -> Result<Document> {
    let mut document = Document::new();

    if !update.set_fields().is_empty() {
        let mut set = Document::new();
        for (field, value) in update.set_fields() {
            set.insert(field.as_str(), to_bson(value)?);
        }
        document.insert("$set", set);
    }

    if !update.push_fields().is_empty() {
        let mut push = Document::new();
        for (field, values) in update.push_fields() {
            let values = values.iter().map(to_bson).collect::<Result<Vec<_>>>()?;
            push.insert(field.as_str(), doc! { "$each": values });
        }
        document.insert("$push", push);
    }

    if document.is_empty() {
        return Err(WaypointError::Store(StoreError::UpdateFailed(
            "update has no $set or $push fields".to_string(),
        )));
    }
    Ok(document)
}

/// Render an inserted id as text
pub fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}
