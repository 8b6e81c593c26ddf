//! Typed filters and updates
//!
//! Maintenance operations describe what they read and write with these
//! types instead of raw driver documents. The MongoDB adapter translates
//! them to BSON; [`Filter::matches`] and [`Update::apply`] evaluate them
//! directly for the in-memory store. Field names are dotted paths
//! (`address.city`), as in MongoDB.

use super::document::document_id;
use serde_json::{Map, Value};

/// Document filter
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document
    All,
    /// Document with this `_id`
    Id(String),
    /// Field equals value
    Eq(String, Value),
    /// Field differs from value, or is missing
    Ne(String, Value),
    /// Field equals one of the values
    In(String, Vec<Value>),
    /// All sub-filters match
    And(Vec<Filter>),
}

impl Filter {
    /// Filter on `_id`
    pub fn id(id: impl Into<String>) -> Self {
        Filter::Id(id.into())
    }

    /// Filter on field equality
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    /// Filter on field inequality
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    /// Combine with another filter
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::All, other) => other,
            (this, Filter::All) => this,
            (Filter::And(mut left), Filter::And(right)) => {
                left.extend(right);
                Filter::And(left)
            }
            (Filter::And(mut left), other) => {
                left.push(other);
                Filter::And(left)
            }
            (this, other) => Filter::And(vec![this, other]),
        }
    }

    /// Evaluate against a normalised document
    ///
    /// `Id` compares the textual form, so numeric `_id`s match too.
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Id(id) => document_id(document).as_deref() == Some(id.as_str()),
            Filter::Eq(field, value) => lookup(document, field) == Some(value),
            Filter::Ne(field, value) => lookup(document, field) != Some(value),
            Filter::In(field, values) => lookup(document, field)
                .map(|v| values.contains(v))
                .unwrap_or(false),
            Filter::And(filters) => filters.iter().all(|f| f.matches(document)),
        }
    }
}

/// Document update: `$set` fields and `$push` with `$each`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    set: Map<String, Value>,
    push: Vec<(String, Vec<Value>)>,
}

impl Update {
    /// Empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    /// Append values to an array field
    pub fn push_each(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        if !values.is_empty() {
            self.push.push((field.into(), values));
        }
        self
    }

    /// Fields to set
    pub fn set_fields(&self) -> &Map<String, Value> {
        &self.set
    }

    /// Arrays to append to
    pub fn push_fields(&self) -> &[(String, Vec<Value>)] {
        &self.push
    }

    /// True when the update would change nothing
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.push.is_empty()
    }

    /// Apply to a stored document, returning whether its content changed
    ///
    /// Missing intermediate objects are created. Like MongoDB, it fails when
    /// a path runs through a non-object or a push target is not an array;
    /// the document is left untouched in that case.
    pub fn apply(&self, document: &mut Value) -> Result<bool, String> {
        let mut candidate = document.clone();
        let Some(object) = candidate.as_object_mut() else {
            return Err("document is not an object".to_string());
        };
        let mut changed = false;

        for (field, value) in &self.set {
            if lookup_in(object, field) == Some(value) {
                continue;
            }
            *slot_mut(object, field)? = value.clone();
            changed = true;
        }

        for (field, values) in &self.push {
            let slot = slot_mut(object, field)?;
            if slot.is_null() {
                *slot = Value::Array(Vec::new());
            }
            match slot {
                Value::Array(items) => {
                    items.extend(values.iter().cloned());
                    changed = true;
                }
                other => {
                    return Err(format!(
                        "The field '{field}' must be an array but is {other}"
                    ))
                }
            }
        }

        if changed {
            *document = candidate;
        }
        Ok(changed)
    }
}

/// Value at a dotted path; numeric segments index into arrays
fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |current, key| match current {
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        other => other.get(key),
    })
}

fn lookup_in<'a>(object: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    match path.split_once('.') {
        None => object.get(path),
        Some((head, rest)) => object.get(head).and_then(|child| lookup(child, rest)),
    }
}

/// Mutable slot at a dotted path, creating missing objects on the way
fn slot_mut<'a>(object: &'a mut Map<String, Value>, path: &str) -> Result<&'a mut Value, String> {
    match path.split_once('.') {
        None => Ok(object.entry(path.to_string()).or_insert(Value::Null)),
        Some((head, rest)) => {
            let child = object
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            match child {
                Value::Object(map) => slot_mut(map, rest),
                other => Err(format!(
                    "Cannot create field '{rest}' in element {{{head}: {other}}}"
                )),
            }
        }
    }
}

/// Matched and modified counts of an update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

impl UpdateOutcome {
    /// True when the filter matched no document
    pub fn is_noop(&self) -> bool {
        self.matched == 0
    }
}

impl std::fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "matched {}, modified {}", self.matched, self.modified)
    }
}
