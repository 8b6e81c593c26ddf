//! Field-level repairs on a single document

use crate::adapters::store::{DocumentStore, Filter, Update, UpdateOutcome};
use crate::domain::{RecordId, Result, WaypointError};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// One `field=value` assignment
///
/// The value is read as JSON when it parses (`true`, `3`, `"x"`, `{..}`) and
/// kept as a plain string otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAssignment {
    pub field: String,
    pub value: Value,
}

impl FromStr for FieldAssignment {
    type Err = WaypointError;

    fn from_str(s: &str) -> Result<Self> {
        let (field, raw) = s.split_once('=').ok_or_else(|| {
            WaypointError::Validation(format!("Expected field=value, got '{s}'"))
        })?;
        let field = field.trim();
        if field.is_empty() {
            return Err(WaypointError::Validation(format!(
                "Missing field name in '{s}'"
            )));
        }
        if field == "_id" || field.starts_with('$') || field.split('.').any(str::is_empty) {
            return Err(WaypointError::Validation(format!(
                "Field '{field}' cannot be set"
            )));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Ok(Self {
            field: field.to_string(),
            value,
        })
    }
}

/// Result of a patch
#[derive(Debug, Clone, PartialEq)]
pub struct PatchReport {
    pub collection: String,
    pub id: RecordId,
    pub assignments: Vec<FieldAssignment>,
    pub outcome: UpdateOutcome,
    pub dry_run: bool,
}

impl fmt::Display for PatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        write!(
            f,
            "{prefix}Patch {}/{}: {}",
            self.collection, self.id, self.outcome
        )?;
        if self.outcome.is_noop() {
            writeln!(f)?;
            return write!(f, "⚠️  No document with id '{}'", self.id);
        }
        for assignment in &self.assignments {
            writeln!(f)?;
            write!(f, "  {} = {}", assignment.field, assignment.value)?;
        }
        Ok(())
    }
}

/// `$set` the assignments on the document with `id`
///
/// # Errors
///
/// Returns a validation error when no assignment is given.
pub async fn patch_record(
    store: &dyn DocumentStore,
    collection: &str,
    id: &RecordId,
    assignments: &[FieldAssignment],
    dry_run: bool,
) -> Result<PatchReport> {
    if assignments.is_empty() {
        return Err(WaypointError::Validation(
            "At least one field=value assignment is required".to_string(),
        ));
    }
    crate::log_operation_start!("patch-record", collection);

    let filter = Filter::id(id.as_str());
    let outcome = if dry_run {
        UpdateOutcome {
            matched: store.count(collection, &filter).await?.min(1),
            modified: 0,
        }
    } else {
        let update = assignments
            .iter()
            .fold(Update::new(), |update, a| update.set(a.field.clone(), a.value.clone()));
        let outcome = store.update_one(collection, &filter, &update).await?;
        crate::log_write_outcome!("patch-record", collection, outcome);
        outcome
    };

    Ok(PatchReport {
        collection: collection.to_string(),
        id: id.clone(),
        assignments: assignments.to_vec(),
        outcome,
        dry_run,
    })
}
