//! Contract save probe
//!
//! Exercises the contract write path end to end: a transient template and a
//! signature referencing it are saved, then both are deleted again.

use crate::adapters::store::document::now;
use crate::adapters::store::{DocumentStore, Filter};
use crate::config::CollectionNames;
use crate::domain::{ContractSignature, ContractTemplate, Result, WaypointError};
use serde_json::Value;
use std::fmt;

/// What the probe saved and cleaned up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractProbeReport {
    pub template_id: String,
    pub signature_id: Option<String>,
    /// Why the signature could not be saved
    pub signature_error: Option<String>,
    pub templates_deleted: u64,
    pub signatures_deleted: u64,
    /// Deletes that failed; each was still attempted
    pub cleanup_errors: Vec<String>,
}

impl ContractProbeReport {
    pub fn succeeded(&self) -> bool {
        self.signature_error.is_none() && self.cleanup_errors.is_empty()
    }
}

impl fmt::Display for ContractProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "✅ Contract template saved: {}", self.template_id)?;
        match (&self.signature_id, &self.signature_error) {
            (Some(id), _) => writeln!(f, "✅ Contract signature saved: {id}")?,
            (None, Some(error)) => writeln!(f, "❌ Contract signature save failed: {error}")?,
            (None, None) => writeln!(f, "❌ Contract signature not saved")?,
        }
        write!(
            f,
            "Cleanup: {} template(s), {} signature(s) deleted",
            self.templates_deleted, self.signatures_deleted
        )?;
        for error in &self.cleanup_errors {
            writeln!(f)?;
            write!(f, "❌ Cleanup failed: {error}")?;
        }
        Ok(())
    }
}

fn to_document<T: serde::Serialize>(record: &T, timestamp_field: &str) -> Result<Value> {
    let mut value = serde_json::to_value(record)?;
    if let Some(object) = value.as_object_mut() {
        object.insert(timestamp_field.to_string(), now());
    }
    Ok(value)
}

/// Save and delete a transient template/signature pair
///
/// Both deletes are attempted even when the signature save or the other
/// delete fails; delete failures land in `cleanup_errors`. A failure to save
/// the template is returned as an error since nothing was written.
pub async fn probe_contract_save(
    store: &dyn DocumentStore,
    collections: &CollectionNames,
    user_id: Option<&str>,
    dry_run: bool,
) -> Result<ContractProbeReport> {
    if dry_run {
        return Err(WaypointError::Validation(
            "probe-contract writes and deletes records and cannot run with --dry-run".to_string(),
        ));
    }
    crate::log_operation_start!("probe-contract", collections.contract_templates.as_str());

    let probe = uuid::Uuid::new_v4().simple().to_string();
    let template = ContractTemplate {
        title: format!("waypoint probe {}", &probe[..8]),
        version: "0.0.0-probe".to_string(),
        content: "Transient template written by waypoint probe-contract.".to_string(),
        is_active: false,
    };
    let template_id = store
        .insert_one(
            &collections.contract_templates,
            to_document(&template, "createdAt")?,
        )
        .await?;
    tracing::info!(template_id = %template_id, "Probe template saved");

    let signature = ContractSignature {
        template_id: template_id.clone(),
        user_id: user_id
            .map(str::to_string)
            .unwrap_or_else(|| format!("waypoint-probe-{probe}")),
        signature: "Waypoint Probe".to_string(),
        signature_type: "typed".to_string(),
    };
    let saved = match to_document(&signature, "signedAt") {
        Ok(document) => {
            store
                .insert_one(&collections.contract_signatures, document)
                .await
        }
        Err(e) => Err(e),
    };
    let (signature_id, signature_error) = match saved {
        Ok(id) => {
            tracing::info!(signature_id = %id, "Probe signature saved");
            (Some(id), None)
        }
        Err(e) => {
            tracing::error!(error = %e, "Probe signature save failed");
            (None, Some(e.to_string()))
        }
    };

    let mut cleanup_errors = Vec::new();
    let signatures_deleted = match &signature_id {
        Some(id) => delete_probe_record(
            store,
            &collections.contract_signatures,
            id,
            &mut cleanup_errors,
        )
        .await,
        None => 0,
    };
    let templates_deleted = delete_probe_record(
        store,
        &collections.contract_templates,
        &template_id,
        &mut cleanup_errors,
    )
    .await;

    Ok(ContractProbeReport {
        template_id,
        signature_id,
        signature_error,
        templates_deleted,
        signatures_deleted,
        cleanup_errors,
    })
}

/// Delete one probe record, recording a failure instead of returning it
async fn delete_probe_record(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    errors: &mut Vec<String>,
) -> u64 {
    match store.delete_one(collection, &Filter::id(id)).await {
        Ok(deleted) => deleted,
        Err(e) => {
            tracing::error!(collection, id, error = %e, "Failed to delete probe record");
            errors.push(format!("{collection}/{id}: {e}"));
            0
        }
    }
}
