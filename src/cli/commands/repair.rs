//! Data repair commands: approve-admins, approve-user, patch-record, enrich-quote
//!
//! All of them honour `--dry-run`.

use super::{report_failure, run_with_store, CommandContext};
use crate::core::quotes::enrich_quote;
use crate::core::records::{patch_record, FieldAssignment};
use crate::core::users::{approve_admins, approve_user};
use crate::domain::{RecordId, WaypointError};
use clap::Args;

/// Arguments for the approve-admins command
#[derive(Args, Debug)]
pub struct ApproveAdminsArgs {
    /// Role to approve (defaults to targets.admin_role)
    #[arg(long)]
    pub role: Option<String>,
}

impl ApproveAdminsArgs {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        let role = self.role.clone();
        Ok(run_with_store(ctx, "Admin approval", |config, store| async move {
            let role = role.unwrap_or(config.targets.admin_role);
            approve_admins(
                store.as_ref(),
                &config.database.collections.users,
                &role,
                config.application.dry_run,
            )
            .await
        })
        .await)
    }
}

/// Arguments for the approve-user command
#[derive(Args, Debug)]
pub struct ApproveUserArgs {
    /// Email of the user to approve
    #[arg(long)]
    pub email: String,
}

impl ApproveUserArgs {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        let email = self.email.clone();
        Ok(run_with_store(ctx, "User approval", |config, store| async move {
            approve_user(
                store.as_ref(),
                &config.database.collections.users,
                &email,
                config.application.dry_run,
            )
            .await
        })
        .await)
    }
}

/// Arguments for the patch-record command
#[derive(Args, Debug)]
pub struct PatchRecordArgs {
    /// Collection holding the document
    #[arg(long)]
    pub collection: String,

    /// Document id
    #[arg(long)]
    pub id: String,

    /// Field assignment `field=value`; values are read as JSON when possible
    #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
    pub set: Vec<FieldAssignment>,
}

impl PatchRecordArgs {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        let id = match RecordId::new(&self.id).map_err(WaypointError::Validation) {
            Ok(id) => id,
            Err(e) => return Ok(report_failure("Invalid record id", &e)),
        };
        let collection = self.collection.clone();
        let assignments = self.set.clone();
        Ok(run_with_store(ctx, "Record patch", |config, store| async move {
            patch_record(
                store.as_ref(),
                &collection,
                &id,
                &assignments,
                config.application.dry_run,
            )
            .await
        })
        .await)
    }
}

/// Arguments for the enrich-quote command
#[derive(Args, Debug)]
pub struct EnrichQuoteArgs {
    /// Quote to enrich (defaults to targets.quote_id)
    #[arg(long)]
    pub quote_id: Option<String>,
}

impl EnrichQuoteArgs {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        let quote_id = match &self.quote_id {
            Some(id) => Some(id.clone()),
            None => match ctx.load() {
                Ok(config) => config.targets.quote_id,
                Err(e) => return Ok(report_failure("Failed to load configuration", &e)),
            },
        };
        let Some(quote_id) = quote_id else {
            let err = WaypointError::Configuration(
                "No quote id given (--quote-id or targets.quote_id)".to_string(),
            );
            return Ok(report_failure("Missing quote id", &err));
        };
        let quote_id = match RecordId::new(quote_id).map_err(WaypointError::Validation) {
            Ok(id) => id,
            Err(e) => return Ok(report_failure("Invalid quote id", &e)),
        };

        Ok(run_with_store(ctx, "Quote enrichment", |config, store| async move {
            enrich_quote(
                store.as_ref(),
                &config.database.collections,
                &quote_id,
                config.application.dry_run,
            )
            .await
        })
        .await)
    }
}
