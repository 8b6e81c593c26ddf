//! Read-only inspection commands: ping-db, packages, users

use super::{run_with_store, CommandContext};
use crate::core::diagnostics::ping_database;
use crate::core::packages::inspect_packages;
use crate::core::users::list_users;
use clap::Args;

/// Arguments for the ping-db command
#[derive(Args, Debug)]
pub struct PingDbArgs {}

impl PingDbArgs {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        println!("🔍 Checking database connection");
        Ok(run_with_store(ctx, "Database check", |_, store| async move {
            ping_database(store.as_ref()).await
        })
        .await)
    }
}

/// Arguments for the packages command
#[derive(Args, Debug)]
pub struct PackagesArgs {
    /// Look up one package by exact name (defaults to targets.package_name)
    #[arg(long)]
    pub name: Option<String>,

    /// How many packages to list when no name is given
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

impl PackagesArgs {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        let name = self.name.clone();
        let limit = self.limit;
        Ok(run_with_store(ctx, "Package inspection", |config, store| async move {
            let name = name.or(config.targets.package_name);
            inspect_packages(
                store.as_ref(),
                &config.database.collections.packages,
                name.as_deref(),
                limit,
            )
            .await
        })
        .await)
    }
}

/// Arguments for the users command
#[derive(Args, Debug)]
pub struct UsersArgs {
    /// Only users with this role
    #[arg(long)]
    pub role: Option<String>,

    /// Maximum number of users to show
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

impl UsersArgs {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        let role = self.role.clone();
        let limit = self.limit;
        Ok(run_with_store(ctx, "User listing", |config, store| async move {
            list_users(
                store.as_ref(),
                &config.database.collections.users,
                role.as_deref(),
                limit,
            )
            .await
        })
        .await)
    }
}
