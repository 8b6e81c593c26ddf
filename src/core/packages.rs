//! Package collection inspection

use crate::adapters::store::{DocumentStore, Filter};
use crate::domain::records::{decode, decode_all, display_or_dash};
use crate::domain::{Package, Result};
use std::fmt;

/// Outcome of a named package lookup
#[derive(Debug, Clone, PartialEq)]
pub struct PackageLookup {
    pub name: String,
    pub found: Option<Package>,
}

/// Package collection summary
#[derive(Debug, Clone, PartialEq)]
pub struct PackageReport {
    pub collection: String,
    pub total: u64,
    pub lookup: Option<PackageLookup>,
    pub listed: Vec<Package>,
}

fn write_package(f: &mut fmt::Formatter<'_>, package: &Package) -> fmt::Result {
    writeln!(f, "  id:          {}", package.id)?;
    writeln!(f, "  name:        {}", display_or_dash(&package.name))?;
    writeln!(f, "  destination: {}", display_or_dash(&package.destination))?;
    writeln!(f, "  status:      {}", display_or_dash(&package.status))?;
    write!(f, "  createdAt:   {}", display_or_dash(&package.created_at))
}

impl fmt::Display for PackageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total packages in '{}': {}", self.collection, self.total)?;

        if let Some(lookup) = &self.lookup {
            writeln!(f)?;
            match &lookup.found {
                Some(package) => {
                    writeln!(f, "✅ Package '{}' found:", lookup.name)?;
                    write_package(f, package)?;
                }
                None => write!(f, "⚠️  Package '{}' not found", lookup.name)?,
            }
            return Ok(());
        }

        for package in &self.listed {
            writeln!(f)?;
            writeln!(f, "---")?;
            write_package(f, package)?;
        }
        Ok(())
    }
}

/// Count packages and either look one up by name or list the first `limit`
pub async fn inspect_packages(
    store: &dyn DocumentStore,
    collection: &str,
    name: Option<&str>,
    limit: usize,
) -> Result<PackageReport> {
    crate::log_operation_start!("packages", collection);
    let total = store.count(collection, &Filter::All).await?;

    let (lookup, listed) = match name {
        Some(name) => {
            let found = store
                .find_one(collection, &Filter::eq("name", name))
                .await?
                .map(decode::<Package>)
                .transpose()?;
            if found.is_none() {
                tracing::info!(collection, name, "Package not found");
            }
            (
                Some(PackageLookup {
                    name: name.to_string(),
                    found,
                }),
                Vec::new(),
            )
        }
        None => {
            let documents = store.find(collection, &Filter::All, Some(limit)).await?;
            (None, decode_all(documents)?)
        }
    };

    Ok(PackageReport {
        collection: collection.to_string(),
        total,
        lookup,
        listed,
    })
}
