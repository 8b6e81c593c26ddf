//! Database connectivity diagnostics

use crate::adapters::store::{DocumentStore, Filter};
use crate::domain::Result;
use std::fmt;

/// Collections of the connected database with document counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseReport {
    pub backend: String,
    pub database: String,
    pub collections: Vec<(String, u64)>,
}

impl fmt::Display for DatabaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "✅ Connected to {} database '{}'",
            self.backend, self.database
        )?;
        if self.collections.is_empty() {
            return write!(f, "No collections found");
        }
        writeln!(f, "Collections ({}):", self.collections.len())?;
        for (i, (name, count)) in self.collections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {name}: {count} documents")?;
        }
        Ok(())
    }
}

/// List every collection with its document count
pub async fn ping_database(store: &dyn DocumentStore) -> Result<DatabaseReport> {
    let names = store.list_collections().await?;
    let mut collections = Vec::with_capacity(names.len());
    for name in names {
        let count = store.count(&name, &Filter::All).await?;
        tracing::debug!(collection = %name, count, "Counted collection");
        collections.push((name, count));
    }

    Ok(DatabaseReport {
        backend: store.backend_name().to_string(),
        database: store.database_name().to_string(),
        collections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_ping_database_counts_each_collection() {
        let store = MemoryStore::new("backoffice");
        store
            .seed("users", vec![json!({"_id": "u1"}), json!({"_id": "u2"})])
            .await;
        store.seed("events", vec![json!({"_id": "e1"})]).await;

        let report = ping_database(&store).await.unwrap();
        assert_eq!(report.database, "backoffice");
        assert_eq!(
            report.collections,
            vec![("events".to_string(), 1), ("users".to_string(), 2)]
        );
        assert!(report.to_string().contains("users: 2 documents"));
    }
}
