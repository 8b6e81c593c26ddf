//! User listing and approval repairs

use crate::adapters::store::{DocumentStore, Filter, Update, UpdateOutcome};
use crate::domain::records::{decode_all, display_or_dash};
use crate::domain::{Result, User, WaypointError};
use std::fmt;

/// First users of the collection, optionally narrowed to one role
#[derive(Debug, Clone, PartialEq)]
pub struct UserListReport {
    pub role: Option<String>,
    pub total: u64,
    pub users: Vec<User>,
}

fn write_user(f: &mut fmt::Formatter<'_>, user: &User) -> fmt::Result {
    write!(
        f,
        "  {} <{}> role={} isApproved={} status={}",
        display_or_dash(&user.name),
        display_or_dash(&user.email),
        display_or_dash(&user.role),
        user.is_approved,
        display_or_dash(&user.status)
    )
}

impl fmt::Display for UserListReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.role {
            Some(role) => write!(f, "Users with role '{role}': {}", self.total)?,
            None => write!(f, "Users: {}", self.total)?,
        }
        if self.users.len() as u64 != self.total {
            write!(f, " (showing {})", self.users.len())?;
        }
        for user in &self.users {
            writeln!(f)?;
            write_user(f, user)?;
        }
        Ok(())
    }
}

pub async fn list_users(
    store: &dyn DocumentStore,
    collection: &str,
    role: Option<&str>,
    limit: usize,
) -> Result<UserListReport> {
    let filter = role.map_or(Filter::All, |role| Filter::eq("role", role));
    let total = store.count(collection, &filter).await?;
    let users: Vec<User> = decode_all(store.find(collection, &filter, Some(limit)).await?)?;

    Ok(UserListReport {
        role: role.map(str::to_string),
        total,
        users,
    })
}

/// Which users an approval targeted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalTarget {
    Role(String),
    Email(String),
}

impl fmt::Display for ApprovalTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalTarget::Role(role) => write!(f, "role '{role}'"),
            ApprovalTarget::Email(email) => write!(f, "email '{email}'"),
        }
    }
}

/// Result of flipping `isApproved`
///
/// `users` holds every targeted user as re-read after the write. When that
/// read fails the write outcome is still reported and `read_error` says why.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalReport {
    pub target: ApprovalTarget,
    pub outcome: UpdateOutcome,
    pub dry_run: bool,
    pub users: Vec<User>,
    pub read_error: Option<String>,
}

impl ApprovalReport {
    /// True when an email target matched no user
    pub fn is_not_found(&self) -> bool {
        matches!(self.target, ApprovalTarget::Email(_))
            && self.users.is_empty()
            && self.read_error.is_none()
    }
}

impl fmt::Display for ApprovalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            write!(
                f,
                "[dry-run] Would approve users with {}: {} matching, nothing written",
                self.target, self.outcome.matched
            )?;
        } else {
            write!(f, "Approve users with {}: {}", self.target, self.outcome)?;
        }

        if let Some(error) = &self.read_error {
            writeln!(f)?;
            return write!(f, "⚠️  Could not re-read users after the write: {error}");
        }
        if self.is_not_found() {
            writeln!(f)?;
            return write!(f, "⚠️  User not found");
        }
        for user in &self.users {
            writeln!(f)?;
            write!(
                f,
                "  {} isApproved: {}",
                display_or_dash(&user.email),
                user.is_approved
            )?;
        }
        Ok(())
    }
}

/// Re-read users after a write without losing the write's outcome
async fn reread_users(
    store: &dyn DocumentStore,
    collection: &str,
    filter: &Filter,
    limit: Option<usize>,
) -> (Vec<User>, Option<String>) {
    let read = match store.find(collection, filter, limit).await {
        Ok(documents) => decode_all(documents),
        Err(e) => Err(e),
    };
    match read {
        Ok(users) => (users, None),
        Err(e) => {
            tracing::warn!(collection, error = %e, "Failed to re-read users after approval");
            (Vec::new(), Some(e.to_string()))
        }
    }
}

/// Approve every user with `role` that is not approved yet
///
/// Already-approved users are excluded from the filter, so a repeated run
/// reports matched = modified = 0.
pub async fn approve_admins(
    store: &dyn DocumentStore,
    collection: &str,
    role: &str,
    dry_run: bool,
) -> Result<ApprovalReport> {
    crate::log_operation_start!("approve-admins", collection);
    let pending = Filter::eq("role", role).and(Filter::ne("isApproved", true));

    let outcome = if dry_run {
        UpdateOutcome {
            matched: store.count(collection, &pending).await?,
            modified: 0,
        }
    } else {
        let outcome = store
            .update_many(collection, &pending, &Update::new().set("isApproved", true))
            .await?;
        crate::log_write_outcome!("approve-admins", collection, outcome);
        outcome
    };

    let (users, read_error) =
        reread_users(store, collection, &Filter::eq("role", role), None).await;

    Ok(ApprovalReport {
        target: ApprovalTarget::Role(role.to_string()),
        outcome,
        dry_run,
        users,
        read_error,
    })
}

/// Approve one user by email
///
/// An unknown email reports 0/0 and is not an error.
pub async fn approve_user(
    store: &dyn DocumentStore,
    collection: &str,
    email: &str,
    dry_run: bool,
) -> Result<ApprovalReport> {
    let email = normalize_email(email)?;
    crate::log_operation_start!("approve-user", collection);
    let filter = Filter::eq("email", email.as_str());

    let outcome = if dry_run {
        UpdateOutcome {
            matched: store.count(collection, &filter).await?.min(1),
            modified: 0,
        }
    } else {
        let outcome = store
            .update_one(collection, &filter, &Update::new().set("isApproved", true))
            .await?;
        crate::log_write_outcome!("approve-user", collection, outcome);
        outcome
    };

    let (users, read_error) = reread_users(store, collection, &filter, Some(1)).await;
    if users.is_empty() && read_error.is_none() {
        tracing::info!(collection, email = %email, "User not found");
    }

    Ok(ApprovalReport {
        target: ApprovalTarget::Email(email),
        outcome,
        dry_run,
        users,
        read_error,
    })
}

/// Trimmed, lower-cased email
///
/// # Errors
///
/// Returns a validation error if the address has no `@`.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(WaypointError::Validation(format!(
            "Invalid email address: '{email}'"
        )));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;
    use serde_json::json;

    async fn store() -> MemoryStore {
        let store = MemoryStore::default();
        store
            .seed(
                "users",
                vec![
                    json!({"_id": "u1", "email": "ana@example.com", "role": "admin", "isApproved": false}),
                    json!({"_id": "u2", "email": "ben@example.com", "role": "admin"}),
                    json!({"_id": "u3", "email": "cy@example.com", "role": "admin", "isApproved": true}),
                    json!({"_id": "u4", "email": "dee@example.com", "role": "agent", "isApproved": false}),
                ],
            )
            .await;
        store
    }

    #[tokio::test]
    async fn test_list_users_by_role() {
        let store = store().await;
        let report = list_users(&store, "users", Some("admin"), 2).await.unwrap();
        assert_eq!(report.total, 3);
        assert_eq!(report.users.len(), 2);
        assert!(report.to_string().contains("(showing 2)"));
    }

    #[tokio::test]
    async fn test_approve_admins_skips_already_approved() {
        let store = store().await;
        let report = approve_admins(&store, "users", "admin", false).await.unwrap();
        assert_eq!(report.outcome, UpdateOutcome { matched: 2, modified: 2 });
        assert!(report.users.iter().all(|u| u.is_approved));

        let agent = &store.documents("users").await[3];
        assert_eq!(agent["isApproved"], false);
    }

    #[tokio::test]
    async fn test_approve_admins_dry_run_writes_nothing() {
        let store = store().await;
        let report = approve_admins(&store, "users", "admin", true).await.unwrap();
        assert_eq!(report.outcome, UpdateOutcome { matched: 2, modified: 0 });
        assert!(report.to_string().starts_with("[dry-run]"));
        assert_eq!(
            store
                .count("users", &Filter::eq("isApproved", true))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_approve_user_unknown_email() {
        let store = store().await;
        let report = approve_user(&store, "users", "ghost@example.com", false)
            .await
            .unwrap();
        assert_eq!(report.outcome, UpdateOutcome::default());
        assert!(report.is_not_found());
        assert!(report.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_approve_user_normalizes_email() {
        let store = store().await;
        let report = approve_user(&store, "users", "  DEE@example.com ", false)
            .await
            .unwrap();
        assert_eq!(report.outcome, UpdateOutcome { matched: 1, modified: 1 });
        assert!(report.users[0].is_approved);
    }

    #[tokio::test]
    async fn test_loosely_typed_users_still_list_and_approve() {
        let store = MemoryStore::default();
        store
            .seed(
                "users",
                vec![
                    json!({"_id": "u1", "email": "ana@example.com", "role": "admin", "isApproved": false, "status": 1}),
                    json!({"_id": "u2", "email": "ben@example.com", "role": "admin", "isApproved": null}),
                ],
            )
            .await;

        let listed = list_users(&store, "users", None, 10).await.unwrap();
        assert_eq!(listed.users.len(), 2);
        assert_eq!(listed.users[0].status.as_deref(), Some("1"));

        let report = approve_admins(&store, "users", "admin", false).await.unwrap();
        assert_eq!(report.outcome, UpdateOutcome { matched: 2, modified: 2 });
        assert!(report.read_error.is_none());
        assert!(report.users.iter().all(|u| u.is_approved));
    }

    #[tokio::test]
    async fn test_undecodable_reread_keeps_outcome() {
        let store = MemoryStore::default();
        store
            .seed(
                "users",
                vec![json!({"_id": {"nested": true}, "role": "admin", "isApproved": false})],
            )
            .await;

        let report = approve_admins(&store, "users", "admin", false).await.unwrap();
        assert_eq!(report.outcome, UpdateOutcome { matched: 1, modified: 1 });
        assert!(report.users.is_empty());
        assert!(report.read_error.is_some());
        assert!(report.to_string().contains("matched 1, modified 1"));
    }

    #[test]
    fn test_normalize_email_rejects_garbage() {
        assert!(normalize_email("nobody").is_err());
    }
}
