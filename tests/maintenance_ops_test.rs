//! End-to-end tests of maintenance operations against the in-memory store
//!
//! Each test drives a [`MaintenanceSession`] the way the CLI does: attach,
//! run one operation, close.

use async_trait::async_trait;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::{json, Value};
use std::sync::Arc;
use waypoint::adapters::store::{DocumentStore, Filter, MemoryStore, Update, UpdateOutcome};
use waypoint::config::CollectionNames;
use waypoint::core::contracts::probe_contract_save;
use waypoint::core::packages::inspect_packages;
use waypoint::core::quotes::enrich_quote;
use waypoint::core::records::{patch_record, FieldAssignment};
use waypoint::core::session::{MaintenanceSession, SessionState};
use waypoint::core::users::{approve_admins, approve_user};
use waypoint::domain::{RecordId, Result, StoreError, WaypointError};

fn fake_user(id: &str, role: &str, approved: bool) -> Value {
    let name: String = Name().fake();
    let email: String = SafeEmail().fake();
    json!({
        "_id": id,
        "name": name,
        "email": email.to_lowercase(),
        "role": role,
        "isApproved": approved,
    })
}

async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new("backoffice"));
    store
        .seed(
            "users",
            vec![
                fake_user("a1", "admin", false),
                fake_user("a2", "admin", false),
                fake_user("a3", "admin", true),
                fake_user("g1", "agent", false),
            ],
        )
        .await;
    store
        .seed(
            "packages",
            vec![
                json!({"_id": "p1", "name": "Bali Escape", "destination": "Bali", "status": "published"}),
                json!({"_id": "p2", "name": "Lisbon Weekend", "destination": "Lisbon", "status": "draft"}),
            ],
        )
        .await;
    store
        .seed(
            "quotes",
            vec![json!({"_id": "q1", "leadName": "Mara Ilves", "selectedEvents": []})],
        )
        .await;
    store
        .seed(
            "events",
            vec![
                json!({"_id": "e1", "name": "Sunrise trek", "price": 35, "currency": "USD", "isActive": true}),
                json!({"_id": "e2", "name": "Temple tour", "price": 20, "currency": "USD", "isActive": true}),
                json!({"_id": "e3", "name": "Retired cruise", "price": 90, "isActive": false}),
            ],
        )
        .await;
    store
}

async fn session_for(store: &Arc<MemoryStore>) -> MaintenanceSession {
    let dyn_store: Arc<dyn DocumentStore> = store.clone();
    MaintenanceSession::attach(dyn_store).await.unwrap()
}

#[tokio::test]
async fn test_session_closes_once_after_success() {
    let store = seeded_store().await;
    let session = session_for(&store).await;
    assert_eq!(session.state(), SessionState::Connected);

    let report = session
        .run(|store| async move { approve_admins(store.as_ref(), "users", "admin", false).await })
        .await
        .unwrap();

    assert_eq!(report.outcome.modified, 2);
    assert_eq!(store.close_calls(), 1);
}

#[tokio::test]
async fn test_session_closes_once_after_failure() {
    let store = seeded_store().await;
    let session = session_for(&store).await;

    let result = session
        .run(|store| async move { approve_user(store.as_ref(), "users", "not-an-email", false).await })
        .await;

    assert!(matches!(result, Err(WaypointError::Validation(_))));
    assert_eq!(store.close_calls(), 1);
}

#[tokio::test]
async fn test_unreachable_store_is_released() {
    let store = seeded_store().await;
    store.set_unreachable(true);
    let dyn_store: Arc<dyn DocumentStore> = store.clone();

    let result = MaintenanceSession::attach(dyn_store).await;
    assert!(result.is_err());
    assert_eq!(store.close_calls(), 1);
}

#[tokio::test]
async fn test_approve_admins_second_run_is_noop() {
    let store = seeded_store().await;

    let first = approve_admins(store.as_ref(), "users", "admin", false)
        .await
        .unwrap();
    assert_eq!(first.outcome, UpdateOutcome { matched: 2, modified: 2 });

    let second = approve_admins(store.as_ref(), "users", "admin", false)
        .await
        .unwrap();
    assert_eq!(second.outcome, UpdateOutcome { matched: 0, modified: 0 });
    assert_eq!(second.users.len(), 3);
    assert!(second.users.iter().all(|user| user.is_approved));

    let agents = store
        .count("users", &Filter::eq("role", "agent").and(Filter::eq("isApproved", true)))
        .await
        .unwrap();
    assert_eq!(agents, 0);
}

#[tokio::test]
async fn test_approve_admins_dry_run_counts_without_writing() {
    let store = seeded_store().await;

    let report = approve_admins(store.as_ref(), "users", "admin", true)
        .await
        .unwrap();
    assert_eq!(report.outcome, UpdateOutcome { matched: 2, modified: 0 });
    assert!(report.dry_run);

    let pending = store
        .count("users", &Filter::eq("role", "admin").and(Filter::ne("isApproved", true)))
        .await
        .unwrap();
    assert_eq!(pending, 2);
}

#[tokio::test]
async fn test_approve_unknown_user_is_not_found() {
    let store = seeded_store().await;

    let report = approve_user(store.as_ref(), "users", "ghost@example.com", false)
        .await
        .unwrap();
    assert!(report.is_not_found());
    assert_eq!(report.outcome, UpdateOutcome::default());
}

#[tokio::test]
async fn test_patch_nonexistent_record_reports_zero() {
    let store = seeded_store().await;
    let id = RecordId::new("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
    let assignments = vec!["status=archived".parse::<FieldAssignment>().unwrap()];

    let report = patch_record(store.as_ref(), "packages", &id, &assignments, false)
        .await
        .unwrap();
    assert_eq!(report.outcome, UpdateOutcome { matched: 0, modified: 0 });
}

#[tokio::test]
async fn test_patch_record_sets_typed_values() {
    let store = seeded_store().await;
    let id = RecordId::new("p2").unwrap();
    let assignments: Vec<FieldAssignment> = ["status=published", "capacity=12", "featured=true"]
        .iter()
        .map(|raw| raw.parse().unwrap())
        .collect();

    let report = patch_record(store.as_ref(), "packages", &id, &assignments, false)
        .await
        .unwrap();
    assert_eq!(report.outcome, UpdateOutcome { matched: 1, modified: 1 });

    let package = store
        .find_one("packages", &Filter::id("p2"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(package["status"], "published");
    assert_eq!(package["capacity"], 12);
    assert_eq!(package["featured"], true);
}

#[tokio::test]
async fn test_patch_record_dotted_field_writes_nested_value() {
    let store = seeded_store().await;
    let id = RecordId::new("p1").unwrap();
    let assignments = vec!["pricing.currency=EUR".parse::<FieldAssignment>().unwrap()];

    let report = patch_record(store.as_ref(), "packages", &id, &assignments, false)
        .await
        .unwrap();
    assert_eq!(report.outcome, UpdateOutcome { matched: 1, modified: 1 });

    let package = store
        .find_one("packages", &Filter::eq("pricing.currency", "EUR"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(package["_id"], "p1");
    assert!(package.get("pricing.currency").is_none());
}

#[tokio::test]
async fn test_patch_record_numeric_id() {
    let store = seeded_store().await;
    store
        .seed("packages", vec![json!({"_id": 1017, "name": "Legacy tour", "status": 3})])
        .await;
    let id = RecordId::new("1017").unwrap();
    let assignments = vec!["status=archived".parse::<FieldAssignment>().unwrap()];

    let report = patch_record(store.as_ref(), "packages", &id, &assignments, false)
        .await
        .unwrap();
    assert_eq!(report.outcome, UpdateOutcome { matched: 1, modified: 1 });

    let listed = inspect_packages(store.as_ref(), "packages", None, 10)
        .await
        .unwrap();
    let legacy = listed
        .listed
        .iter()
        .find(|package| package.id.as_str() == "1017")
        .unwrap();
    assert_eq!(legacy.status.as_deref(), Some("archived"));
}

#[tokio::test]
async fn test_loosely_typed_packages_still_list() {
    let store = Arc::new(MemoryStore::default());
    store
        .seed(
            "packages",
            vec![
                json!({"_id": "p1", "name": "Bali Escape", "status": 1, "createdAt": null}),
                json!({"_id": "p2", "name": null, "destination": ["Lisbon"]}),
            ],
        )
        .await;

    let report = inspect_packages(store.as_ref(), "packages", None, 10)
        .await
        .unwrap();
    assert_eq!(report.listed.len(), 2);
    assert_eq!(report.listed[0].status.as_deref(), Some("1"));
    assert!(report.listed[1].name.is_none());
}

#[tokio::test]
async fn test_package_lookup_by_name() {
    let store = seeded_store().await;

    let report = inspect_packages(store.as_ref(), "packages", Some("Bali Escape"), 10)
        .await
        .unwrap();
    assert_eq!(report.total, 2);
    let lookup = report.lookup.unwrap();
    assert_eq!(
        lookup.found.unwrap().destination.as_deref(),
        Some("Bali")
    );

    let missing = inspect_packages(store.as_ref(), "packages", Some("Atlantis"), 10)
        .await
        .unwrap();
    assert!(missing.lookup.unwrap().found.is_none());
}

#[tokio::test]
async fn test_enrich_quote_is_idempotent() {
    let store = seeded_store().await;
    let collections = CollectionNames::default();
    let id = RecordId::new("q1").unwrap();

    let first = enrich_quote(store.as_ref(), &collections, &id, false)
        .await
        .unwrap();
    assert_eq!(first.added.len(), 2);
    assert_eq!(first.outcome, Some(UpdateOutcome { matched: 1, modified: 1 }));

    let second = enrich_quote(store.as_ref(), &collections, &id, false)
        .await
        .unwrap();
    assert!(second.added.is_empty());
    assert_eq!(second.already_present, 2);
    assert!(second.outcome.is_none());

    let quote = store
        .find_one("quotes", &Filter::id("q1"))
        .await
        .unwrap()
        .unwrap();
    let selected = quote["selectedEvents"].as_array().unwrap();
    assert_eq!(selected.len(), 2);
    assert!(selected.iter().all(|event| event["quantity"] == 1));
    assert!(quote.get("updatedAt").is_some());
}

/// Store whose inserts or deletes in one collection always fail
#[derive(Default)]
struct FaultyStore {
    inner: MemoryStore,
    failing_inserts: Option<&'static str>,
    failing_deletes: Option<&'static str>,
}

#[async_trait]
impl DocumentStore for FaultyStore {
    fn backend_name(&self) -> &'static str {
        "faulty"
    }

    fn database_name(&self) -> &str {
        self.inner.database_name()
    }

    async fn ping(&self) -> Result<()> {
        self.inner.ping().await
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        self.inner.list_collections().await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        self.inner.count(collection, filter).await
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Value>> {
        self.inner.find(collection, filter, limit).await
    }

    async fn insert_one(&self, collection: &str, document: Value) -> Result<String> {
        if self.failing_inserts == Some(collection) {
            return Err(WaypointError::Store(StoreError::InsertFailed(
                "signature validation failed: templateId must be an ObjectId".to_string(),
            )));
        }
        self.inner.insert_one(collection, document).await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateOutcome> {
        self.inner.update_one(collection, filter, update).await
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateOutcome> {
        self.inner.update_many(collection, filter, update).await
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64> {
        if self.failing_deletes == Some(collection) {
            return Err(WaypointError::Store(StoreError::DeleteFailed(
                "not authorized to execute command delete".to_string(),
            )));
        }
        self.inner.delete_one(collection, filter).await
    }

    async fn close(&self) -> Result<()> {
        self.inner.close().await
    }
}

#[tokio::test]
async fn test_contract_probe_cleans_up_after_signature_failure() {
    let collections = CollectionNames::default();
    let store = FaultyStore {
        failing_inserts: Some("contractsignatures"),
        ..FaultyStore::default()
    };

    let report = probe_contract_save(&store, &collections, None, false)
        .await
        .unwrap();

    assert!(!report.succeeded());
    assert!(report.signature_id.is_none());
    assert!(report
        .signature_error
        .as_deref()
        .unwrap()
        .contains("templateId"));
    assert_eq!(report.templates_deleted, 1);
    assert_eq!(report.signatures_deleted, 0);
    assert!(store.inner.documents("contracttemplates").await.is_empty());
}

#[tokio::test]
async fn test_contract_template_deleted_when_signature_delete_fails() {
    let collections = CollectionNames::default();
    let store = FaultyStore {
        failing_deletes: Some("contractsignatures"),
        ..FaultyStore::default()
    };

    let report = probe_contract_save(&store, &collections, Some("u-42"), false)
        .await
        .unwrap();

    assert!(report.signature_id.is_some());
    assert!(!report.succeeded());
    assert_eq!(report.signatures_deleted, 0);
    assert_eq!(report.templates_deleted, 1);
    assert_eq!(report.cleanup_errors.len(), 1);
    assert!(report.cleanup_errors[0].starts_with("contractsignatures/"));
    assert!(store.inner.documents("contracttemplates").await.is_empty());
    assert!(report.to_string().contains("Cleanup failed"));
}

#[tokio::test]
async fn test_contract_probe_leaves_no_records() {
    let collections = CollectionNames::default();
    let store = MemoryStore::default();

    let report = probe_contract_save(&store, &collections, Some("u-42"), false)
        .await
        .unwrap();

    assert!(report.succeeded());
    assert_eq!(report.templates_deleted, 1);
    assert_eq!(report.signatures_deleted, 1);
    assert!(report.cleanup_errors.is_empty());
    assert!(store.documents("contracttemplates").await.is_empty());
    assert!(store.documents("contractsignatures").await.is_empty());
}
