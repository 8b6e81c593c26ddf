//! Quote enrichment with active events

use crate::adapters::store::document::timestamp;
use crate::adapters::store::{DocumentStore, Filter, Update, UpdateOutcome};
use crate::config::CollectionNames;
use crate::domain::records::{decode, decode_all, display_or_dash};
use crate::domain::{Event, Quote, RecordId, Result};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fmt;

/// Result of enriching a quote
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichReport {
    pub quote_id: RecordId,
    pub found: bool,
    pub lead_name: Option<String>,
    pub active_events: usize,
    pub already_present: usize,
    /// Names of the events appended (or that would be, in dry-run)
    pub added: Vec<String>,
    /// `None` when nothing was written
    pub outcome: Option<UpdateOutcome>,
    pub dry_run: bool,
}

impl fmt::Display for EnrichReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.found {
            return write!(f, "⚠️  Quote '{}' not found", self.quote_id);
        }
        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        writeln!(
            f,
            "{prefix}Quote {} ({}): {} active events, {} already selected",
            self.quote_id,
            display_or_dash(&self.lead_name),
            self.active_events,
            self.already_present
        )?;
        if self.added.is_empty() {
            return write!(f, "Nothing to add");
        }
        let verb = if self.dry_run { "Would add" } else { "Added" };
        write!(f, "{verb} {} events: {}", self.added.len(), self.added.join(", "))?;
        if let Some(outcome) = &self.outcome {
            writeln!(f)?;
            write!(f, "Update: {outcome}")?;
        }
        Ok(())
    }
}

/// Selected-event sub-record for a quote
pub fn selected_event(event: &Event, added_at: DateTime<Utc>) -> Value {
    json!({
        "eventId": event.id.as_str(),
        "name": event.name.as_deref().unwrap_or_default(),
        "price": event.price,
        "currency": event.currency,
        "quantity": 1,
        "addedAt": timestamp(added_at),
    })
}

/// Append every active event not yet selected on the quote
///
/// A missing quote is a normal outcome. Running twice adds nothing the second
/// time.
pub async fn enrich_quote(
    store: &dyn DocumentStore,
    collections: &CollectionNames,
    quote_id: &RecordId,
    dry_run: bool,
) -> Result<EnrichReport> {
    crate::log_operation_start!("enrich-quote", collections.quotes.as_str());

    let Some(document) = store
        .find_one(&collections.quotes, &Filter::id(quote_id.as_str()))
        .await?
    else {
        tracing::info!(quote_id = %quote_id, "Quote not found");
        return Ok(EnrichReport {
            quote_id: quote_id.clone(),
            found: false,
            lead_name: None,
            active_events: 0,
            already_present: 0,
            added: Vec::new(),
            outcome: None,
            dry_run,
        });
    };
    let quote: Quote = decode(document)?;

    let events: Vec<Event> = decode_all(
        store
            .find(&collections.events, &Filter::eq("isActive", true), None)
            .await?,
    )?;

    let present: HashSet<String> = quote.selected_event_ids().into_iter().collect();
    let (existing, new): (Vec<&Event>, Vec<&Event>) = events
        .iter()
        .partition(|event| present.contains(event.id.as_str()));

    let now = Utc::now();
    let added: Vec<String> = new
        .iter()
        .map(|event| event.name.clone().unwrap_or_else(|| event.id.to_string()))
        .collect();

    let outcome = if new.is_empty() || dry_run {
        None
    } else {
        let update = Update::new()
            .push_each(
                "selectedEvents",
                new.iter().map(|event| selected_event(event, now)).collect(),
            )
            .set("updatedAt", timestamp(now));
        let outcome = store
            .update_one(&collections.quotes, &Filter::id(quote_id.as_str()), &update)
            .await?;
        crate::log_write_outcome!("enrich-quote", collections.quotes.as_str(), outcome);
        Some(outcome)
    };

    Ok(EnrichReport {
        quote_id: quote_id.clone(),
        found: true,
        lead_name: quote.lead_name,
        active_events: events.len(),
        already_present: existing.len(),
        added,
        outcome,
        dry_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;

    async fn store() -> MemoryStore {
        let store = MemoryStore::default();
        store
            .seed(
                "quotes",
                vec![json!({
                    "_id": "q1",
                    "leadName": "Ana Costa",
                    "selectedEvents": [{"eventId": "e1", "name": "Fado night"}]
                })],
            )
            .await;
        store
            .seed(
                "events",
                vec![
                    json!({"_id": "e1", "name": "Fado night", "price": 45, "currency": "EUR", "isActive": true}),
                    json!({"_id": "e2", "name": "Tram tour", "price": 20.5, "currency": "EUR", "isActive": true}),
                    json!({"_id": "e3", "name": "Closed museum", "price": 10, "isActive": false}),
                ],
            )
            .await;
        store
    }

    #[tokio::test]
    async fn test_enrich_appends_only_new_active_events() {
        let store = store().await;
        let id = RecordId::new("q1").unwrap();
        let report = enrich_quote(&store, &CollectionNames::default(), &id, false)
            .await
            .unwrap();
        assert_eq!(report.active_events, 2);
        assert_eq!(report.already_present, 1);
        assert_eq!(report.added, vec!["Tram tour"]);

        let quote = &store.documents("quotes").await[0];
        let selected = quote["selectedEvents"].as_array().unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[1]["eventId"], "e2");
        assert_eq!(selected[1]["quantity"], 1);
        assert!(selected[1]["addedAt"].is_string());
        assert!(quote["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn test_enrich_missing_quote_is_normal() {
        let store = store().await;
        let id = RecordId::new("q404").unwrap();
        let report = enrich_quote(&store, &CollectionNames::default(), &id, false)
            .await
            .unwrap();
        assert!(!report.found);
        assert!(report.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_enrich_dry_run_writes_nothing() {
        let store = store().await;
        let id = RecordId::new("q1").unwrap();
        let report = enrich_quote(&store, &CollectionNames::default(), &id, true)
            .await
            .unwrap();
        assert_eq!(report.added.len(), 1);
        assert!(report.outcome.is_none());
        let quote = &store.documents("quotes").await[0];
        assert_eq!(quote["selectedEvents"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_selected_event_shape() {
        let event = Event {
            id: RecordId::new("e9").unwrap(),
            name: Some("Sunset cruise".to_string()),
            price: 80.0,
            currency: None,
            is_active: true,
        };
        let value = selected_event(&event, Utc::now());
        assert_eq!(value["eventId"], "e9");
        assert!(value["currency"].is_null());
        assert!(value["addedAt"]["$date"].is_string());
    }
}
