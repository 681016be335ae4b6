//! Best-effort persistence of notification records.
//!
//! The push has already been attempted by the time this runs; an insert
//! failure is logged and swallowed so it never changes the caller's outcome.

use std::collections::HashSet;

use tracing::{debug, error};

use marinex_store::{NotificationRow, StoreClient};

use crate::events::NotificationEvent;

const INITIAL_STATUS: &str = "pending";

/// One notification record per recipient, mirroring what was pushed.
pub fn records_for(recipients: &HashSet<String>, event: &NotificationEvent) -> Vec<NotificationRow> {
    recipients
        .iter()
        .map(|user_id| NotificationRow {
            user_id: user_id.clone(),
            title: event.title.clone(),
            body: event.body.clone(),
            data: Some(event.data_json()),
            status: INITIAL_STATUS.to_string(),
        })
        .collect()
}

/// Insert the records, dropping any missing a recipient, title or body.
/// No-ops on empty input and never fails the caller.
pub async fn persist(store: &StoreClient, records: Vec<NotificationRow>) {
    let rows: Vec<NotificationRow> = records
        .into_iter()
        .filter(|row| !row.user_id.is_empty() && !row.title.is_empty() && !row.body.is_empty())
        .collect();

    if rows.is_empty() {
        return;
    }

    match store.insert_notifications(&rows).await {
        Ok(()) => debug!(count = rows.len(), "Persisted notification records"),
        Err(err) => error!(error = %err, "Failed to persist user notifications"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use std::collections::HashMap;

    #[test]
    fn records_carry_the_event_payload() {
        let mut recipients = HashSet::new();
        recipients.insert("u-1".to_string());
        let mut data = HashMap::new();
        data.insert("marina_id".to_string(), "m-1".to_string());
        let event = NotificationEvent::new(EventKind::QueueStatusUpdate, "Fila", "Status", data);

        let records = records_for(&recipients, &event);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_id, "u-1");
        assert_eq!(records[0].status, "pending");
        let data = records[0].data.as_ref().unwrap();
        assert_eq!(data["event"], "queue_status_update");
    }

    #[tokio::test]
    async fn persist_swallows_store_failures() {
        let store = StoreClient::new(&marinex_config::SupabaseConfig {
            url: "http://127.0.0.1:1".to_string(),
            service_role_key: "k".to_string(),
        });
        let row = NotificationRow {
            user_id: "u-1".to_string(),
            title: "t".to_string(),
            body: "b".to_string(),
            data: None,
            status: "pending".to_string(),
        };
        // Unroutable store: the insert fails, persist still returns.
        persist(&store, vec![row]).await;
    }

    #[tokio::test]
    async fn persist_noops_on_records_missing_required_fields() {
        let store = StoreClient::new(&marinex_config::SupabaseConfig {
            url: "http://127.0.0.1:1".to_string(),
            service_role_key: "k".to_string(),
        });
        let row = NotificationRow {
            user_id: String::new(),
            title: "t".to_string(),
            body: "b".to_string(),
            data: None,
            status: "pending".to_string(),
        };
        persist(&store, vec![row]).await;
    }
}
