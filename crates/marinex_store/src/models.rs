//! Row types exchanged with the Supabase store.
//!
//! These mirror the views and tables the notification engine reads:
//! `boat_launch_queue_view`, `boats_detailed`, `marinas`,
//! `user_profiles_view`, `user_push_tokens` and `user_notifications`.
//! Everything the store may omit is optional; callers normalize once at the
//! boundary instead of sprinkling null checks through business logic.

use serde::{Deserialize, Serialize};

/// One entry of the boat launch queue (`boat_launch_queue_view`).
#[derive(Debug, Clone, Deserialize)]
pub struct QueueEntryRow {
    pub id: Option<String>,
    pub status: Option<String>,
    pub boat_id: Option<String>,
    pub boat_name: Option<String>,
    pub generic_boat_name: Option<String>,
    pub marina_id: Option<String>,
    pub marina_name: Option<String>,
}

/// A boat with its ownership data (`boats_detailed`).
#[derive(Debug, Clone, Deserialize)]
pub struct BoatRow {
    pub id: Option<String>,
    pub name: Option<String>,
    pub marina_name: Option<String>,
    pub primary_owner_id: Option<String>,
    #[serde(default)]
    pub co_owner_ids: Option<Vec<Option<String>>>,
}

/// A marina (`marinas`).
#[derive(Debug, Clone, Deserialize)]
pub struct MarinaRow {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A user profile membership row (`user_profiles_view`).
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub user_id: Option<String>,
}

/// A registered device token (`user_push_tokens`).
#[derive(Debug, Clone, Deserialize)]
pub struct PushTokenRow {
    pub token: Option<String>,
}

/// A notification record to insert into `user_notifications`.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationRow {
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub data: Option<serde_json::Value>,
    pub status: String,
}

/// One row returned by the `process_launch_queue_transitions` RPC.
///
/// The store has shipped both `entry_id`/`new_status` and `id`/`status`
/// namings; both are accepted and normalized through the accessors.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionedEntry {
    pub entry_id: Option<String>,
    pub id: Option<String>,
    pub new_status: Option<String>,
    pub status: Option<String>,
}

impl TransitionedEntry {
    /// The entry id, whichever field carried it.
    pub fn entry_id(&self) -> Option<&str> {
        self.entry_id
            .as_deref()
            .or(self.id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// The post-transition status, whichever field carried it.
    pub fn new_status(&self) -> Option<&str> {
        self.new_status.as_deref().or(self.status.as_deref())
    }
}

/// The authenticated user behind a caller-supplied JWT.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitioned_entry_prefers_explicit_naming() {
        let entry: TransitionedEntry = serde_json::from_str(
            r#"{"entry_id":"e-1","id":"other","new_status":"in_water","status":"stale"}"#,
        )
        .unwrap();
        assert_eq!(entry.entry_id(), Some("e-1"));
        assert_eq!(entry.new_status(), Some("in_water"));
    }

    #[test]
    fn transitioned_entry_falls_back_to_short_naming() {
        let entry: TransitionedEntry =
            serde_json::from_str(r#"{"id":"e-2","status":"completed"}"#).unwrap();
        assert_eq!(entry.entry_id(), Some("e-2"));
        assert_eq!(entry.new_status(), Some("completed"));
    }

    #[test]
    fn transitioned_entry_without_id_is_skippable() {
        let entry: TransitionedEntry = serde_json::from_str(r#"{"status":"pending"}"#).unwrap();
        assert_eq!(entry.entry_id(), None);
    }
}
