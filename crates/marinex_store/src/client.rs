//! Supabase store client.
//!
//! This is the boundary to the external relational store: point lookups,
//! set-membership (`IN`) lookups, the launch-queue transition RPC and the
//! notification-record insert, all over Supabase's REST surface (PostgREST
//! for data, GoTrue for resolving the caller behind a JWT). The store handles
//! its own transactional guarantees; this client only reports whether a call
//! succeeded.

use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use marinex_common::HTTP_CLIENT;
use marinex_config::SupabaseConfig;

use crate::error::StoreError;
use crate::models::{
    AuthUser, BoatRow, MarinaRow, NotificationRow, ProfileRow, PushTokenRow, QueueEntryRow,
    TransitionedEntry,
};

/// Client for the Supabase store.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: Client,
    base_url: String,
    service_role_key: String,
}

impl StoreClient {
    /// Create a new store client from the Supabase configuration.
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            http: HTTP_CLIENT.clone(),
            base_url: config.url.trim_end_matches('/').to_string(),
            service_role_key: config.service_role_key.clone(),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn rest_select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let response = self
            .http
            .get(self.rest_url(table))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(table, %status, body, "Store select failed");
            return Err(StoreError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    async fn rest_select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        mut query: Vec<(&str, String)>,
    ) -> Result<Option<T>, StoreError> {
        query.push(("limit", "1".to_string()));
        let mut rows = self.rest_select(table, &query).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Point lookup of a launch queue entry by id.
    pub async fn fetch_queue_entry(&self, entry_id: &str) -> Result<Option<QueueEntryRow>, StoreError> {
        self.rest_select_one(
            "boat_launch_queue_view",
            vec![
                (
                    "select",
                    "id,status,boat_id,boat_name,generic_boat_name,marina_id,marina_name"
                        .to_string(),
                ),
                ("id", format!("eq.{entry_id}")),
            ],
        )
        .await
    }

    /// Point lookup of a boat with its ownership data.
    pub async fn fetch_boat(&self, boat_id: &str) -> Result<Option<BoatRow>, StoreError> {
        self.rest_select_one(
            "boats_detailed",
            vec![
                (
                    "select",
                    "id,name,marina_name,primary_owner_id,co_owner_ids".to_string(),
                ),
                ("id", format!("eq.{boat_id}")),
            ],
        )
        .await
    }

    /// Point lookup of a marina.
    pub async fn fetch_marina(&self, marina_id: &str) -> Result<Option<MarinaRow>, StoreError> {
        self.rest_select_one(
            "marinas",
            vec![
                ("select", "id,name".to_string()),
                ("id", format!("eq.{marina_id}")),
            ],
        )
        .await
    }

    /// Every boat berthed at the given marina.
    pub async fn boats_for_marina(&self, marina_id: &str) -> Result<Vec<BoatRow>, StoreError> {
        self.rest_select(
            "boats_detailed",
            &[
                (
                    "select",
                    "id,name,marina_name,primary_owner_id,co_owner_ids".to_string(),
                ),
                ("marina_id", format!("eq.{marina_id}")),
            ],
        )
        .await
    }

    /// Users whose profile links them to the given marina with the `marina`
    /// role.
    pub async fn marina_staff(&self, marina_id: &str) -> Result<Vec<ProfileRow>, StoreError> {
        self.rest_select(
            "user_profiles_view",
            &[
                ("select", "user_id".to_string()),
                ("profile_slug", "eq.marina".to_string()),
                ("marina_id", format!("eq.{marina_id}")),
            ],
        )
        .await
    }

    /// Registered device tokens for exactly the given recipient set.
    pub async fn push_tokens_for(&self, user_ids: &[String]) -> Result<Vec<PushTokenRow>, StoreError> {
        self.rest_select(
            "user_push_tokens",
            &[
                ("select", "token".to_string()),
                ("user_id", format!("in.({})", user_ids.join(","))),
            ],
        )
        .await
    }

    /// Every registered device token (administrative broadcasts).
    pub async fn all_push_tokens(&self) -> Result<Vec<PushTokenRow>, StoreError> {
        self.rest_select("user_push_tokens", &[("select", "token".to_string())])
            .await
    }

    /// Insert notification records. `Prefer: return=minimal` keeps the
    /// response empty; callers only care whether the insert was accepted.
    pub async fn insert_notifications(&self, rows: &[NotificationRow]) -> Result<(), StoreError> {
        let response = self
            .http
            .post(self.rest_url("user_notifications"))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body, "Notification insert failed");
            return Err(StoreError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        debug!(count = rows.len(), "Persisted notification records");
        Ok(())
    }

    /// Invoke the batch state-transition RPC. The store advances up to
    /// `max_batch` queue entries atomically and returns the rows that changed
    /// state; the call either fully applies or fails.
    pub async fn process_queue_transitions(
        &self,
        max_batch: u32,
    ) -> Result<Vec<TransitionedEntry>, StoreError> {
        let response = self
            .http
            .post(self.rest_url("rpc/process_launch_queue_transitions"))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .json(&serde_json::json!({ "max_batch": max_batch }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body, "Queue transition RPC failed");
            return Err(StoreError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// Resolve the user behind a caller-supplied JWT via GoTrue.
    ///
    /// Returns `None` when the token is missing, expired or otherwise not
    /// accepted; any other failure is a store error.
    pub async fn get_user(&self, jwt: &str) -> Result<Option<AuthUser>, StoreError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.service_role_key)
            .header(header::AUTHORIZATION, format!("Bearer {jwt}"))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body, "User lookup failed");
            return Err(StoreError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(Some(response.json().await?))
    }

    /// Whether the given user holds the administrator profile.
    pub async fn is_administrator(&self, user_id: &str) -> Result<bool, StoreError> {
        let rows: Vec<ProfileRow> = self
            .rest_select(
                "user_profiles_view",
                &[
                    ("select", "user_id".to_string()),
                    ("user_id", format!("eq.{user_id}")),
                    ("profile_slug", "eq.administrador".to_string()),
                ],
            )
            .await?;
        Ok(!rows.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> StoreClient {
        StoreClient::new(&SupabaseConfig {
            url: server.uri(),
            service_role_key: "service-key".to_string(),
        })
    }

    #[tokio::test]
    async fn point_lookup_returns_none_on_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/boat_launch_queue_view"))
            .and(query_param("id", "eq.missing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let entry = client_for(&server).fetch_queue_entry("missing").await.unwrap();
        assert!(entry.is_none());
    }

    #[tokio::test]
    async fn in_lookup_carries_the_whole_recipient_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/user_push_tokens"))
            .and(query_param("user_id", "in.(u1,u2)"))
            .and(header("apikey", "service-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"token": "tok-a"},
                {"token": "tok-b"}
            ])))
            .mount(&server)
            .await;

        let rows = client_for(&server)
            .push_tokens_for(&["u1".to_string(), "u2".to_string()])
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn transition_rpc_posts_the_batch_bound() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/process_launch_queue_transitions"))
            .and(body_json(serde_json::json!({"max_batch": 50})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"entry_id": "e-1", "new_status": "in_water"}
            ])))
            .mount(&server)
            .await;

        let rows = client_for(&server).process_queue_transitions(50).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entry_id(), Some("e-1"));
    }

    #[tokio::test]
    async fn transition_rpc_failure_is_an_error_not_an_empty_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/process_launch_queue_transitions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let result = client_for(&server).process_queue_transitions(50).await;
        assert!(matches!(
            result,
            Err(StoreError::ApiError { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn rejected_jwt_resolves_to_no_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let user = client_for(&server).get_user("stale-jwt").await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn administrator_check_is_a_membership_test() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/user_profiles_view"))
            .and(query_param("profile_slug", "eq.administrador"))
            .and(query_param("user_id", "eq.admin-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([{"user_id": "admin-1"}])),
            )
            .mount(&server)
            .await;

        assert!(client_for(&server).is_administrator("admin-1").await.unwrap());
    }
}
