//! Fan-out of one logical notification to many device tokens.
//!
//! Each token gets exactly one independent delivery attempt; a token's
//! failure never aborts its siblings. Delivery order across tokens is not
//! observable to any correctness property, which allows the bounded
//! concurrent pool used here.

use std::collections::HashMap;

use futures::{stream, StreamExt};
use serde::Serialize;
use tracing::error;

use crate::client::FcmClient;

/// Upper bound on in-flight delivery requests, kept well under the
/// provider's per-project rate limits.
pub const DISPATCH_CONCURRENCY: usize = 8;

/// Aggregate result of one fan-out. Individual token failures are logged,
/// not itemized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
    pub success_count: usize,
    pub failure_count: usize,
}

/// Sends one notification payload to many device tokens using a cached
/// access token.
#[derive(Debug, Clone)]
pub struct PushDispatcher {
    client: FcmClient,
}

impl PushDispatcher {
    pub fn new(client: FcmClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &FcmClient {
        &self.client
    }

    /// Fan one notification out to every token.
    ///
    /// Invariants: the caller passes a deduplicated token set;
    /// `success_count + failure_count` always equals `tokens.len()`; an empty
    /// token set returns `{0, 0}` without contacting the provider.
    pub async fn send(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
        access_token: &str,
    ) -> DeliveryOutcome {
        if tokens.is_empty() {
            return DeliveryOutcome::default();
        }

        // Futures are built eagerly (they stay inert until polled) so the
        // mapping closure does not become part of the returned future's type,
        // which would otherwise trip rustc's higher-ranked lifetime check
        // when this future crosses a `Send` bound.
        let deliveries: Vec<_> = tokens
            .iter()
            .map(|token| async move {
                match self
                    .client
                    .send_to_token(token, title, body, data, access_token)
                    .await
                {
                    Ok(()) => true,
                    Err(err) => {
                        error!(token = token.as_str(), error = %err, "Failed to send push for token");
                        false
                    }
                }
            })
            .collect();

        let results: Vec<bool> = stream::iter(deliveries)
            .buffer_unordered(DISPATCH_CONCURRENCY)
            .collect()
            .await;

        let success_count = results.iter().filter(|delivered| **delivered).count();
        DeliveryOutcome {
            success_count,
            failure_count: results.len() - success_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn dispatcher_for(server: &MockServer) -> PushDispatcher {
        PushDispatcher::new(FcmClient::with_base_url("marinex-test", server.uri()))
    }

    #[tokio::test]
    async fn empty_token_set_short_circuits_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/marinex-test/messages:send"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = dispatcher_for(&server)
            .send(&[], "title", "body", &HashMap::new(), "token")
            .await;
        assert_eq!(outcome, DeliveryOutcome::default());
    }

    #[tokio::test]
    async fn one_failing_token_does_not_abort_the_batch() {
        let server = MockServer::start().await;
        // Token B is rejected; A and C go through.
        Mock::given(method("POST"))
            .and(path("/v1/projects/marinex-test/messages:send"))
            .and(body_string_contains("token-b"))
            .respond_with(ResponseTemplate::new(404).set_body_string("UNREGISTERED"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/marinex-test/messages:send"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"name": "projects/marinex-test/messages/1"}),
            ))
            .mount(&server)
            .await;

        let tokens = vec![
            "token-a".to_string(),
            "token-b".to_string(),
            "token-c".to_string(),
        ];
        let outcome = dispatcher_for(&server)
            .send(&tokens, "Manutenção", "Sistema indisponível", &HashMap::new(), "token")
            .await;

        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.failure_count, 1);
        assert_eq!(outcome.success_count + outcome.failure_count, tokens.len());
    }

    #[tokio::test]
    async fn counts_are_exact_for_larger_batches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/marinex-test/messages:send"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"name": "projects/marinex-test/messages/1"}),
            ))
            .expect(25)
            .mount(&server)
            .await;

        let tokens: Vec<String> = (0..25).map(|i| format!("token-{i}")).collect();
        let outcome = dispatcher_for(&server)
            .send(&tokens, "t", "b", &HashMap::new(), "token")
            .await;

        assert_eq!(outcome.success_count, 25);
        assert_eq!(outcome.failure_count, 0);
    }
}
