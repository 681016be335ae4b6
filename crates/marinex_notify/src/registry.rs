//! Token registry lookups: recipient user ids to deliverable device tokens.

use std::collections::HashSet;

use marinex_store::{PushTokenRow, StoreClient, StoreError};

/// Device tokens registered for exactly the given recipients, blank-filtered
/// and deduplicated. An empty recipient set short-circuits without a lookup.
pub async fn tokens_for(
    store: &StoreClient,
    recipients: &HashSet<String>,
) -> Result<Vec<String>, StoreError> {
    if recipients.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = recipients.iter().cloned().collect();
    let rows = store.push_tokens_for(&ids).await?;
    Ok(valid_tokens(rows))
}

/// Every registered device token, for administrative broadcasts.
pub async fn all_tokens(store: &StoreClient) -> Result<Vec<String>, StoreError> {
    let rows = store.all_push_tokens().await?;
    Ok(valid_tokens(rows))
}

fn valid_tokens(rows: Vec<PushTokenRow>) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter_map(|row| row.token)
        .filter(|token| !token.trim().is_empty())
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(token: Option<&str>) -> PushTokenRow {
        PushTokenRow {
            token: token.map(str::to_string),
        }
    }

    #[test]
    fn tokens_are_deduplicated_and_blank_filtered() {
        let rows = vec![
            row(Some("tok-a")),
            row(Some("  ")),
            row(None),
            row(Some("tok-b")),
            row(Some("tok-a")),
        ];
        let tokens = valid_tokens(rows);
        assert_eq!(tokens, vec!["tok-a".to_string(), "tok-b".to_string()]);
    }

    #[tokio::test]
    async fn empty_recipient_set_never_hits_the_store() {
        // A client pointed at an unroutable address: any lookup would fail.
        let store = StoreClient::new(&marinex_config::SupabaseConfig {
            url: "http://127.0.0.1:1".to_string(),
            service_role_key: "k".to_string(),
        });
        let tokens = tokens_for(&store, &HashSet::new()).await.unwrap();
        assert!(tokens.is_empty());
    }
}
