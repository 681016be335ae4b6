//! The launch-queue transition processor.
//!
//! A scheduler calls `POST /queue/process-transitions`; the store advances
//! due queue entries in one RPC and each transitioned entry is run through
//! the queue-status notification pipeline in-process. A per-entry
//! notification failure only increments a counter; the batch always reports
//! complete aggregate counts.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::NotifyError;
use crate::handlers::notify_queue_status;
use crate::state::AppState;

const QUEUE_SECRET_HEADER: &str = "x-queue-secret";
const CRON_SECRET_HEADER: &str = "x-cron-secret";

/// Query parameters; both spellings are accepted and invalid numbers fall
/// back to the default batch size rather than rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct TransitionParams {
    pub limit: Option<String>,
    pub max: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransitionSummary {
    pub processed: usize,
    pub notified: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_notifications: Option<usize>,
    pub max_batch: u32,
}

/// `POST /queue/process-transitions`.
pub async fn process_transitions_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<TransitionParams>,
) -> Result<Response, NotifyError> {
    let settings = state.config.queue_settings();

    // The secret gate runs before anything touches the store.
    if let Some(secret) = settings
        .transitions_secret
        .as_deref()
        .filter(|s| !s.is_empty())
    {
        let provided = headers
            .get(QUEUE_SECRET_HEADER)
            .or_else(|| headers.get(CRON_SECRET_HEADER))
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");
        if !constant_time_eq(provided.as_bytes(), secret.as_bytes()) {
            return Err(NotifyError::Unauthorized("Unauthorized".to_string()));
        }
    }

    let max_batch = resolve_batch_size(&params, settings.default_batch, settings.max_batch);

    let store = state.store()?;
    let entries = store
        .process_queue_transitions(max_batch)
        .await
        .map_err(|err| NotifyError::store("Failed to process queue transitions.", err))?;

    if entries.is_empty() {
        return Ok(Json(TransitionSummary {
            processed: 0,
            notified: 0,
            failed_notifications: None,
            max_batch,
        })
        .into_response());
    }

    let mut notified = 0usize;
    let mut failures = 0usize;
    for entry in &entries {
        let Some(entry_id) = entry.entry_id() else {
            continue;
        };
        let status = entry.new_status().unwrap_or("");
        match notify_queue_status(&state, entry_id, status).await {
            Ok(_) => notified += 1,
            Err(err) => {
                failures += 1;
                error!(entry_id, error = %err, "Failed to notify queue status");
            }
        }
    }

    info!(
        processed = entries.len(),
        notified, failures, "Queue transitions processed"
    );

    Ok(Json(TransitionSummary {
        processed: entries.len(),
        notified,
        failed_notifications: Some(failures),
        max_batch,
    })
    .into_response())
}

/// Effective batch size: `limit` wins over `max`; non-numeric or
/// non-positive values fall back to the default; the result never exceeds
/// the configured ceiling.
fn resolve_batch_size(params: &TransitionParams, default_batch: u32, max_batch: u32) -> u32 {
    params
        .limit
        .as_deref()
        .or(params.max.as_deref())
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|&n| n > 0)
        .map(|n| n.min(max_batch))
        .unwrap_or(default_batch)
}
