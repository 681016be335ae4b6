//! The shared delivery pipeline: recipients → tokens → access token →
//! fan-out → best-effort persistence.
//!
//! Used by the recipient-scoped notification endpoints and by the queue
//! transition processor. Administrative broadcasts bypass it because they
//! target every registered token rather than a recipient set.

use std::collections::HashSet;

use marinex_fcm::DeliveryOutcome;
use marinex_store::StoreClient;

use crate::error::NotifyError;
use crate::events::NotificationEvent;
use crate::persister;
use crate::registry;
use crate::state::PushContext;

/// Terminal result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The push was attempted; counts are exact per token.
    Delivered {
        outcome: DeliveryOutcome,
        total_recipients: usize,
        targeted_devices: usize,
    },
    /// No one is entitled to this notification. Not an error.
    NoRecipients,
    /// Recipients exist but none has a registered device. Not an error.
    NoTokens { total_recipients: usize },
}

/// Run the pipeline for one event against a resolved recipient set.
///
/// `persist_records` controls whether a notification record is written per
/// recipient after the push; persistence failures never change the outcome.
pub async fn dispatch_event(
    store: &StoreClient,
    push: &PushContext,
    recipients: &HashSet<String>,
    event: &NotificationEvent,
    persist_records: bool,
) -> Result<PipelineOutcome, NotifyError> {
    if recipients.is_empty() {
        return Ok(PipelineOutcome::NoRecipients);
    }

    let tokens = registry::tokens_for(store, recipients)
        .await
        .map_err(|err| NotifyError::store("Could not load push tokens.", err))?;

    if tokens.is_empty() {
        return Ok(PipelineOutcome::NoTokens {
            total_recipients: recipients.len(),
        });
    }

    let access_token = push.credentials.access_token().await?;
    let outcome = push
        .dispatcher
        .send(&tokens, &event.title, &event.body, &event.data, &access_token)
        .await;

    if persist_records {
        persister::persist(store, persister::records_for(recipients, event)).await;
    }

    Ok(PipelineOutcome::Delivered {
        outcome,
        total_recipients: recipients.len(),
        targeted_devices: tokens.len(),
    })
}
