//! HTTP handlers for the four notification endpoints.
//!
//! Requests arrive in more than one field naming (snake and camel case ids);
//! each handler normalizes them once at the boundary and the rest of the
//! pipeline only sees the canonical form. Terminal no-op outcomes (no
//! recipients, no tokens) are 200 responses with a `message` field, never
//! errors.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::NotifyError;
use crate::events::{sanitize_data, EventKind, NotificationEvent};
use crate::pipeline::{dispatch_event, PipelineOutcome};
use crate::recipients::{resolve_boat_owners, resolve_marina_boat_owners, resolve_marina_staff};
use crate::registry;
use crate::state::AppState;
use crate::status::QueueStatus;

use marinex_fcm::DeliveryOutcome;

// --- Request bodies ---

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct LaunchRequestBody {
    #[serde(alias = "marinaId")]
    pub marina_id: Option<String>,
    #[serde(alias = "boatId")]
    pub boat_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WallPostRequest {
    #[serde(alias = "marinaId")]
    pub marina_id: Option<String>,
    #[serde(alias = "postId")]
    pub post_id: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub post_type: Option<String>,
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueueStatusRequest {
    #[serde(alias = "entryId", alias = "queue_entry_id", alias = "queueEntryId")]
    pub entry_id: Option<String>,
    pub status: Option<String>,
}

// --- Response bodies ---

/// Broadcast result; there is no recipient set, only targeted devices.
#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub delivered: usize,
    pub failed: usize,
    #[serde(rename = "targetedDevices")]
    pub targeted_devices: usize,
    #[serde(rename = "requestedBy")]
    pub requested_by: String,
}

/// Recipient-scoped delivery result.
#[derive(Debug, Serialize)]
pub struct DeliveryResponse {
    pub delivered: usize,
    pub failed: usize,
    #[serde(rename = "totalRecipients")]
    pub total_recipients: usize,
    #[serde(rename = "targetedDevices")]
    pub targeted_devices: usize,
}

/// A 200 no-op outcome: nothing to deliver, nothing went wrong.
#[derive(Debug, Serialize)]
pub struct SkipResponse {
    pub message: String,
    #[serde(rename = "totalRecipients", skip_serializing_if = "Option::is_none")]
    pub total_recipients: Option<usize>,
}

impl SkipResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            total_recipients: None,
        }
    }

    fn with_recipients(message: impl Into<String>, total: usize) -> Self {
        Self {
            message: message.into(),
            total_recipients: Some(total),
        }
    }
}

/// Outcome of the queue-status notification, shared between the HTTP handler
/// and the transition processor.
#[derive(Debug)]
pub(crate) enum QueueStatusOutcome {
    Skipped(SkipResponse),
    Delivered {
        outcome: DeliveryOutcome,
        total_recipients: usize,
        targeted_devices: usize,
    },
}

// --- Handlers ---

/// `POST /notify/admin-broadcast` — push to every registered device.
/// Requires an administrator bearer token. No per-recipient persistence.
pub async fn admin_broadcast_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<BroadcastRequest>,
) -> Result<Response, NotifyError> {
    let title = payload.title.as_deref().unwrap_or("").trim().to_string();
    let body = payload.body.as_deref().unwrap_or("").trim().to_string();
    if title.is_empty() || body.is_empty() {
        return Err(NotifyError::Validation(
            "Informe título e mensagem para enviar a notificação.".to_string(),
        ));
    }

    let store = state.store()?;

    let jwt = bearer_token(&headers).ok_or_else(|| {
        NotifyError::Unauthorized("Cabeçalho Authorization ausente. Faça login novamente.".to_string())
    })?;
    let user = store
        .get_user(jwt)
        .await
        .map_err(|err| NotifyError::store("Não foi possível validar o usuário.", err))?
        .ok_or_else(|| {
            NotifyError::Unauthorized("Não foi possível validar o usuário.".to_string())
        })?;

    let is_admin = store
        .is_administrator(&user.id)
        .await
        .map_err(|err| NotifyError::store("Falha ao verificar permissões do usuário.", err))?;
    if !is_admin {
        return Err(NotifyError::Forbidden(
            "Apenas administradores podem enviar notificações.".to_string(),
        ));
    }

    let tokens = registry::all_tokens(store)
        .await
        .map_err(|err| NotifyError::store("Falha ao carregar tokens de push.", err))?;
    if tokens.is_empty() {
        return Ok(Json(SkipResponse::new(
            "Nenhum token de push cadastrado no momento.",
        ))
        .into_response());
    }

    let push = state.push()?;
    let access_token = push.credentials.access_token().await?;

    let event = NotificationEvent::new(
        EventKind::AdminBroadcast,
        title,
        body,
        sanitize_data(payload.data.as_ref()),
    );
    let outcome = push
        .dispatcher
        .send(&tokens, &event.title, &event.body, &event.data, &access_token)
        .await;

    info!(
        requested_by = user.id.as_str(),
        delivered = outcome.success_count,
        failed = outcome.failure_count,
        "Admin broadcast dispatched"
    );

    Ok(Json(BroadcastResponse {
        delivered: outcome.success_count,
        failed: outcome.failure_count,
        targeted_devices: tokens.len(),
        requested_by: user.id,
    })
    .into_response())
}

/// `POST /notify/launch-request` — a boat asked to go in the water; notify
/// the marina staff and the boat's owners.
pub async fn launch_request_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LaunchRequestBody>,
) -> Result<Response, NotifyError> {
    let marina_id = non_empty(payload.marina_id);
    let boat_id = non_empty(payload.boat_id);
    let (Some(marina_id), Some(boat_id)) = (marina_id, boat_id) else {
        return Err(NotifyError::Validation(
            "Parâmetros obrigatórios ausentes. Informe marina_id e boat_id.".to_string(),
        ));
    };

    let store = state.store()?;
    let boat = store
        .fetch_boat(&boat_id)
        .await
        .map_err(|err| NotifyError::store("Falha ao carregar dados da embarcação.", err))?
        .ok_or_else(|| NotifyError::NotFound("Embarcação não encontrada.".to_string()))?;

    let staff = resolve_marina_staff(store, &marina_id)
        .await
        .map_err(|err| NotifyError::store("Falha ao carregar perfis da marina.", err))?;
    let mut recipients: HashSet<String> = staff;
    recipients.extend(resolve_boat_owners(&boat));

    if recipients.is_empty() {
        return Ok(Json(SkipResponse::new(
            "Nenhum usuário elegível encontrado para receber o push.",
        ))
        .into_response());
    }

    let boat_name = boat.name.as_deref().unwrap_or("Embarcação");
    let marina_name = boat.marina_name.as_deref().unwrap_or("marina");
    let body = format!("A embarcação {boat_name} solicitou descida na {marina_name}.");

    let mut data = HashMap::new();
    data.insert("marina_id".to_string(), marina_id);
    data.insert("boat_id".to_string(), boat_id);
    let event = NotificationEvent::new(
        EventKind::BoatLaunchRequest,
        "Solicitação de descida",
        body,
        data,
    );

    let push = state.push()?;
    match dispatch_event(store, push, &recipients, &event, true).await? {
        PipelineOutcome::Delivered {
            outcome,
            total_recipients,
            targeted_devices,
        } => Ok(Json(DeliveryResponse {
            delivered: outcome.success_count,
            failed: outcome.failure_count,
            total_recipients,
            targeted_devices,
        })
        .into_response()),
        PipelineOutcome::NoTokens { total_recipients } => Ok(Json(SkipResponse::with_recipients(
            "Nenhum token de push encontrado para os destinatários.",
            total_recipients,
        ))
        .into_response()),
        PipelineOutcome::NoRecipients => Ok(Json(SkipResponse::new(
            "Nenhum usuário elegível encontrado para receber o push.",
        ))
        .into_response()),
    }
}

/// `POST /notify/wall-post` — a new publication on the marina wall; notify
/// the owners of every boat berthed there. No persistence.
pub async fn wall_post_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WallPostRequest>,
) -> Result<Response, NotifyError> {
    let Some(marina_id) = non_empty(payload.marina_id) else {
        return Err(NotifyError::Validation("marina_id is required.".to_string()));
    };
    let post_id = non_empty(payload.post_id).unwrap_or_default();
    let post_title = payload.title.as_deref().unwrap_or("").trim().to_string();
    let post_type = payload.post_type.as_deref().unwrap_or("").trim().to_string();

    let store = state.store()?;
    let marina = store
        .fetch_marina(&marina_id)
        .await
        .map_err(|err| NotifyError::store("Could not load marina.", err))?
        .ok_or_else(|| NotifyError::NotFound("Marina not found.".to_string()))?;

    let boats = store
        .boats_for_marina(&marina_id)
        .await
        .map_err(|err| NotifyError::store("Could not load boats for marina.", err))?;
    let recipients = resolve_marina_boat_owners(&boats);
    if recipients.is_empty() {
        return Ok(Json(SkipResponse::new(
            "No eligible boat owners found for this marina.",
        ))
        .into_response());
    }

    let marina_name = marina.name.as_deref().unwrap_or("marina");
    let title = format!("Nova publicacao na {marina_name}").trim().to_string();

    let type_label = resolve_type_label(&post_type);
    let date_label = format_date_range(payload.start_date.as_deref(), payload.end_date.as_deref());
    let mut parts: Vec<&str> = Vec::new();
    if !type_label.is_empty() {
        parts.push(type_label);
    }
    if !post_title.is_empty() {
        parts.push(&post_title);
    }
    let mut body = parts.join(" · ");
    if !date_label.is_empty() {
        body.push_str(&format!(" ({date_label})"));
    }
    let body = body.trim().to_string();
    let body = if body.is_empty() { title.clone() } else { body };

    let mut data = HashMap::new();
    data.insert("marina_id".to_string(), marina_id);
    data.insert("post_id".to_string(), post_id);
    if !post_type.is_empty() {
        data.insert("type".to_string(), post_type);
    }
    if let Some(start) = non_empty(payload.start_date) {
        data.insert("start_date".to_string(), start);
    }
    if let Some(end) = non_empty(payload.end_date) {
        data.insert("end_date".to_string(), end);
    }
    let event = NotificationEvent::new(EventKind::MarinaWallPost, title, body, data);

    let push = state.push()?;
    match dispatch_event(store, push, &recipients, &event, false).await? {
        PipelineOutcome::Delivered {
            outcome,
            total_recipients,
            targeted_devices,
        } => Ok(Json(DeliveryResponse {
            delivered: outcome.success_count,
            failed: outcome.failure_count,
            total_recipients,
            targeted_devices,
        })
        .into_response()),
        PipelineOutcome::NoTokens { total_recipients } => Ok(Json(SkipResponse::with_recipients(
            "No push tokens found for the recipients.",
            total_recipients,
        ))
        .into_response()),
        PipelineOutcome::NoRecipients => Ok(Json(SkipResponse::new(
            "No eligible boat owners found for this marina.",
        ))
        .into_response()),
    }
}

/// `POST /notify/queue-status` — a queue entry changed status; notify the
/// boat's owners.
pub async fn queue_status_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueueStatusRequest>,
) -> Result<Response, NotifyError> {
    let Some(entry_id) = non_empty(payload.entry_id) else {
        return Err(NotifyError::Validation("entry_id is required.".to_string()));
    };
    let provided_status = payload
        .status
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    match notify_queue_status(&state, &entry_id, &provided_status).await? {
        QueueStatusOutcome::Skipped(skip) => Ok(Json(skip).into_response()),
        QueueStatusOutcome::Delivered {
            outcome,
            total_recipients,
            targeted_devices,
        } => Ok(Json(DeliveryResponse {
            delivered: outcome.success_count,
            failed: outcome.failure_count,
            total_recipients,
            targeted_devices,
        })
        .into_response()),
    }
}

/// The queue-status pipeline proper, also invoked once per transitioned
/// entry by the processor.
pub(crate) async fn notify_queue_status(
    state: &AppState,
    entry_id: &str,
    provided_status: &str,
) -> Result<QueueStatusOutcome, NotifyError> {
    let store = state.store()?;

    let entry = store
        .fetch_queue_entry(entry_id)
        .await
        .map_err(|err| NotifyError::store("Could not load queue entry.", err))?
        .ok_or_else(|| NotifyError::NotFound("Queue entry not found.".to_string()))?;

    let Some(boat_id) = entry.boat_id.as_deref().filter(|id| !id.is_empty()) else {
        return Ok(QueueStatusOutcome::Skipped(SkipResponse::new(
            "No boat linked to this queue entry. Notification skipped.",
        )));
    };

    let status = if provided_status.is_empty() {
        entry.status.as_deref().unwrap_or("").to_string()
    } else {
        provided_status.to_string()
    };

    let boat = store
        .fetch_boat(boat_id)
        .await
        .map_err(|err| NotifyError::store("Could not load boat.", err))?
        .ok_or_else(|| NotifyError::NotFound("Boat not found for this entry.".to_string()))?;

    let recipients = resolve_boat_owners(&boat);
    if recipients.is_empty() {
        return Ok(QueueStatusOutcome::Skipped(SkipResponse::new(
            "No eligible boat owners found to receive notification.",
        )));
    }

    let boat_name = boat
        .name
        .as_deref()
        .or(entry.boat_name.as_deref())
        .or(entry.generic_boat_name.as_deref())
        .unwrap_or("Embarcação");
    let marina_name = entry.marina_name.as_deref().unwrap_or("marina");
    let label = QueueStatus::parse(&status);

    let title = format!("Fila - {marina_name}");
    let body = format!("Status de {boat_name}: {}.", label.label());

    let mut data = HashMap::new();
    data.insert("queue_entry_id".to_string(), entry_id.to_string());
    data.insert(
        "marina_id".to_string(),
        entry.marina_id.clone().unwrap_or_default(),
    );
    data.insert("boat_id".to_string(), boat_id.to_string());
    data.insert("status".to_string(), status);
    let event = NotificationEvent::new(EventKind::QueueStatusUpdate, title, body, data);

    let push = state.push()?;
    match dispatch_event(store, push, &recipients, &event, true).await? {
        PipelineOutcome::Delivered {
            outcome,
            total_recipients,
            targeted_devices,
        } => Ok(QueueStatusOutcome::Delivered {
            outcome,
            total_recipients,
            targeted_devices,
        }),
        PipelineOutcome::NoTokens { total_recipients } => {
            Ok(QueueStatusOutcome::Skipped(SkipResponse::with_recipients(
                "No push tokens found for recipients.",
                total_recipients,
            )))
        }
        PipelineOutcome::NoRecipients => Ok(QueueStatusOutcome::Skipped(SkipResponse::new(
            "No eligible boat owners found to receive notification.",
        ))),
    }
}

// --- Helpers ---

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Extract the bearer token from the Authorization header,
/// scheme-case-insensitive.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn resolve_type_label(post_type: &str) -> &'static str {
    match post_type.to_lowercase().as_str() {
        "evento" => "Evento",
        "aviso" => "Aviso",
        "publicidade" => "Publicidade",
        _ => "",
    }
}

/// `dd/mm/yyyy` label for a publication date range: a single date when both
/// sides are equal or one is missing/unparseable, empty when neither parses.
fn format_date_range(start: Option<&str>, end: Option<&str>) -> String {
    let start = start.and_then(parse_date);
    let end = end.and_then(parse_date);
    match (start, end) {
        (Some(s), Some(e)) if s == e => format_date(s),
        (Some(s), Some(e)) => format!("{} - {}", format_date(s), format_date(e)),
        (Some(s), None) => format_date(s),
        (None, Some(e)) => format_date(e),
        (None, None) => String::new(),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_is_scheme_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("bearer abc.def"),
        );
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Token abc"),
        );
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn date_range_collapses_equal_dates() {
        assert_eq!(
            format_date_range(Some("2026-03-15"), Some("2026-03-15")),
            "15/03/2026"
        );
        assert_eq!(
            format_date_range(Some("2026-03-15"), Some("2026-03-18")),
            "15/03/2026 - 18/03/2026"
        );
        assert_eq!(format_date_range(None, Some("2026-03-18")), "18/03/2026");
        assert_eq!(format_date_range(Some("garbage"), None), "");
    }

    #[test]
    fn type_labels_normalize_case() {
        assert_eq!(resolve_type_label("EVENTO"), "Evento");
        assert_eq!(resolve_type_label("aviso"), "Aviso");
        assert_eq!(resolve_type_label("outro"), "");
    }

    #[test]
    fn queue_status_request_accepts_all_id_namings() {
        for body in [
            r#"{"entry_id":"e-1"}"#,
            r#"{"entryId":"e-1"}"#,
            r#"{"queue_entry_id":"e-1"}"#,
            r#"{"queueEntryId":"e-1"}"#,
        ] {
            let req: QueueStatusRequest = serde_json::from_str(body).unwrap();
            assert_eq!(req.entry_id.as_deref(), Some("e-1"));
        }
    }

    #[test]
    fn launch_request_accepts_camel_case_ids() {
        let req: LaunchRequestBody =
            serde_json::from_str(r#"{"marinaId":"m-1","boatId":"b-1"}"#).unwrap();
        assert_eq!(req.marina_id.as_deref(), Some("m-1"));
        assert_eq!(req.boat_id.as_deref(), Some("b-1"));
    }

    #[test]
    fn skip_response_omits_recipients_when_absent() {
        let json = serde_json::to_string(&SkipResponse::new("msg")).unwrap();
        assert_eq!(json, r#"{"message":"msg"}"#);
        let json =
            serde_json::to_string(&SkipResponse::with_recipients("msg", 4)).unwrap();
        assert!(json.contains(r#""totalRecipients":4"#));
    }
}
