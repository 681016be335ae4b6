//! Notification event kinds and payload construction.

use std::collections::HashMap;

use serde_json::Value;

/// The four notification kinds the engine emits. Each carries a fixed tag in
/// `data["event"]` so client apps can route taps without parsing the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    AdminBroadcast,
    BoatLaunchRequest,
    MarinaWallPost,
    QueueStatusUpdate,
}

impl EventKind {
    pub fn tag(self) -> &'static str {
        match self {
            Self::AdminBroadcast => "admin_broadcast",
            Self::BoatLaunchRequest => "boat_launch_request",
            Self::MarinaWallPost => "marina_wall_post",
            Self::QueueStatusUpdate => "queue_status_update",
        }
    }
}

/// One logical notification: what every targeted device receives.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub kind: EventKind,
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

impl NotificationEvent {
    /// Build an event. `data["event"]` is always set to the kind's tag;
    /// a caller-supplied `event` value is overwritten.
    pub fn new(
        kind: EventKind,
        title: impl Into<String>,
        body: impl Into<String>,
        mut data: HashMap<String, String>,
    ) -> Self {
        data.insert("event".to_string(), kind.tag().to_string());
        Self {
            kind,
            title: title.into(),
            body: body.into(),
            data,
        }
    }

    /// The data payload as a JSON object for persistence.
    pub fn data_json(&self) -> Value {
        Value::Object(
            self.data
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

/// Flatten an arbitrary caller-supplied JSON map into the string-to-string
/// payload FCM requires. String values pass through as-is, everything else is
/// stringified, empty keys are dropped.
pub fn sanitize_data(input: Option<&Value>) -> HashMap<String, String> {
    let mut payload = HashMap::new();
    if let Some(Value::Object(map)) = input {
        for (key, value) in map {
            if key.is_empty() {
                continue;
            }
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            payload.insert(key.clone(), rendered);
        }
    }
    payload
}
