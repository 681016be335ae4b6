//! Firebase Cloud Messaging client module
//!
//! Wire model and single-token send for the FCM HTTP v1 API. One delivery
//! request per device token; the fan-out over many tokens lives in
//! [`crate::dispatcher`].

use std::collections::HashMap;

use reqwest::{header, Client};
use serde::Serialize;
use tracing::debug;

use marinex_common::HTTP_CLIENT;

use crate::error::FcmError;

/// Production FCM endpoint.
pub const FCM_ENDPOINT: &str = "https://fcm.googleapis.com";

/// A message to be sent via Firebase Cloud Messaging.
///
/// This is the top-level structure that wraps a Message object according to
/// the FCM HTTP v1 API format.
#[derive(Debug, Serialize)]
pub struct FcmMessage {
    pub message: Message,
}

/// The message payload for one device token.
#[derive(Debug, Serialize)]
pub struct Message {
    /// Registration token of the target device.
    pub token: String,
    /// The notification displayed on the device.
    pub notification: Notification,
    /// Custom key-value data delivered alongside the notification.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub data: HashMap<String, String>,
    /// Android delivery hints.
    pub android: AndroidConfig,
    /// iOS delivery hints.
    pub apns: ApnsConfig,
}

/// The notification to be displayed on the user's device.
#[derive(Debug, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct AndroidConfig {
    pub notification: AndroidNotification,
}

#[derive(Debug, Serialize)]
pub struct AndroidNotification {
    pub sound: String,
}

#[derive(Debug, Serialize)]
pub struct ApnsConfig {
    pub payload: ApnsPayload,
}

#[derive(Debug, Serialize)]
pub struct ApnsPayload {
    pub aps: Aps,
}

#[derive(Debug, Serialize)]
pub struct Aps {
    pub sound: String,
}

impl FcmMessage {
    /// Build the standard message for one token: notification + data payload
    /// plus the default-sound hints both platforms expect.
    pub fn for_token(
        token: &str,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
    ) -> Self {
        Self {
            message: Message {
                token: token.to_string(),
                notification: Notification {
                    title: title.to_string(),
                    body: body.to_string(),
                },
                data: data.clone(),
                android: AndroidConfig {
                    notification: AndroidNotification {
                        sound: "default".to_string(),
                    },
                },
                apns: ApnsConfig {
                    payload: ApnsPayload {
                        aps: Aps {
                            sound: "default".to_string(),
                        },
                    },
                },
            },
        }
    }
}

/// Client for the Firebase Cloud Messaging HTTP v1 API.
#[derive(Debug, Clone)]
pub struct FcmClient {
    http: Client,
    project_id: String,
    base_url: String,
}

impl FcmClient {
    /// Creates a new client for the given Firebase project.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self::with_base_url(project_id, FCM_ENDPOINT)
    }

    /// Creates a client against a non-default endpoint (tests).
    pub fn with_base_url(project_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: HTTP_CLIENT.clone(),
            project_id: project_id.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Send one notification to one device token.
    ///
    /// # Errors
    ///
    /// Returns `FcmError::ApiError` with the verbatim response body on a
    /// non-2xx answer, or `FcmError::RequestError` on transport failure.
    pub async fn send_to_token(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: &HashMap<String, String>,
        access_token: &str,
    ) -> Result<(), FcmError> {
        let url = format!(
            "{}/v1/projects/{}/messages:send",
            self.base_url, self.project_id
        );
        let message = FcmMessage::for_token(token, title, body, data);

        let response = self
            .http
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FcmError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        debug!(token, "Delivered push notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_to_the_v1_shape() {
        let mut data = HashMap::new();
        data.insert("event".to_string(), "queue_status_update".to_string());
        let message = FcmMessage::for_token("tok-1", "Fila - Marina Azul", "Status: Na água.", &data);

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["message"]["token"], "tok-1");
        assert_eq!(json["message"]["notification"]["title"], "Fila - Marina Azul");
        assert_eq!(json["message"]["data"]["event"], "queue_status_update");
        assert_eq!(json["message"]["android"]["notification"]["sound"], "default");
        assert_eq!(json["message"]["apns"]["payload"]["aps"]["sound"], "default");
    }

    #[test]
    fn empty_data_is_omitted() {
        let message = FcmMessage::for_token("tok-1", "t", "b", &HashMap::new());
        let json = serde_json::to_value(&message).unwrap();
        assert!(json["message"].get("data").is_none());
    }
}
