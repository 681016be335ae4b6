//! Error taxonomy for the notification endpoints.
//!
//! Every failure surfaces to the caller as one of the typed JSON shapes
//! `{error}` or `{error, details}`. Store and credential detail is logged
//! server-side and never forwarded.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use marinex_common::{ErrorBody, HttpStatusCode};
use marinex_fcm::CredentialError;
use marinex_store::StoreError;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// A required feature section is absent from the configuration.
    #[error("{0}")]
    Config(String),

    /// The caller could not be identified.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller is identified but not entitled to the operation.
    #[error("{0}")]
    Forbidden(String),

    /// The referenced subject does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The inbound event is missing required fields.
    #[error("{0}")]
    Validation(String),

    /// Obtaining push credentials failed. Full context is logged; the caller
    /// sees a generic message.
    #[error("Failed to obtain push credentials.")]
    Credential(#[from] CredentialError),

    /// A store lookup or insert failed; `public` is the client-safe message.
    #[error("{public}")]
    Store {
        public: String,
        #[source]
        source: StoreError,
    },
}

impl NotifyError {
    /// Wrap a store failure with the message the caller is allowed to see.
    pub fn store(public: impl Into<String>, source: StoreError) -> Self {
        Self::Store {
            public: public.into(),
            source,
        }
    }
}

impl HttpStatusCode for NotifyError {
    fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) | Self::Credential(_) | Self::Store { .. } => 500,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
        }
    }
}

impl IntoResponse for NotifyError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match &self {
            Self::Credential(source) => error!(error = %source, "Credential failure"),
            Self::Store { source, .. } => error!(error = %source, "Store failure"),
            Self::Config(message) => error!(message = %message, "Configuration failure"),
            _ => warn!(error = %self, "Request rejected"),
        }

        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_expose_only_the_public_message() {
        let err = NotifyError::store(
            "Could not load push tokens.",
            StoreError::ApiError {
                status: 503,
                body: "internal: connection pool exhausted".to_string(),
            },
        );
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "Could not load push tokens.");
    }

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(NotifyError::Validation("x".into()).status_code(), 400);
        assert_eq!(NotifyError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(NotifyError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(NotifyError::NotFound("x".into()).status_code(), 404);
        assert_eq!(NotifyError::Config("x".into()).status_code(), 500);
    }
}
