//! Error types for push delivery and credential handling

use marinex_common::HttpStatusCode;
use thiserror::Error;

/// Errors that can occur while obtaining a delivery access token.
///
/// All of these surface to callers as a 500 with a generic message; the full
/// context is logged server-side only.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The service account could not be decoded from either raw JSON or
    /// base64-encoded JSON, or is missing required fields.
    #[error("Malformed service account credential: {0}")]
    Malformed(String),

    /// The OAuth2 token endpoint rejected the signed assertion.
    #[error("Token exchange failed: status {status}")]
    ExchangeFailed { status: u16, body: String },

    /// The token endpoint answered 2xx but without an `access_token` field.
    #[error("Token endpoint response did not include access_token")]
    MalformedResponse,

    /// No project id in either the explicit override or the credential.
    #[error("Firebase project id not found. Set FCM_PROJECT_ID or include project_id in the service account.")]
    MissingProjectId,

    /// Failed to sign the assertion JWT.
    #[error("Failed to sign credential assertion: {0}")]
    SigningError(#[from] jsonwebtoken::errors::Error),

    /// Transport-level failure talking to the token endpoint.
    #[error("Token endpoint request error: {0}")]
    RequestError(#[from] reqwest::Error),
}

impl HttpStatusCode for CredentialError {
    fn status_code(&self) -> u16 {
        500
    }
}

/// Error for one token's delivery attempt. Never fatal for the batch: the
/// dispatcher logs it and moves on to the next token.
#[derive(Debug, Error)]
pub enum FcmError {
    /// Transport-level failure
    #[error("FCM request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Non-2xx response from the FCM API; the body is logged verbatim.
    #[error("FCM API error: status {status}: {body}")]
    ApiError { status: u16, body: String },
}
