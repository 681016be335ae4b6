//! Firebase Cloud Messaging delivery for the Marinex push service.
//!
//! Three pieces: [`credentials`] turns a service-account credential into
//! short-lived OAuth2 access tokens (cached, refreshed early),
//! [`client`] speaks the FCM HTTP v1 wire format for a single token, and
//! [`dispatcher`] fans one notification out to a whole token set with
//! bounded concurrency.

pub mod client;
pub mod credentials;
pub mod dispatcher;
pub mod error;

pub use client::{FcmClient, FcmMessage, FCM_ENDPOINT};
pub use credentials::{
    parse_service_account, resolve_project_id, CredentialStore, ParsedCredential, ServiceAccount,
    REFRESH_MARGIN_SECS,
};
pub use dispatcher::{DeliveryOutcome, PushDispatcher, DISPATCH_CONCURRENCY};
pub use error::{CredentialError, FcmError};
