// --- File: crates/marinex_common/src/error.rs ---
use serde::Serialize;

/// A trait for converting errors to HTTP status codes.
///
/// This trait is implemented by the error types of the individual crates to
/// provide a consistent mapping from the error taxonomy to response codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

/// The JSON body every error response carries.
///
/// `error` is a stable, client-safe message; `details` is only populated for
/// unexpected failures where the caller is the operator (never for store or
/// credential failures, whose detail is logged server-side only).
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}
