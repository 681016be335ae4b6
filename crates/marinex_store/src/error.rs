//! Error types for the store client

use marinex_common::HttpStatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the Supabase store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("Store request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Non-2xx response from the store. The body is kept for server-side
    /// logging and never forwarded to clients.
    #[error("Store API error: status {status}")]
    ApiError { status: u16, body: String },

    /// Missing store configuration
    #[error("Store configuration error: {0}")]
    ConfigError(String),
}

impl HttpStatusCode for StoreError {
    fn status_code(&self) -> u16 {
        // Every store failure aborts the request with a generic 500; detail
        // stays in the server logs.
        500
    }
}
