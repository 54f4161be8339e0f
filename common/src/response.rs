//! Error body returned by the query endpoint.
//!
//! A failed query may carry `{ "error": { "message": "..." } }`. Any other
//! body, or none at all, maps to the fixed fallback message.

use serde::Deserialize;

use crate::errors::AppError;

/// Failure envelope of the query endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorEnvelope {
    /// Error details (present when the remote explains itself).
    #[serde(default)]
    pub error: Option<RemoteError>,
}

/// Remote error details.
#[derive(Debug, Default, Deserialize)]
pub struct RemoteError {
    /// Human-readable error message.
    #[serde(default)]
    pub message: Option<String>,

    /// Error code, when the remote supplies one.
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorEnvelope {
    /// Parses a failure body, tolerating anything that is not the envelope.
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }

    /// Returns the remote error code, if any.
    pub fn code(&self) -> Option<&str> {
        self.error.as_ref().and_then(|e| e.code.as_deref())
    }

    /// Converts the envelope into a query error.
    pub fn into_error(self) -> AppError {
        AppError::query(self.error.and_then(|e| e.message))
    }
}
