//! Error types shared by the client crates.

use thiserror::Error;

/// Message used when the remote rejects a query without a readable error body.
pub const QUERY_FAILED_FALLBACK: &str = "Query failed";

/// Unified error type.
///
/// Every variant propagates to the caller as-is; nothing in this workspace
/// retries or recovers locally.
#[derive(Debug, Error)]
pub enum AppError {
    /// Required configuration is missing or malformed. Raised before any I/O.
    #[error("{0}")]
    Config(String),

    /// The query endpoint answered with a non-success status.
    ///
    /// Carries the remote `error.message` or [`QUERY_FAILED_FALLBACK`].
    #[error("{0}")]
    Query(String),

    /// Transport-level failure (connection refused, timeout, body read).
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// A body could not be encoded or decoded as JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The migrations folder could not be read or parsed.
    #[error("migration error: {0}")]
    Migration(String),
}

impl AppError {
    /// Builds a query error from an optional remote message.
    pub fn query(message: Option<String>) -> Self {
        match message {
            Some(message) if !message.is_empty() => AppError::Query(message),
            _ => AppError::Query(QUERY_FAILED_FALLBACK.to_string()),
        }
    }

    /// Returns true for configuration errors.
    pub fn is_config(&self) -> bool {
        matches!(self, AppError::Config(_))
    }

    /// Returns true for errors reported by the remote query endpoint.
    pub fn is_query(&self) -> bool {
        matches!(self, AppError::Query(_))
    }
}

/// Result alias used across the workspace.
pub type AppResult<T> = Result<T, AppError>;
