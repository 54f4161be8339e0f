//! Shared building blocks for the remote database proxy client.
//!
//! Holds configuration resolution, the error type, the wire models exchanged
//! with the query endpoint, and a few small helpers.

pub mod config;
pub mod errors;
pub mod models;
pub mod response;
pub mod utils;

pub use config::{DatabaseConfig, EndpointShape, ResolvedConfig};
pub use errors::{AppError, AppResult};
