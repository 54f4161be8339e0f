//! Request ID generator.
//!
//! Every query carries an `x-request-id` header so the remote service can
//! correlate its logs with the caller's.

use uuid::Uuid;

/// Header name for the request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generates unique identifiers for outgoing requests.
pub struct IdGenerator;

impl IdGenerator {
    /// Generates a unique request ID.
    pub fn request_id() -> String {
        Uuid::new_v4().to_string()
    }
}
