//! Wire models exchanged with the query endpoint.

pub mod query;

// Re-export commonly used types
pub use query::{QueryMethod, QueryRequest, QueryResult, RowSet};
