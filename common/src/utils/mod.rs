//! Utility functions and helpers.

pub mod id_generator;
pub mod statements;

// Re-export commonly used types
pub use id_generator::IdGenerator;
pub use statements::{split_statements, StatementKind, STATEMENT_BREAKPOINT};
