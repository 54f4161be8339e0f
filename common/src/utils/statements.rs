//! SQL statement helpers.
//!
//! Splits migration files into individual statements and classifies
//! statements for log output.

/// Marker separating statements inside a generated migration file.
pub const STATEMENT_BREAKPOINT: &str = "--> statement-breakpoint";

/// Splits a migration file into statements.
///
/// Chunks are trimmed; empty chunks are dropped.
pub fn split_statements(sql: &str) -> Vec<String> {
    sql.split(STATEMENT_BREAKPOINT)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(String::from)
        .collect()
}

/// Coarse statement classification, used for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Modification,
    Definition,
    Other,
}

impl StatementKind {
    /// Classifies a statement by its leading keyword.
    pub fn of(sql: &str) -> Self {
        let sql_upper = sql.trim_start().to_uppercase();
        let starts = |kw: &str| sql_upper.starts_with(kw);

        if starts("SELECT") || starts("WITH") {
            StatementKind::Select
        } else if starts("INSERT") || starts("UPDATE") || starts("DELETE") {
            StatementKind::Modification
        } else if starts("CREATE") || starts("ALTER") || starts("DROP") {
            StatementKind::Definition
        } else {
            StatementKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Select => "select",
            StatementKind::Modification => "modification",
            StatementKind::Definition => "definition",
            StatementKind::Other => "other",
        }
    }
}
