//! Remote database client over an HTTP query proxy.
//!
//! Each statement becomes one `POST` to the remote query endpoint:
//!
//! - [`create_execute_query`] builds the [`StatementExecutor`] that performs
//!   those requests.
//! - [`create_database`] / [`create_database_without_schema`] wrap an executor
//!   into a [`Database`] handle.
//! - [`run_migrations`] / [`create_migration_runner`] apply a migrations
//!   folder one statement at a time through a fresh executor.

pub mod database;
pub mod executor;
pub mod journal;
pub mod migrate;

pub use database::{create_database, create_database_without_schema, Database};
pub use executor::{create_execute_query, HttpExecutor, StatementExecutor};
pub use journal::{JournalMigrator, LastApplied};
pub use migrate::{
    create_migration_runner, run_migrations, run_migrations_with, MigrationApplier,
    MigrationOptions, MigrationRunner, Migrator, SequentialApplier, DEFAULT_MIGRATIONS_FOLDER,
};

pub use common::config::{DatabaseConfig, EndpointShape, ResolvedConfig};
pub use common::errors::{AppError, AppResult};
pub use common::models::{QueryMethod, QueryRequest, QueryResult, RowSet};

// Re-export third-party types used in the public API
pub use serde_json::Value as JsonValue;
