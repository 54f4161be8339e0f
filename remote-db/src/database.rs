//! Database handle.
//!
//! Wraps a [`StatementExecutor`] in the shape a proxy-style client expects:
//! a callback of `(sql, params, method)` answering with `{ rows }`. Query
//! building and row decoding stay with the caller.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use common::config::DatabaseConfig;
use common::errors::AppResult;
use common::models::{QueryMethod, RowSet};

use crate::executor::{create_execute_query, StatementExecutor};

/// Creates a database handle carrying `schema`.
///
/// The executor is built from `config` immediately, so configuration errors
/// surface here rather than on the first query.
pub fn create_database<S>(schema: S, config: &DatabaseConfig) -> AppResult<Database<S>> {
    let executor = create_execute_query(config)?;
    Ok(Database::from_executor(executor, Some(schema)))
}

/// Creates a database handle without a schema, for plain SQL.
pub fn create_database_without_schema(config: &DatabaseConfig) -> AppResult<Database> {
    let executor = create_execute_query(config)?;
    Ok(Database::from_executor(executor, None))
}

/// Query-capable handle over a remote database.
pub struct Database<S = ()> {
    executor: Arc<dyn StatementExecutor>,
    schema: Option<Arc<S>>,
}

impl<S> Clone for Database<S> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            schema: self.schema.clone(),
        }
    }
}

impl<S> fmt::Debug for Database<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("has_schema", &self.schema.is_some())
            .finish_non_exhaustive()
    }
}

impl<S> Database<S> {
    /// Builds a handle around any executor.
    pub fn from_executor<E>(executor: E, schema: Option<S>) -> Self
    where
        E: StatementExecutor + 'static,
    {
        Self {
            executor: Arc::new(executor),
            schema: schema.map(Arc::new),
        }
    }

    /// The schema this handle was built with, if any.
    pub fn schema(&self) -> Option<&S> {
        self.schema.as_deref()
    }

    /// The executor every query on this handle goes through.
    pub fn executor(&self) -> &dyn StatementExecutor {
        self.executor.as_ref()
    }

    /// Proxy callback: runs one statement and re-shapes the result to `{ rows }`.
    pub async fn query(
        &self,
        sql: &str,
        params: &[Value],
        method: QueryMethod,
    ) -> AppResult<RowSet> {
        let result = self.executor.execute(sql, params, method).await?;
        Ok(RowSet::from(result))
    }

    /// Fetches a single row.
    pub async fn get(&self, sql: &str, params: &[Value]) -> AppResult<RowSet> {
        self.query(sql, params, QueryMethod::Get).await
    }

    /// Fetches all rows.
    pub async fn all(&self, sql: &str, params: &[Value]) -> AppResult<RowSet> {
        self.query(sql, params, QueryMethod::All).await
    }

    /// Executes a statement without a result set.
    pub async fn run(&self, sql: &str, params: &[Value]) -> AppResult<RowSet> {
        self.query(sql, params, QueryMethod::Run).await
    }

    /// Fetches column values as row sequences.
    pub async fn values(&self, sql: &str, params: &[Value]) -> AppResult<RowSet> {
        self.query(sql, params, QueryMethod::Values).await
    }
}
