//! Query executor.
//!
//! Performs one HTTP `POST` per statement against the remote query endpoint
//! and normalizes the answer into a [`QueryResult`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use common::config::{DatabaseConfig, ResolvedConfig};
use common::errors::AppResult;
use common::models::{QueryMethod, QueryRequest, QueryResult};
use common::response::ErrorEnvelope;
use common::utils::id_generator::REQUEST_ID_HEADER;
use common::utils::{IdGenerator, StatementKind};

/// Executes a single SQL statement and returns its rows.
///
/// This is the callback a proxy-style database handle delegates to. Each
/// call is independent: no session, no retry, no timeout of its own.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    /// Executes `sql` with positional `params`, shaping rows per `method`.
    async fn execute(
        &self,
        sql: &str,
        params: &[Value],
        method: QueryMethod,
    ) -> AppResult<QueryResult>;
}

#[async_trait]
impl<E> StatementExecutor for Arc<E>
where
    E: StatementExecutor + ?Sized,
{
    async fn execute(
        &self,
        sql: &str,
        params: &[Value],
        method: QueryMethod,
    ) -> AppResult<QueryResult> {
        (**self).execute(sql, params, method).await
    }
}

/// Builds an executor from `config`, falling back to the environment.
///
/// Fails with a configuration error before any network activity when a
/// required field cannot be resolved.
pub fn create_execute_query(config: &DatabaseConfig) -> AppResult<HttpExecutor> {
    let resolved = config.resolve()?;
    Ok(HttpExecutor::from_resolved(&resolved))
}

/// [`StatementExecutor`] backed by the remote query endpoint.
#[derive(Clone)]
pub struct HttpExecutor {
    endpoint: String,
    token: String,
    http_client: reqwest::Client,
}

impl HttpExecutor {
    /// Creates an executor with a default HTTP client.
    pub fn from_resolved(config: &ResolvedConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Creates an executor that sends requests through `http_client`.
    pub fn with_client(config: &ResolvedConfig, http_client: reqwest::Client) -> Self {
        Self {
            endpoint: config.endpoint(),
            token: config.token().to_string(),
            http_client,
        }
    }

    /// The URL queries are POSTed to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for HttpExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpExecutor")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StatementExecutor for HttpExecutor {
    async fn execute(
        &self,
        sql: &str,
        params: &[Value],
        method: QueryMethod,
    ) -> AppResult<QueryResult> {
        let request_id = IdGenerator::request_id();
        let body = QueryRequest::new(sql, params.to_vec(), method);

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            kind = StatementKind::of(sql).as_str(),
            params = params.len(),
            "发送查询请求"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, &request_id)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let envelope = ErrorEnvelope::parse(&body);
            let code = envelope.code().map(String::from);
            let err = envelope.into_error();
            tracing::debug!(
                request_id = %request_id,
                status = status.as_u16(),
                code = code.as_deref().unwrap_or("-"),
                error = %err,
                "查询失败"
            );
            return Err(err);
        }

        let body = response.bytes().await?;
        let result: QueryResult = serde_json::from_slice(&body)?;

        tracing::debug!(
            request_id = %request_id,
            status = status.as_u16(),
            rows = result.row_count(),
            "查询完成"
        );
        Ok(result)
    }
}
