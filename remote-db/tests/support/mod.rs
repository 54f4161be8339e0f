//! In-process stand-in for the remote query endpoint.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;

use remote_db::DatabaseConfig;

/// One request as seen by the mock endpoint.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub request_id: Option<String>,
    pub body: Value,
}

type Responder = dyn Fn(usize, &Value) -> (StatusCode, String) + Send + Sync;

#[derive(Clone)]
struct MockState {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    responder: Arc<Responder>,
}

/// Handle on a running mock endpoint.
pub struct MockRemote {
    pub url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockRemote {
    /// Starts a server answering every request with `responder(call_index, body)`.
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(usize, &Value) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            calls: Arc::clone(&calls),
            responder: Arc::new(responder),
        };
        let app = Router::new().fallback(handle).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            calls,
        }
    }

    /// Starts a server answering every request with the same status and body.
    pub async fn fixed(status: StatusCode, body: &'static str) -> Self {
        Self::start(move |_, _| (status, body.to_string())).await
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// App-scoped configuration pointing at this server.
    pub fn config(&self) -> DatabaseConfig {
        DatabaseConfig::new()
            .with_url(&self.url)
            .with_app_id("test-app")
            .with_token("test-token")
    }
}

async fn handle(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };

    let index = {
        let mut calls = state.calls.lock().unwrap();
        calls.push(RecordedCall {
            path: uri.path().to_string(),
            authorization: header("authorization"),
            content_type: header("content-type"),
            request_id: header("x-request-id"),
            body: body.clone(),
        });
        calls.len() - 1
    };

    (state.responder)(index, &body)
}
