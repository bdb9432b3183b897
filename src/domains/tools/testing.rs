//! In-process mock of the upstream API for tests.
//!
//! Binds an axum server on `127.0.0.1:0`, answers every request with a fixed
//! status and body, and records the path and query of each call.

use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::client::PvClient;
use crate::core::config::Config;

/// One request received by the mock.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: String,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

pub struct MockUpstream {
    base_url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockUpstream {
    /// Answer every request with `status` and a JSON body.
    pub async fn start(status: u16, body: Value) -> Self {
        Self::spawn(status, body.to_string(), None).await
    }

    /// Answer every request with `status` and a plain-text body.
    pub async fn start_text(status: u16, body: &str) -> Self {
        Self::spawn(status, body.to_string(), None).await
    }

    /// Like `start`, but wait `delay` before answering.
    pub async fn start_delayed(delay: Duration, body: Value) -> Self {
        Self::spawn(200, body.to_string(), Some(delay)).await
    }

    async fn spawn(status: u16, body: String, delay: Option<Duration>) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status: StatusCode::from_u16(status).unwrap(),
            body,
            delay,
            calls: calls.clone(),
        };
        let app = Router::new().fallback(record).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            calls,
        }
    }

    /// Server configuration pointing at this mock.
    pub fn config(&self, token: &str) -> Config {
        let mut config = Config::new(token);
        config.upstream.base_url = self.base_url.clone();
        config
    }

    pub fn client(&self, token: &str) -> PvClient {
        PvClient::new(&self.config(token)).unwrap()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

async fn record(State(state): State<MockState>, uri: Uri) -> Response {
    let params: Vec<(String, String)> =
        serde_urlencoded::from_str(uri.query().unwrap_or("")).unwrap_or_default();
    state.calls.lock().unwrap().push(RecordedCall {
        path: uri.path().to_string(),
        params,
    });

    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
        .into_response()
}
