//! Upstream pharmacovigilance API client.
//!
//! Every tool ends in exactly one `GET` against a fixed endpoint of the
//! upstream API. This module owns the endpoint table, the ordered query
//! representation and the HTTP call itself, including the auth token,
//! the per-call timeout and the mapping of failures onto `ToolError`.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::error::{ToolError, ToolResult};
use super::validation::FieldValue;
use crate::core::config::Config;

/// Fixed upstream endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    DrugSearch,
    DrugAlerts,
    DrugMasterview,
    DrugScore,
    TargetSearch,
    TargetAlerts,
    TargetMasterview,
    TargetScore,
    PrimaryTargetSearch,
    SecondaryTargetSearch,
    AdverseEventSearch,
}

impl Endpoint {
    /// Path relative to the configured base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::DrugSearch => "drug/search",
            Self::DrugAlerts => "drug/alerts",
            Self::DrugMasterview => "drug/masterview",
            Self::DrugScore => "drug/score",
            Self::TargetSearch => "target/search",
            Self::TargetAlerts => "target/alerts",
            Self::TargetMasterview => "target/masterview",
            Self::TargetScore => "target/score",
            Self::PrimaryTargetSearch => "target/search/primary",
            Self::SecondaryTargetSearch => "target/search/secondary",
            Self::AdverseEventSearch => "adverse-event/search",
        }
    }
}

/// Ordered query-string pairs for one upstream call, without the token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamQuery {
    pairs: Vec<(String, String)>,
}

impl UpstreamQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair unconditionally.
    pub fn push(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a pair when the field is present and non-empty.
    pub fn push_opt(&mut self, key: &str, value: &Option<FieldValue>) -> &mut Self {
        if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
            self.push(key, value);
        }
        self
    }

    /// Append a free-text field as supplied, when present and non-empty.
    pub fn push_verbatim_opt(&mut self, key: &str, value: &Option<FieldValue>) -> &mut Self {
        if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
            self.pairs.push((key.to_string(), value.verbatim()));
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.pairs.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// URL-encoded form, for logging.
    pub fn encoded(&self) -> String {
        serde_urlencoded::to_string(&self.pairs).unwrap_or_default()
    }
}

/// A fully validated upstream call: where to send it and with what query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub endpoint: Endpoint,
    pub query: UpstreamQuery,
}

impl UpstreamRequest {
    pub fn new(endpoint: Endpoint, query: UpstreamQuery) -> Self {
        Self { endpoint, query }
    }
}

/// HTTP client for the pharmacovigilance API.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct PvClient {
    http: Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl std::fmt::Debug for PvClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PvClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PvClient {
    /// Build a client from the server configuration.
    pub fn new(config: &Config) -> ToolResult<Self> {
        let timeout = config.upstream.timeout();
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pv-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ToolError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.upstream.base_url.trim_end_matches('/').to_string(),
            token: config.credentials.api_token.clone(),
            timeout,
        })
    }

    /// Full URL for an endpoint.
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }

    /// Issue the request once and return the parsed JSON body.
    pub async fn get(&self, request: &UpstreamRequest) -> ToolResult<Value> {
        let url = self.url(request.endpoint);
        debug!("GET {}?{}", url, request.query.encoded());

        let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(request.query.pairs().len() + 1);
        pairs.push(("token", self.token.as_str()));
        pairs.extend(request.query.pairs().iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let response = self
            .http
            .get(&url)
            .query(&pairs)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_reqwest_error(e))?;

        if !status.is_success() {
            warn!("Upstream {} returned {}", request.endpoint.path(), status);
            return Err(ToolError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            error!("Upstream {} returned invalid JSON: {}", request.endpoint.path(), e);
            ToolError::upstream(format!("invalid JSON in upstream response: {}", e))
        })
    }

    fn map_reqwest_error(&self, err: reqwest::Error) -> ToolError {
        if err.is_timeout() {
            warn!("Upstream request timed out after {:?}", self.timeout);
            return ToolError::Timeout(self.timeout);
        }
        error!("Upstream request failed: {}", err);
        // Drop the URL: it carries the token in its query string.
        ToolError::upstream(err.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::testing::MockUpstream;
    use serde_json::json;

    #[test]
    fn test_query_skips_empty_optional_fields() {
        let mut query = UpstreamQuery::new();
        query
            .push("page", 1)
            .push_opt("drug_id", &Some(FieldValue::from("11204")))
            .push_opt("target_id", &Some(FieldValue::from("")))
            .push_opt("action_id", &None);
        assert_eq!(query.keys(), vec!["page", "drug_id"]);
        assert_eq!(query.encoded(), "page=1&drug_id=11204");
    }

    #[test]
    fn test_verbatim_fields_keep_whitespace() {
        let mut query = UpstreamQuery::new();
        query
            .push_opt("drug_id", &Some(FieldValue::from(" 11204 ")))
            .push_verbatim_opt("alert_species", &Some(FieldValue::from(" Rat ")))
            .push_verbatim_opt("alert_causality", &Some(FieldValue::from("  ")));
        assert_eq!(query.get("drug_id"), Some("11204"));
        assert_eq!(query.get("alert_species"), Some(" Rat "));
        assert!(!query.contains("alert_causality"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = PvClient::new(&Config::new("very-secret")).unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("very-secret"));
    }

    #[tokio::test]
    async fn test_get_sends_token_and_returns_body() {
        let mock = MockUpstream::start(200, json!({"drugs": [{"id": 1}]})).await;
        let client = mock.client("tok-1");

        let mut query = UpstreamQuery::new();
        query.push("drug", "aspirin");
        let value = client
            .get(&UpstreamRequest::new(Endpoint::DrugSearch, query))
            .await
            .unwrap();

        assert_eq!(value, json!({"drugs": [{"id": 1}]}));
        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "/api/drug/search");
        assert_eq!(calls[0].param("token"), Some("tok-1"));
        assert_eq!(calls[0].param("drug"), Some("aspirin"));
    }

    #[tokio::test]
    async fn test_non_success_status_surfaces_status_and_body() {
        let mock = MockUpstream::start_text(404, "not found").await;
        let client = mock.client("tok");

        let err = client
            .get(&UpstreamRequest::new(Endpoint::DrugScore, UpstreamQuery::new()))
            .await
            .unwrap_err();

        match &err {
            ToolError::UpstreamStatus { status, body } => {
                assert_eq!(*status, 404);
                assert_eq!(body, "not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("404") && msg.contains("not found"));
        // No retry.
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_json_is_upstream_error() {
        let mock = MockUpstream::start_text(200, "<html>").await;
        let err = mock
            .client("tok")
            .get(&UpstreamRequest::new(Endpoint::TargetSearch, UpstreamQuery::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let mock = MockUpstream::start_delayed(Duration::from_secs(5), json!({})).await;
        let mut config = mock.config("tok");
        config.upstream.timeout_secs = 1;
        let client = PvClient::new(&config).unwrap();

        let err = client
            .get(&UpstreamRequest::new(Endpoint::DrugAlerts, UpstreamQuery::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Timeout(d) if d == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_connection_failure_is_upstream_error() {
        let mut config = Config::new("tok");
        // Port 9 (discard) on localhost is not expected to accept connections.
        config.upstream.base_url = "http://127.0.0.1:9/api".to_string();
        let client = PvClient::new(&config).unwrap();
        let err = client
            .get(&UpstreamRequest::new(Endpoint::DrugSearch, UpstreamQuery::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Upstream(_) | ToolError::Timeout(_)));
        assert!(!err.to_string().contains("tok"));
    }
}
