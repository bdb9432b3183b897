//! HTTP transport implementation.
//!
//! Serves every tool as `POST /<tool path>` with a JSON body, plus tool
//! listing, a health probe and MCP JSON-RPC over POST on the configured
//! path. Errors are answered as `{error, code}` with an HTTP status that
//! reflects the failure class.

use axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use rmcp::{ServerHandler, model::ErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, instrument, warn};

use super::{
    TransportError, TransportResult,
    config::{DEFAULT_RPC_PATH, HttpConfig},
};
use crate::core::McpServer;
use crate::core::server::tool_output;
use crate::domains::tools::ToolError;

/// MCP protocol version announced by `initialize`.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code: code.0,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<Value>, method: &str) -> Self {
        Self::error(
            id,
            ErrorCode::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        )
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, ErrorCode::INVALID_REQUEST, msg)
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, ErrorCode::INVALID_PARAMS, msg)
    }

    /// Error response for a failed tool call.
    pub fn tool_error(id: Option<Value>, err: &ToolError) -> Self {
        Self::error(id, err.rpc_code(), err.to_string())
    }
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The MCP server instance.
    server: McpServer,
    /// Path of the JSON-RPC endpoint.
    rpc_path: Arc<str>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        self.config.bind_address()
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let tool_count = server.registry().tool_names().len();
        let rpc_path = effective_rpc_path(&server, &self.config).to_string();
        let app = router(server, &self.config);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (CORS {})", addr, cors_status);
        info!("  → Tools:    POST /<tool> ({} routes), POST /list_tools", tool_count);
        info!("  → JSON-RPC: POST {}", rpc_path);
        info!("  → Health:   GET /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Build the HTTP router for `server`.
pub fn router(server: McpServer, config: &HttpConfig) -> Router {
    let rpc_path = effective_rpc_path(&server, config);
    if rpc_path != config.rpc_path {
        warn!(
            "JSON-RPC path '{}' is already served by another route, using {}",
            config.rpc_path, rpc_path
        );
    }

    let descriptors = server.registry().descriptors();
    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/list_tools", post(list_tools))
        .route(rpc_path, post(handle_rpc));
    let state = AppState {
        server,
        rpc_path: Arc::from(rpc_path),
    };

    for descriptor in descriptors {
        let name = descriptor.name;
        app = app.route(
            descriptor.path,
            post(move |State(state): State<AppState>, body: Bytes| {
                handle_tool_call(state, name, body)
            }),
        );
    }

    let mut app = app
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// The configured JSON-RPC path, or the default when a POST route already owns it.
fn effective_rpc_path<'a>(server: &McpServer, config: &'a HttpConfig) -> &'a str {
    let path = config.rpc_path.as_str();
    if path == "/list_tools" || server.registry().name_for_path(path).is_some() {
        DEFAULT_RPC_PATH
    } else {
        path
    }
}

/// `{error, code}` body with the given status.
fn error_response(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Response {
    let body = json!({
        "error": message.into(),
        "code": code.0
    });
    (status, Json(body)).into_response()
}

fn tool_error_response(err: &ToolError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_response(status, err.rpc_code(), err.to_string())
}

/// Decode a tool request body. An empty body means no arguments.
fn parse_body(body: &[u8]) -> Result<Value, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    serde_json::from_slice(body).map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::PARSE_ERROR,
            format!("Malformed JSON body: {}", e),
        )
    })
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    let tools: Vec<&str> = state
        .server
        .registry()
        .descriptors()
        .iter()
        .map(|d| d.path)
        .collect();

    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP",
        "endpoints": {
            "health": "GET /health",
            "list_tools": "POST /list_tools",
            "tools": tools,
            "rpc": format!("POST {}", state.rpc_path)
        },
        "protocol": "JSON-RPC 2.0",
        "documentation": "POST a JSON object of tool arguments to a tool path, or JSON-RPC messages to the rpc endpoint"
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_tools(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "tools": state.server.list_tools_json() }))
}

async fn not_found(method: Method, uri: Uri) -> Response {
    warn!("No route for {} {}", method, uri.path());
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::METHOD_NOT_FOUND,
        format!("No tool or endpoint at {} {}", method, uri.path()),
    )
}

/// Handle `POST /<tool path>`.
#[instrument(skip(state, body))]
async fn handle_tool_call(state: AppState, name: &'static str, body: Bytes) -> Response {
    let arguments = match parse_body(&body) {
        Ok(arguments) => arguments,
        Err(response) => return response,
    };

    info!("HTTP tool call: {}", name);
    match state.server.call_tool(name, arguments).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => {
            warn!("Tool {} failed: {}", name, err);
            tool_error_response(&err)
        }
    }
}

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method))]
async fn handle_rpc(State(state): State<AppState>, body: Bytes) -> Response {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(raw) => raw,
        Err(e) => {
            let response =
                JsonRpcResponse::error(None, ErrorCode::PARSE_ERROR, format!("Parse error: {}", e));
            return Json(response).into_response();
        }
    };

    let id = raw.get("id").cloned();
    let request: JsonRpcRequest = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(e) => return Json(JsonRpcResponse::invalid_request(id, e.to_string())).into_response(),
    };

    tracing::Span::current().record("method", request.method.as_str());
    info!("Received JSON-RPC request: {}", request.method);

    if request.id.is_none() && request.method.starts_with("notifications/") {
        handle_notification(&request);
        return StatusCode::ACCEPTED.into_response();
    }

    Json(process_request(&state, request).await).into_response()
}

/// Process a JSON-RPC request and return the response.
async fn process_request(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id, "jsonrpc must be \"2.0\"");
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(state, request),
        "ping" => JsonRpcResponse::success(request.id, json!({})),
        "tools/list" => handle_tools_list(state, request),
        "tools/call" => handle_tools_call(state, request).await,
        method if method.starts_with("notifications/") => {
            handle_notification(&request);
            JsonRpcResponse::success(request.id, Value::Null)
        }
        method => {
            warn!("Unknown method: {}", method);
            JsonRpcResponse::method_not_found(request.id.clone(), method)
        }
    }
}

/// Handle initialize request.
fn handle_initialize(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing initialize request");

    let result = json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": state.server.name(),
            "version": state.server.version()
        },
        "instructions": state.server.get_info().instructions
    });

    JsonRpcResponse::success(request.id, result)
}

/// Handle tools/list request.
fn handle_tools_list(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing tools/list request");

    let tools = state.server.registry().get_all_tools();
    match serde_json::to_value(tools) {
        Ok(tools) => JsonRpcResponse::success(request.id, json!({ "tools": tools })),
        Err(e) => JsonRpcResponse::error(request.id, ErrorCode::INTERNAL_ERROR, e.to_string()),
    }
}

/// Handle tools/call request.
async fn handle_tools_call(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let Some(params) = request.params else {
        return JsonRpcResponse::invalid_params(request.id, "Missing params");
    };

    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return JsonRpcResponse::invalid_params(request.id, "Missing tool name");
    };

    info!("Processing tools/call request: {}", name);
    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    let result = match state.server.call_tool(name, arguments).await {
        Ok(value) => tool_output(&value),
        Err(err) => {
            warn!("Tool {} failed: {}", name, err);
            return JsonRpcResponse::tool_error(request.id, &err);
        }
    };

    match result.and_then(|r| {
        serde_json::to_value(r).map_err(|e| rmcp::ErrorData::internal_error(e.to_string(), None))
    }) {
        Ok(value) => JsonRpcResponse::success(request.id, value),
        Err(err) => JsonRpcResponse::error(request.id, err.code, err.message),
    }
}

/// Handle notifications (no response needed).
fn handle_notification(request: &JsonRpcRequest) {
    match request.method.as_str() {
        "notifications/initialized" => info!("Client sent initialized notification"),
        "notifications/cancelled" => {
            debug!("Client cancelled a request; HTTP calls end when the connection drops")
        }
        method => info!("Received notification: {}", method),
    }
}
