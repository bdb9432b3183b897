//! MCP Server implementation and lifecycle management.
//!
//! `McpServer` implements the MCP protocol for the stdio transport and is
//! shared by the HTTP transport. All tool work is delegated to the
//! `ToolRegistry`, so every transport validates and calls upstream the
//! same way.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::config::Config;
use super::error::Result;
use crate::domains::tools::{ToolError, ToolRegistry, ToolResult};

/// The main MCP server handler.
///
/// Cloning is cheap; clones share the configuration and the registry.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Tool table and upstream client.
    registry: Arc<ToolRegistry>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        let registry = ToolRegistry::new(&config)?;
        Ok(Self::with_registry(config, registry))
    }

    /// Create a server around an existing registry.
    pub fn with_registry(config: Config, registry: ToolRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the tool registry.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools with their HTTP paths and input schemas.
    pub fn list_tools_json(&self) -> Vec<Value> {
        self.registry
            .descriptors()
            .into_iter()
            .zip(self.registry.get_all_tools())
            .map(|(descriptor, tool)| {
                serde_json::json!({
                    "name": descriptor.name,
                    "path": descriptor.path,
                    "description": tool.description,
                    "inputSchema": tool.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult<Value> {
        self.registry.call_tool(name, arguments).await
    }

    /// Call a tool, giving up with `ToolError::Cancelled` once `ct` fires.
    pub async fn call_tool_cancellable(
        &self,
        name: &str,
        arguments: Value,
        ct: &CancellationToken,
    ) -> ToolResult<Value> {
        tokio::select! {
            _ = ct.cancelled() => {
                info!("Tool call {} cancelled by client", name);
                Err(ToolError::Cancelled)
            }
            result = self.registry.call_tool(name, arguments) => result,
        }
    }
}

/// Render a tool result as MCP text content.
pub(crate) fn tool_output(value: &Value) -> std::result::Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Failed to serialize result: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "Pharmacovigilance server for the drug/target safety knowledge base. \
                 Search drugs, targets and adverse events by name to obtain their ids, \
                 then use the ids to fetch alerts, masterviews, safety scores and \
                 related entities. Each tool description states which argument \
                 combinations it accepts."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    #[instrument(skip(self, _request, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        info!("Listing tools");
        Ok(ListToolsResult {
            tools: self.registry.get_all_tools(),
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, request, context), fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        // MCP carries arguments as an object; bare strings only reach us over HTTP.
        let arguments = request.arguments.map(Value::Object).unwrap_or(Value::Null);

        match self
            .call_tool_cancellable(&request.name, arguments, &context.ct)
            .await
        {
            Ok(value) => tool_output(&value),
            Err(err) => {
                warn!("Tool call failed: {}", err);
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::testing::MockUpstream;
    use rmcp::model::ErrorCode;
    use serde_json::json;
    use std::time::Duration;

    fn test_server() -> McpServer {
        McpServer::new(Config::new("test-token")).unwrap()
    }

    #[test]
    fn test_server_info() {
        let server = test_server();
        let info = server.get_info();
        assert_eq!(info.server_info.name, "pv-mcp-server");
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.instructions.is_some());
    }

    #[test]
    fn test_list_tools_json_has_paths_and_schemas() {
        let server = test_server();
        let tools = server.list_tools_json();
        assert_eq!(tools.len(), 10);

        let search = tools
            .iter()
            .find(|t| t["name"] == "search_drugs_by_name")
            .unwrap();
        assert_eq!(search["path"], "/search_drugs");
        assert_eq!(search["inputSchema"]["type"], "object");
        assert!(
            search["description"]
                .as_str()
                .unwrap()
                .contains("Required arguments")
        );
    }

    #[tokio::test]
    async fn test_call_unknown_tool_maps_to_method_not_found() {
        let server = test_server();
        let err = server.call_tool("nope", json!({})).await.unwrap_err();
        let mcp: McpError = err.into();
        assert_eq!(mcp.code, ErrorCode::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cancelled_call_stops_waiting_for_upstream() {
        let mock = MockUpstream::start_delayed(Duration::from_secs(5), json!({})).await;
        let server = McpServer::new(mock.config("tok")).unwrap();
        let ct = CancellationToken::new();

        let trigger = ct.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = server
            .call_tool_cancellable("get_drug", json!({"drug_id": "99402"}), &ct)
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Cancelled));
        assert_eq!(err.http_status(), 499);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_uncancelled_call_completes() {
        let body = json!([{"drug_id": 11204, "name": "aspirin"}]);
        let mock = MockUpstream::start(200, body.clone()).await;
        let server = McpServer::new(mock.config("tok")).unwrap();

        let result = server
            .call_tool_cancellable(
                "search_drugs_by_name",
                json!({"drug": "aspirin"}),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result, body);
        assert_eq!(mock.calls()[0].param("drug"), Some("aspirin"));
    }

    #[test]
    fn test_mcp_call_arguments_must_be_an_object() {
        let bare = serde_json::from_value::<CallToolRequestParam>(
            json!({"name": "search_drugs_by_name", "arguments": "aspirin"}),
        );
        assert!(bare.is_err());

        let object = serde_json::from_value::<CallToolRequestParam>(
            json!({"name": "search_drugs_by_name", "arguments": {"drug": "aspirin"}}),
        )
        .unwrap();
        assert_eq!(object.arguments.unwrap()["drug"], "aspirin");
    }

    #[test]
    fn test_tool_output_is_pretty_json_text() {
        let result = tool_output(&json!({"a": 1})).unwrap();
        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.content.len(), 1);
    }
}
