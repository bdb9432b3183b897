//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - The fixed table of available tools
//! - Lookup by tool name or HTTP path
//! - Dispatch of a call to the matching tool, used by every transport

use rmcp::model::Tool;
use serde_json::Value;
use tracing::{instrument, warn};

use super::client::PvClient;
use super::definitions::{
    GetAdverseEventsTool, GetAlertsTool, GetDrugTool, GetDrugsTool, GetScoreTool,
    GetTargetTool, GetTargetsTool, SearchAdverseEventsTool, SearchDrugsTool, SearchTargetsTool,
};
use super::error::{ToolError, ToolResult};
use super::handlers::{Handler, ToolDescriptor, ToolHandler};
use crate::core::config::Config;

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - owns the tool handlers and the upstream client.
pub struct ToolRegistry {
    handlers: Vec<Box<dyn ToolHandler>>,
    client: PvClient,
}

impl ToolRegistry {
    /// Create a registry whose tools call the API described by `config`.
    pub fn new(config: &Config) -> ToolResult<Self> {
        Ok(Self::with_client(PvClient::new(config)?))
    }

    /// Create a registry around an existing client.
    pub fn with_client(client: PvClient) -> Self {
        Self {
            handlers: Self::all_handlers(),
            client,
        }
    }

    fn all_handlers() -> Vec<Box<dyn ToolHandler>> {
        vec![
            Handler::<SearchDrugsTool>::boxed(),
            Handler::<GetDrugsTool>::boxed(),
            Handler::<GetAlertsTool>::boxed(),
            Handler::<GetScoreTool>::boxed(),
            Handler::<GetDrugTool>::boxed(),
            Handler::<SearchAdverseEventsTool>::boxed(),
            Handler::<GetAdverseEventsTool>::boxed(),
            Handler::<SearchTargetsTool>::boxed(),
            Handler::<GetTargetTool>::boxed(),
            Handler::<GetTargetsTool>::boxed(),
        ]
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Listing entries for every tool.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.handlers.iter().map(|h| h.descriptor()).collect()
    }

    /// Get all tools as MCP Tool models (metadata).
    ///
    /// This is the single source of truth for all available tools.
    pub fn get_all_tools(&self) -> Vec<Tool> {
        self.handlers.iter().map(|h| h.to_tool()).collect()
    }

    /// Find a tool by name.
    pub fn find(&self, name: &str) -> Option<&dyn ToolHandler> {
        self.handlers
            .iter()
            .find(|h| h.name() == name)
            .map(|h| h.as_ref())
    }

    /// Find the name of the tool served at an HTTP path.
    pub fn name_for_path(&self, path: &str) -> Option<&'static str> {
        self.handlers
            .iter()
            .find(|h| h.http_path() == path)
            .map(|h| h.name())
    }

    /// Dispatch a tool call to the appropriate handler.
    #[instrument(skip(self, arguments))]
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult<Value> {
        let Some(handler) = self.find(name) else {
            warn!("Unknown tool requested: {}", name);
            return Err(ToolError::not_found(name));
        };
        handler.call(arguments, &self.client).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::testing::MockUpstream;
    use serde_json::json;
    use std::collections::HashSet;

    fn test_registry() -> ToolRegistry {
        ToolRegistry::new(&Config::new("test-token")).unwrap()
    }

    #[test]
    fn test_registry_tool_names() {
        let registry = test_registry();
        let names = registry.tool_names();
        assert_eq!(names.len(), 10);
        for expected in [
            "search_drugs_by_name",
            "get_drugs",
            "get_alerts",
            "get_score",
            "get_drug",
            "search_adverse_events",
            "get_adverse_events",
            "search_targets",
            "get_target",
            "get_targets",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_names_and_paths_are_unique() {
        let registry = test_registry();
        let descriptors = registry.descriptors();
        let names: HashSet<_> = descriptors.iter().map(|d| d.name).collect();
        let paths: HashSet<_> = descriptors.iter().map(|d| d.path).collect();
        assert_eq!(names.len(), descriptors.len());
        assert_eq!(paths.len(), descriptors.len());
        assert!(descriptors.iter().all(|d| d.path.starts_with('/')));
    }

    #[test]
    fn test_path_lookup() {
        let registry = test_registry();
        assert_eq!(registry.name_for_path("/search_drugs"), Some("search_drugs_by_name"));
        assert_eq!(registry.name_for_path("/get_targets"), Some("get_targets"));
        assert_eq!(registry.name_for_path("/nope"), None);
    }

    #[test]
    fn test_tools_have_object_schemas() {
        let registry = test_registry();
        for tool in registry.get_all_tools() {
            assert_eq!(
                tool.input_schema.get("type"),
                Some(&json!("object")),
                "{} schema",
                tool.name
            );
            assert!(tool.description.is_some());
        }
    }

    #[tokio::test]
    async fn test_registry_call_unknown() {
        let registry = test_registry();
        let err = registry.call_tool("unknown", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_combination_makes_no_upstream_call() {
        let mock = MockUpstream::start(200, json!({})).await;
        let registry = ToolRegistry::with_client(mock.client("tok"));

        for (name, args) in [
            ("get_alerts", json!({"drug_id": "1", "target_id": "2"})),
            ("get_alerts", json!({})),
            ("get_drugs", json!({"target_id": "1"})),
            ("get_score", json!({"drug_id": "99402", "target_id": "158"})),
            ("get_score", json!({"target_id": "158"})),
            ("get_drug", json!({})),
            ("get_adverse_events", json!({"drug_id": "1", "target_id": "2"})),
            ("get_target", json!({"target_id": "1"})),
            ("get_targets", json!({"drug_id": "1", "adverse_event_id": "2"})),
            ("get_alerts", json!({"drug_id": "12a"})),
        ] {
            let err = registry.call_tool(name, args).await.unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments(_)), "{name}: {err}");
        }
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_valid_call_passes_result_through() {
        let body = json!({"score": 0.42, "level": "medium"});
        let mock = MockUpstream::start(200, body.clone()).await;
        let registry = ToolRegistry::with_client(mock.client("secret"));

        let result = registry
            .call_tool("get_score", json!({"drug_id": "99402"}))
            .await
            .unwrap();

        assert_eq!(result, body);
        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].path, "/api/drug/score");
        assert_eq!(calls[0].param("token"), Some("secret"));
        assert_eq!(calls[0].param("drug_id"), Some("99402"));
    }

    #[tokio::test]
    async fn test_get_drugs_query_reaches_upstream() {
        let mock = MockUpstream::start(200, json!([])).await;
        let registry = ToolRegistry::with_client(mock.client("tok"));

        registry
            .call_tool("get_drugs", json!({"target_id": "123", "action_id": "456"}))
            .await
            .unwrap();

        let call = &mock.calls()[0];
        assert_eq!(call.path, "/api/drug/search");
        assert_eq!(call.param("target_id"), Some("123"));
        assert_eq!(call.param("action_id"), Some("456"));
        assert_eq!(call.param("page"), Some("1"));
    }
}
