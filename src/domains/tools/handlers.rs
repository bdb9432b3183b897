//! Tool handler traits.
//!
//! A tool is described statically by `ToolDefinition`: its name, HTTP path,
//! documentation, parameter struct and a pure `build` step that validates
//! the parameters and produces the upstream request. `Handler<T>` wraps a
//! definition into the object-safe `ToolHandler` that the registry stores
//! and both transports call.

use async_trait::async_trait;
use rmcp::{
    handler::server::tool::schema_for_type,
    model::Tool,
};
use schemars::JsonSchema;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::marker::PhantomData;
use tracing::{debug, info};

use super::client::{PvClient, UpstreamRequest};
use super::error::{ToolError, ToolResult};

/// Static description of one tool plus its request-building logic.
pub trait ToolDefinition: Send + Sync + 'static {
    /// Per-tool argument struct.
    type Params: DeserializeOwned + JsonSchema + Send + 'static;

    /// Tool name as registered in MCP.
    const NAME: &'static str;

    /// Path served by the plain HTTP transport.
    const HTTP_PATH: &'static str;

    /// Tool description shown to clients.
    const DESCRIPTION: &'static str;

    /// Which fields must or must not be supplied together.
    const COMBINATION_RULE: &'static str;

    /// For single-field tools, the field a bare string argument maps to.
    const BARE_STRING_FIELD: Option<&'static str> = None;

    /// Validate the parameters and build the upstream request.
    ///
    /// Field checks run first, then the combination rule. Nothing here
    /// performs I/O.
    fn build(params: &Self::Params) -> ToolResult<UpstreamRequest>;

    /// Post-process the upstream JSON. Defaults to passing it through.
    fn reshape(_request: &UpstreamRequest, value: Value) -> Value {
        value
    }
}

/// Listing entry for a tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub path: &'static str,
    pub description: &'static str,
    pub combination_rule: &'static str,
}

/// Decode raw call arguments into a tool's parameter struct.
pub fn parse_arguments<T: ToolDefinition>(arguments: Value) -> ToolResult<T::Params> {
    let object = match (arguments, T::BARE_STRING_FIELD) {
        (Value::Object(map), _) => map,
        (Value::Null, _) => Map::new(),
        (Value::String(text), Some(field)) => {
            let mut map = Map::new();
            map.insert(field.to_string(), Value::String(text));
            map
        }
        (other, _) => {
            return Err(ToolError::invalid_arguments(format!(
                "arguments for {} must be a JSON object, got {}",
                T::NAME,
                json_kind(&other)
            )));
        }
    };

    serde_json::from_value(Value::Object(object))
        .map_err(|e| ToolError::invalid_arguments(format!("{}: {}", T::NAME, e)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Object-safe handle on a tool, used for dynamic dispatch by name.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Get the name of this tool.
    fn name(&self) -> &'static str;

    /// Get the HTTP path of this tool.
    fn http_path(&self) -> &'static str;

    /// Listing entry.
    fn descriptor(&self) -> ToolDescriptor;

    /// MCP tool model, including the generated input schema.
    fn to_tool(&self) -> Tool;

    /// Validate, build and execute one call.
    async fn call(&self, arguments: Value, client: &PvClient) -> ToolResult<Value>;
}

/// Adapter from a `ToolDefinition` to a `ToolHandler`.
pub struct Handler<T>(PhantomData<fn() -> T>);

impl<T: ToolDefinition> Handler<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }

    pub fn boxed() -> Box<dyn ToolHandler> {
        Box::new(Self::new())
    }
}

impl<T: ToolDefinition> Default for Handler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: ToolDefinition> ToolHandler for Handler<T> {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn http_path(&self) -> &'static str {
        T::HTTP_PATH
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: T::NAME,
            path: T::HTTP_PATH,
            description: T::DESCRIPTION,
            combination_rule: T::COMBINATION_RULE,
        }
    }

    fn to_tool(&self) -> Tool {
        Tool {
            name: T::NAME.into(),
            description: Some(
                format!("{}\n\nRequired arguments: {}", T::DESCRIPTION, T::COMBINATION_RULE).into(),
            ),
            input_schema: schema_for_type::<T::Params>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    async fn call(&self, arguments: Value, client: &PvClient) -> ToolResult<Value> {
        let params = parse_arguments::<T>(arguments)?;
        let request = T::build(&params)?;
        info!(tool = T::NAME, endpoint = request.endpoint.path(), "Calling upstream");

        let value = client.get(&request).await?;
        debug!(tool = T::NAME, "Upstream call succeeded");
        Ok(T::reshape(&request, value))
    }
}
