//! Tool-specific error types.
//!
//! Every failure a tool call can produce is a `ToolError`. Each transport
//! converts it into its own shape: an MCP error object for stdio and
//! JSON-RPC, or an HTTP status with an `{error, code}` body.

use rmcp::{ErrorData as McpError, model::ErrorCode};
use std::time::Duration;
use thiserror::Error;

/// Result type for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors that can occur during tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// A field failed validation or the combination rule was violated.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The upstream API answered with a non-2xx status.
    #[error("Upstream API error {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// The upstream call failed before a usable response was read.
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    /// The upstream call did not finish within the configured timeout.
    #[error("Upstream request timed out after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the request while it was in flight.
    #[error("Request cancelled by client")]
    Cancelled,

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a new upstream failure carrying the underlying cause.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// JSON-RPC error code used by the MCP transports.
    pub fn rpc_code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::METHOD_NOT_FOUND,
            Self::InvalidArguments(_) => ErrorCode::INVALID_PARAMS,
            _ => ErrorCode::INTERNAL_ERROR,
        }
    }

    /// HTTP status code used by the plain HTTP transport.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidArguments(_) => 400,
            Self::Timeout(_) => 504,
            // 499 is the de-facto "client closed request" status.
            Self::Cancelled => 499,
            Self::UpstreamStatus { .. } | Self::Upstream(_) | Self::Internal(_) => 500,
        }
    }
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        McpError::new(err.rpc_code(), err.to_string(), None)
    }
}
