//! Tools domain module.
//!
//! Tools are the operations exposed to clients. Each one validates its
//! arguments, builds a query for the pharmacovigilance API, performs one
//! upstream call and hands the JSON result back.
//!
//! ## Architecture
//!
//! - `definitions/` - Per-tool parameters, combination rules and query building
//! - `validation.rs` - Field-level validators
//! - `client.rs` - Upstream endpoints and the HTTP client
//! - `handlers.rs` - `ToolDefinition` and the object-safe `ToolHandler`
//! - `registry.rs` - Central tool registry and dispatch for all transports
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Add a `ToolDefinition` in `definitions/`
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it in `registry.rs`
//!
//! Both transports pick it up from the registry; the HTTP route is derived
//! from `HTTP_PATH`.

pub mod client;
pub mod definitions;
mod error;
mod handlers;
mod registry;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{Endpoint, PvClient, UpstreamQuery, UpstreamRequest};
pub use error::{ToolError, ToolResult};
pub use handlers::{Handler, ToolDefinition, ToolDescriptor, ToolHandler, parse_arguments};
pub use registry::ToolRegistry;
