//! Pharmacovigilance MCP Server Library
//!
//! Exposes a drug/target safety knowledge base to LLM clients as ten
//! Model Context Protocol tools. Each tool validates its arguments, builds
//! one query against the upstream REST API and returns the upstream JSON.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the MCP server handler and the
//!   stdio/HTTP transports
//! - **domains::tools**: tool definitions, argument validation, the tool
//!   registry and the upstream HTTP client
//!
//! # Example
//!
//! ```rust,no_run
//! use pv_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let transport = TransportService::new(config.transport.clone());
//!     let server = McpServer::new(config)?;
//!     transport.run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
