//! Configuration management for the MCP server.
//!
//! Configuration is read once at startup, either from environment variables
//! (optionally seeded from a `.env` file) or built directly in code, and is
//! then shared read-only as `Arc<Config>` by the transports and tool builders.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Default base URL of the pharmacovigilance API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.targetsafety.info/api";

/// Default per-call upstream timeout, in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Upstream API location and call limits.
    pub upstream: UpstreamConfig,

    /// Upstream API credentials.
    pub credentials: CredentialsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Where the upstream API lives and how long a call may take.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL; endpoint paths are appended to it.
    pub base_url: String,

    /// Timeout applied to every upstream request, in seconds.
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

/// Credentials for the upstream API.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Token sent as the `token` query parameter on every upstream call.
    pub api_token: String,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

impl Config {
    /// Create a configuration with default settings and the given API token.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            server: ServerConfig {
                name: "pv-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            upstream: UpstreamConfig::default(),
            credentials: CredentialsConfig {
                api_token: api_token.into(),
            },
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `PV_API_TOKEN` is mandatory; every other variable falls back to a
    /// default. See `TransportConfig::from_env` for the transport variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_token = std::env::var("PV_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| Error::config("PV_API_TOKEN must be set to a non-empty API token"))?;

        let mut config = Self::new(api_token);

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(base_url) = std::env::var("PV_API_BASE_URL") {
            config.upstream.base_url = base_url.trim_end_matches('/').to_string();
            info!("Upstream API base URL set to {}", config.upstream.base_url);
        }

        if let Ok(timeout) = std::env::var("PV_API_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) if secs > 0 => config.upstream.timeout_secs = secs,
                _ => warn!(
                    "Ignoring invalid PV_API_TIMEOUT_SECS value '{}', using {}s",
                    timeout, config.upstream.timeout_secs
                ),
            }
        }

        config.transport = TransportConfig::from_env();

        Ok(config)
    }
}

/// Serializes tests that touch process environment variables.
#[cfg(test)]
pub(crate) static ENV_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
