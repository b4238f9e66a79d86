//! Configuration management for the Hotel Analytics MCP Server.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Endpoint used when neither the CLI, the environment nor the file names one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:4000/graphql";

/// Environment variable overriding the GraphQL endpoint.
pub const ENDPOINT_ENV_VAR: &str = "HOTEL_ANALYTICS_GRAPHQL_ENDPOINT";

/// Main configuration structure.
///
/// Built once at startup and handed to the GraphQL client; it never changes
/// for the lifetime of the process.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// GraphQL endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Enable debug mode (trace file + debug-level logs)
    #[serde(default)]
    pub debug: bool,

    /// Per-request deadline in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            debug: false,
            timeout_seconds: default_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the effective configuration.
    ///
    /// Endpoint precedence: CLI flag, then environment, then file, then the
    /// built-in default.
    pub fn resolve(
        file: Option<&Path>,
        cli_endpoint: Option<String>,
        env_endpoint: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(endpoint) = pick_override(cli_endpoint, env_endpoint) {
            config.endpoint = endpoint;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.endpoint).map_err(|e| {
            ConfigError::Invalid(format!("endpoint '{}' is not a valid URL: {}", self.endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "endpoint '{}' must use http or https",
                self.endpoint
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "timeout_seconds must be greater than zero".into(),
            ));
        }

        Ok(())
    }

    /// Get timeout as Duration.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds)
    }
}

/// First non-blank override wins.
fn pick_override(cli: Option<String>, env: Option<String>) -> Option<String> {
    [cli, env]
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}
