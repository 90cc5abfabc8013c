//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use super::ai::AiConfig;
use super::backend::BackendConfig;
use super::defaults::{default_listen, default_log_format, default_max_upload_bytes};
use super::line::LineConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP listener and request limits.
    #[serde(default)]
    pub server: ServerConfig,
    /// Hosted backend (REST, auth admin and storage APIs).
    pub backend: BackendConfig,
    /// Hosted chat-completion model.
    #[serde(default)]
    pub ai: AiConfig,
    /// LINE Messaging API and LINE Login.
    #[serde(default)]
    pub line: LineConfig,
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Fill secrets from the environment.
    ///
    /// Environment values win over the file so deployments can keep keys out
    /// of the config. `lookup` is injected for tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("CONFDESK_BACKEND_SERVICE_KEY") {
            self.backend.service_key = Some(key);
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.ai.api_key = Some(key);
        }
        if let Some(token) = non_empty("LINE_CHANNEL_ACCESS_TOKEN") {
            self.line.channel_access_token = Some(token);
        }
        if let Some(secret) = non_empty("LINE_CHANNEL_SECRET") {
            self.line.channel_secret = Some(secret);
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind (default: 0.0.0.0:8080).
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    /// Serve Prometheus metrics on `/metrics`.
    #[serde(default)]
    pub metrics: bool,
    /// Origins allowed by CORS. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Largest accepted PDF upload in bytes (default: 10 MiB).
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Log output: "pretty" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics: false,
            cors_origins: Vec::new(),
            max_upload_bytes: default_max_upload_bytes(),
            log_format: default_log_format(),
        }
    }
}
