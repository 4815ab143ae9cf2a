//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bot identity and workspace settings.
    pub bot: BotConfig,
    /// Slack API credentials.
    pub slack: SlackConfig,
    /// Event endpoint listener.
    #[serde(default)]
    pub http: HttpConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// The bot's own user id. Never a valid moderation target.
    pub user_id: String,
    /// Channel where reports land and registration disputes are directed.
    pub support_channel_id: String,
    /// Workspace subdomain, as in `{workspace_domain}.slack.com`.
    pub workspace_domain: String,
    /// Display name used in response headers.
    #[serde(default = "default_bot_name")]
    pub name: String,
}

/// Slack Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackConfig {
    /// Bot token (`xoxb-`), used for chat posts.
    pub bot_token: String,
    /// User token (`xoxp-`) with admin scopes, used for moderation calls.
    pub user_token: String,
    /// Signing secret for verifying inbound event requests.
    pub signing_secret: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_address")]
    pub address: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: default_http_address(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_bot_name() -> String {
    "Chanserv".to_string()
}

fn default_api_base() -> String {
    "https://slack.com/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_http_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_database_path() -> String {
    "chanserv.db".to_string()
}
