//! Chat platform boundary.
//!
//! Everything the bot does to the workspace goes through [`Platform`]:
//! posting responses, removing users, reading profiles and channel metadata.

pub mod slack;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use slack::SlackClient;

/// Platform call failures.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{method} failed: {error}")]
    Api { method: &'static str, error: String },
    #[error("{method} returned an unreadable response: {reason}")]
    Decode { method: &'static str, reason: String },
    #[error("platform unavailable: {0}")]
    Unavailable(String),
}

impl PlatformError {
    /// Get a static error code string for metrics labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Http(_) => "platform_http",
            Self::Api { .. } => "platform_api",
            Self::Decode { .. } => "platform_decode",
            Self::Unavailable(_) => "platform_unavailable",
        }
    }
}

/// A workspace member's profile, as needed for authorization and whois.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub status_emoji: String,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub avatar_url: String,
}

impl UserProfile {
    /// A plain member with no platform privileges.
    pub fn member(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// A workspace admin.
    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_admin: true,
            ..Self::default()
        }
    }
}

/// Channel metadata as reported by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: String,
    pub name: String,
    pub topic: String,
    pub purpose: String,
    pub creator: String,
    /// Unix timestamp of channel creation.
    pub created: i64,
    /// False for ids that do not name an existing public channel.
    pub is_channel: bool,
}

/// Operations the bot performs against the chat platform.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), PlatformError>;

    /// Remove a user from a channel. `reason` is informational.
    async fn kick(&self, user_id: &str, channel_id: &str, reason: &str)
    -> Result<(), PlatformError>;

    async fn user_info(&self, user_id: &str) -> Result<UserProfile, PlatformError>;

    async fn channel_info(&self, channel_id: &str) -> Result<ChannelInfo, PlatformError>;

    async fn invite(&self, channel_id: &str, user_id: &str) -> Result<(), PlatformError>;

    async fn set_topic(&self, channel_id: &str, topic: &str) -> Result<(), PlatformError>;

    async fn set_purpose(&self, channel_id: &str, purpose: &str) -> Result<(), PlatformError>;

    /// Current presence, e.g. `active` or `away`.
    async fn presence(&self, user_id: &str) -> Result<String, PlatformError>;

    /// Ids of the channels a user belongs to.
    async fn user_conversations(&self, user_id: &str) -> Result<Vec<String>, PlatformError>;

    async fn delete_message(&self, channel_id: &str, ts: &str) -> Result<(), PlatformError>;
}
