//! Slack Web API client.
//!
//! Every method is a form-encoded POST to `{api_base}/{method}` with a
//! bearer token. Slack reports failures in-band as `{"ok": false, "error": ...}`.

use super::{ChannelInfo, Platform, PlatformError, UserProfile};
use crate::config::SlackConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Which credential a call runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// Posts as the bot user.
    Bot,
    /// Admin-scoped user token for moderation calls.
    User,
}

/// Slack Web API client.
pub struct SlackClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    user_token: String,
}

impl SlackClient {
    /// Build a client from configuration.
    pub fn new(config: &SlackConfig) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("chanserv-ng/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            user_token: config.user_token.clone(),
        })
    }

    async fn call(
        &self,
        method: &'static str,
        token: Token,
        params: &[(&str, &str)],
    ) -> Result<Value, PlatformError> {
        let url = format!("{}/{}", self.api_base, method);
        let token = match token {
            Token::Bot => &self.bot_token,
            Token::User => &self.user_token,
        };
        debug!(method, "Slack API call");

        let body: Value = self
            .http
            .post(&url)
            .bearer_auth(token)
            .form(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        check_ok(method, body)
    }

    async fn call_as<T: DeserializeOwned>(
        &self,
        method: &'static str,
        token: Token,
        params: &[(&str, &str)],
    ) -> Result<T, PlatformError> {
        let body = self.call(method, token, params).await?;
        decode(method, body)
    }
}

/// Unwrap Slack's `ok` envelope.
fn check_ok(method: &'static str, body: Value) -> Result<Value, PlatformError> {
    if body.get("ok").and_then(Value::as_bool) == Some(true) {
        return Ok(body);
    }
    let error = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown_error")
        .to_string();
    Err(PlatformError::Api { method, error })
}

fn decode<T: DeserializeOwned>(method: &'static str, body: Value) -> Result<T, PlatformError> {
    serde_json::from_value(body).map_err(|e| PlatformError::Decode {
        method,
        reason: e.to_string(),
    })
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: RawUser,
}

#[derive(Deserialize)]
struct RawUser {
    id: String,
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    is_owner: bool,
    #[serde(default)]
    is_bot: bool,
    #[serde(default)]
    profile: RawUserProfile,
}

#[derive(Deserialize, Default)]
struct RawUserProfile {
    #[serde(default)]
    real_name_normalized: String,
    #[serde(default)]
    status_emoji: String,
    #[serde(default)]
    status_text: String,
    #[serde(default)]
    image_192: String,
}

impl From<RawUser> for UserProfile {
    fn from(raw: RawUser) -> Self {
        Self {
            id: raw.id,
            is_admin: raw.is_admin,
            is_owner: raw.is_owner,
            is_bot: raw.is_bot,
            real_name: raw.profile.real_name_normalized,
            status_emoji: raw.profile.status_emoji,
            status_text: raw.profile.status_text,
            avatar_url: raw.profile.image_192,
        }
    }
}

#[derive(Deserialize)]
struct ChannelEnvelope {
    channel: RawChannel,
}

#[derive(Deserialize)]
struct RawChannel {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    topic: TextValue,
    #[serde(default)]
    purpose: TextValue,
    #[serde(default)]
    creator: String,
    #[serde(default)]
    created: i64,
    #[serde(default)]
    is_channel: bool,
}

#[derive(Deserialize, Default)]
struct TextValue {
    #[serde(default)]
    value: String,
}

impl From<RawChannel> for ChannelInfo {
    fn from(raw: RawChannel) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            topic: raw.topic.value,
            purpose: raw.purpose.value,
            creator: raw.creator,
            created: raw.created,
            is_channel: raw.is_channel,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PresenceEnvelope {
    presence: String,
}

#[derive(Deserialize)]
struct ConversationsEnvelope {
    #[serde(default)]
    channels: Vec<ConversationRef>,
}

#[derive(Deserialize)]
struct ConversationRef {
    id: String,
}

#[async_trait]
impl Platform for SlackClient {
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), PlatformError> {
        self.call(
            "chat.postMessage",
            Token::Bot,
            &[("channel", channel_id), ("text", text)],
        )
        .await?;
        Ok(())
    }

    async fn kick(
        &self,
        user_id: &str,
        channel_id: &str,
        reason: &str,
    ) -> Result<(), PlatformError> {
        // conversations.kick has no reason field; the reason is reported in chat.
        debug!(user = %user_id, channel = %channel_id, reason = %reason, "Kicking user");
        self.call(
            "conversations.kick",
            Token::User,
            &[("channel", channel_id), ("user", user_id)],
        )
        .await?;
        Ok(())
    }

    async fn user_info(&self, user_id: &str) -> Result<UserProfile, PlatformError> {
        let envelope: UserEnvelope = self
            .call_as("users.info", Token::User, &[("user", user_id)])
            .await?;
        Ok(envelope.user.into())
    }

    async fn channel_info(&self, channel_id: &str) -> Result<ChannelInfo, PlatformError> {
        let envelope: ChannelEnvelope = self
            .call_as("conversations.info", Token::User, &[("channel", channel_id)])
            .await?;
        Ok(envelope.channel.into())
    }

    async fn invite(&self, channel_id: &str, user_id: &str) -> Result<(), PlatformError> {
        self.call(
            "conversations.invite",
            Token::User,
            &[("channel", channel_id), ("users", user_id)],
        )
        .await?;
        Ok(())
    }

    async fn set_topic(&self, channel_id: &str, topic: &str) -> Result<(), PlatformError> {
        self.call(
            "conversations.setTopic",
            Token::User,
            &[("channel", channel_id), ("topic", topic)],
        )
        .await?;
        Ok(())
    }

    async fn set_purpose(&self, channel_id: &str, purpose: &str) -> Result<(), PlatformError> {
        self.call(
            "conversations.setPurpose",
            Token::User,
            &[("channel", channel_id), ("purpose", purpose)],
        )
        .await?;
        Ok(())
    }

    async fn presence(&self, user_id: &str) -> Result<String, PlatformError> {
        let envelope: PresenceEnvelope = self
            .call_as("users.getPresence", Token::User, &[("user", user_id)])
            .await?;
        Ok(envelope.presence)
    }

    async fn user_conversations(&self, user_id: &str) -> Result<Vec<String>, PlatformError> {
        let envelope: ConversationsEnvelope = self
            .call_as("users.conversations", Token::User, &[("user", user_id)])
            .await?;
        Ok(envelope.channels.into_iter().map(|c| c.id).collect())
    }

    async fn delete_message(&self, channel_id: &str, ts: &str) -> Result<(), PlatformError> {
        self.call(
            "chat.delete",
            Token::User,
            &[("channel", channel_id), ("ts", ts)],
        )
        .await?;
        Ok(())
    }
}
