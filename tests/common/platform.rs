//! Recording platform double.
//!
//! Answers from configured users and channels, records every call, and
//! fails any method named in its failure set.

use async_trait::async_trait;
use chanserv::platform::{ChannelInfo, Platform, PlatformError, UserProfile};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// One recorded platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    PostMessage { channel: String, text: String },
    Kick { user: String, channel: String, reason: String },
    UserInfo(String),
    ChannelInfo(String),
    Invite { channel: String, user: String },
    SetTopic { channel: String, topic: String },
    SetPurpose { channel: String, purpose: String },
    Presence(String),
    UserConversations(String),
    DeleteMessage { channel: String, ts: String },
}

impl Call {
    pub fn method(&self) -> &'static str {
        match self {
            Self::PostMessage { .. } => "chat.postMessage",
            Self::Kick { .. } => "conversations.kick",
            Self::UserInfo(_) => "users.info",
            Self::ChannelInfo(_) => "conversations.info",
            Self::Invite { .. } => "conversations.invite",
            Self::SetTopic { .. } => "conversations.setTopic",
            Self::SetPurpose { .. } => "conversations.setPurpose",
            Self::Presence(_) => "users.getPresence",
            Self::UserConversations(_) => "users.conversations",
            Self::DeleteMessage { .. } => "chat.delete",
        }
    }

    /// Calls that change workspace state.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::PostMessage { .. }
                | Self::Kick { .. }
                | Self::Invite { .. }
                | Self::SetTopic { .. }
                | Self::SetPurpose { .. }
                | Self::DeleteMessage { .. }
        )
    }
}

#[derive(Default)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<Call>>,
    users: Mutex<HashMap<String, UserProfile>>,
    channels: Mutex<HashMap<String, ChannelInfo>>,
    failing: Mutex<HashSet<&'static str>>,
}

#[allow(dead_code)]
impl RecordingPlatform {
    pub fn add_user(&self, profile: UserProfile) {
        self.users
            .lock()
            .unwrap()
            .insert(profile.id.clone(), profile);
    }

    pub fn add_channel(&self, info: ChannelInfo) {
        self.channels
            .lock()
            .unwrap()
            .insert(info.id.clone(), info);
    }

    /// Make every call to `method` fail from now on.
    pub fn fail(&self, method: &'static str) {
        self.failing.lock().unwrap().insert(method);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method() == method)
            .count()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    /// `(user, channel, reason)` of every kick.
    pub fn kicks(&self) -> Vec<(String, String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Kick { user, channel, reason } => Some((user, channel, reason)),
                _ => None,
            })
            .collect()
    }

    /// Texts posted to `channel`.
    pub fn posts(&self, channel: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::PostMessage { channel: ch, text } if ch == channel => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> Result<(), PlatformError> {
        let method = call.method();
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(method) {
            return Err(PlatformError::Api {
                method,
                error: "injected_failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), PlatformError> {
        self.record(Call::PostMessage {
            channel: channel_id.to_string(),
            text: text.to_string(),
        })
    }

    async fn kick(
        &self,
        user_id: &str,
        channel_id: &str,
        reason: &str,
    ) -> Result<(), PlatformError> {
        self.record(Call::Kick {
            user: user_id.to_string(),
            channel: channel_id.to_string(),
            reason: reason.to_string(),
        })
    }

    async fn user_info(&self, user_id: &str) -> Result<UserProfile, PlatformError> {
        self.record(Call::UserInfo(user_id.to_string()))?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| UserProfile::member(user_id)))
    }

    async fn channel_info(&self, channel_id: &str) -> Result<ChannelInfo, PlatformError> {
        self.record(Call::ChannelInfo(channel_id.to_string()))?;
        Ok(self
            .channels
            .lock()
            .unwrap()
            .get(channel_id)
            .cloned()
            .unwrap_or_else(|| ChannelInfo {
                id: channel_id.to_string(),
                ..ChannelInfo::default()
            }))
    }

    async fn invite(&self, channel_id: &str, user_id: &str) -> Result<(), PlatformError> {
        self.record(Call::Invite {
            channel: channel_id.to_string(),
            user: user_id.to_string(),
        })
    }

    async fn set_topic(&self, channel_id: &str, topic: &str) -> Result<(), PlatformError> {
        self.record(Call::SetTopic {
            channel: channel_id.to_string(),
            topic: topic.to_string(),
        })
    }

    async fn set_purpose(&self, channel_id: &str, purpose: &str) -> Result<(), PlatformError> {
        self.record(Call::SetPurpose {
            channel: channel_id.to_string(),
            purpose: purpose.to_string(),
        })
    }

    async fn presence(&self, user_id: &str) -> Result<String, PlatformError> {
        self.record(Call::Presence(user_id.to_string()))?;
        Ok("active".to_string())
    }

    async fn user_conversations(&self, user_id: &str) -> Result<Vec<String>, PlatformError> {
        self.record(Call::UserConversations(user_id.to_string()))?;
        Ok(self
            .channels
            .lock()
            .unwrap()
            .keys()
            .cloned()
            .collect())
    }

    async fn delete_message(&self, channel_id: &str, ts: &str) -> Result<(), PlatformError> {
        self.record(Call::DeleteMessage {
            channel: channel_id.to_string(),
            ts: ts.to_string(),
        })
    }
}
