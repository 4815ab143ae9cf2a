//! Bot harness.
//!
//! Builds a [`Bot`] over an in-memory database and a [`RecordingPlatform`]
//! seeded with a fixed cast of users.

use super::platform::RecordingPlatform;
use chanserv::config::BotConfig;
use chanserv::db::{Channel, Database, NewChannel, NewOperator};
use chanserv::events::{JoinEvent, MessageEvent};
use chanserv::handlers::{Bot, CommandOutcome, DispatchStatus, JoinOutcome};
use chanserv::platform::{ChannelInfo, UserProfile};
use std::sync::Arc;

pub const BOT: &str = "UBOT";
pub const ADMIN: &str = "UADMIN";
pub const OWNER: &str = "UOWNER";
pub const OP: &str = "UOP";
pub const MEMBER: &str = "UMEMBER";
pub const TARGET: &str = "UTARGET";

pub const CHANNEL: &str = "CGENERAL";
pub const SUPPORT: &str = "CSUPPORT";
pub const WORKSPACE: &str = "nashdev";

pub const COMMAND_TS: &str = "1530000500.000300";

pub struct TestBot {
    pub bot: Bot,
    pub db: Database,
    pub platform: Arc<RecordingPlatform>,
}

#[allow(dead_code)]
impl TestBot {
    /// A bot with no registered channels.
    pub async fn new() -> anyhow::Result<Self> {
        let db = Database::new(":memory:").await?;
        let platform = Arc::new(RecordingPlatform::default());

        platform.add_user(UserProfile {
            is_bot: true,
            ..UserProfile::member(BOT)
        });
        platform.add_user(UserProfile::admin(ADMIN));
        for id in [OWNER, OP, MEMBER, TARGET] {
            platform.add_user(UserProfile::member(id));
        }
        platform.add_channel(ChannelInfo {
            id: CHANNEL.to_string(),
            name: "general".to_string(),
            topic: "Company-wide announcements".to_string(),
            purpose: "Talk about anything".to_string(),
            creator: OWNER.to_string(),
            created: 1_500_000_000,
            is_channel: true,
        });

        let config = BotConfig {
            user_id: BOT.to_string(),
            support_channel_id: SUPPORT.to_string(),
            workspace_domain: WORKSPACE.to_string(),
            name: "Chanserv".to_string(),
        };
        let bot = Bot::new(db.clone(), platform.clone(), config);

        Ok(Self { bot, db, platform })
    }

    /// A bot with `CHANNEL` registered to `OWNER`, with `OP` as operator.
    pub async fn registered() -> anyhow::Result<Self> {
        let harness = Self::new().await?;
        harness
            .db
            .channels()
            .create(NewChannel {
                channel_id: CHANNEL.to_string(),
                name: "general".to_string(),
                topic: "Company-wide announcements".to_string(),
                purpose: "Talk about anything".to_string(),
                owner_id: OWNER.to_string(),
            })
            .await?;
        harness
            .db
            .operators()
            .create(NewOperator::new(CHANNEL, OP))
            .await?;
        Ok(harness)
    }

    /// Post `text` as `user` in `CHANNEL`; returns the commands that ran.
    pub async fn say(&self, user: &str, text: &str) -> Vec<CommandOutcome> {
        ran(self.say_all(user, text).await)
    }

    /// Post `text` as `user` in `CHANNEL`; returns every candidate outcome.
    pub async fn say_all(&self, user: &str, text: &str) -> Vec<CommandOutcome> {
        self.bot
            .on_message(&MessageEvent {
                channel: CHANNEL.to_string(),
                user: Some(user.to_string()),
                text: text.to_string(),
                ts: COMMAND_TS.to_string(),
                ..MessageEvent::default()
            })
            .await
    }

    /// Deliver a `channel_topic` change made by `user`.
    pub async fn change_topic(&self, user: &str, topic: &str) -> Vec<CommandOutcome> {
        let outcomes = self
            .bot
            .on_message(&MessageEvent {
                subtype: Some("channel_topic".to_string()),
                channel: CHANNEL.to_string(),
                user: Some(user.to_string()),
                text: format!("<@{user}> set the channel topic: {topic}"),
                ts: COMMAND_TS.to_string(),
                topic: Some(topic.to_string()),
                purpose: None,
            })
            .await;
        ran(outcomes)
    }

    /// Deliver a `channel_purpose` change made by `user`.
    pub async fn change_purpose(&self, user: &str, purpose: &str) -> Vec<CommandOutcome> {
        let outcomes = self
            .bot
            .on_message(&MessageEvent {
                subtype: Some("channel_purpose".to_string()),
                channel: CHANNEL.to_string(),
                user: Some(user.to_string()),
                text: format!("<@{user}> set the channel purpose: {purpose}"),
                ts: COMMAND_TS.to_string(),
                topic: None,
                purpose: Some(purpose.to_string()),
            })
            .await;
        ran(outcomes)
    }

    /// Deliver a join of `user` to a channel of the given type.
    pub async fn join(&self, user: &str, channel: &str, channel_type: &str) -> JoinOutcome {
        self.bot
            .on_join(&JoinEvent {
                user: user.to_string(),
                channel: channel.to_string(),
                channel_type: channel_type.to_string(),
            })
            .await
    }

    pub async fn channel(&self) -> anyhow::Result<Option<Channel>> {
        Ok(self.db.channels().find_one(CHANNEL).await?)
    }

    /// Posts to `CHANNEL`.
    pub fn replies(&self) -> Vec<String> {
        self.platform.posts(CHANNEL)
    }
}

/// Drop outcomes of commands whose pattern did not match.
#[allow(dead_code)]
pub fn ran(outcomes: Vec<CommandOutcome>) -> Vec<CommandOutcome> {
    outcomes
        .into_iter()
        .filter(|o| o.status != DispatchStatus::Unmatched)
        .collect()
}
