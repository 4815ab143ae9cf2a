//! Join enforcement.
//!
//! Reacts to users joining a channel: banned users are removed again, and
//! channels nobody has registered are kept empty.

use crate::db::RecordFilter;
use crate::error::ModerationError;
use crate::metrics;
use crate::services::chanserv::{ChanServ, CommandResponse, format_timestamp};
use tracing::info;

impl ChanServ {
    /// Remove a user holding an active ban on this channel.
    ///
    /// Returns `None` when the user is not banned or the channel is not
    /// registered.
    pub async fn enforce_ban(&self, channel_id: &str, user_id: &str) -> Option<CommandResponse> {
        match self.try_enforce_ban(channel_id, user_id).await {
            Ok(None) => None,
            Ok(Some(response)) => Some(CommandResponse::ok(response)),
            Err(e) => Some(self.conclude("enforce_ban", Err(e), || {
                format!("Sorry, but we were unable to automatically remove <@{user_id}>")
            })),
        }
    }

    async fn try_enforce_ban(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<Option<String>, ModerationError> {
        let user = self.platform.user_info(user_id).await?;
        let Some(channel) = self.db.channels().find_one(channel_id).await? else {
            return Ok(None);
        };
        if !self.evaluator.permissions(&channel, &user).is_banned {
            return Ok(None);
        }

        let ban = self
            .db
            .bans()
            .find_one(&RecordFilter::pair(channel_id, user_id))
            .await?
            .ok_or_else(|| {
                ModerationError::NotFound(format!("The ban for <@{user_id}> has just expired."))
            })?;

        self.platform.kick(user_id, channel_id, &ban.reason).await?;

        info!(channel = %channel_id, user = %user_id, "Removed banned user on join");
        metrics::record_enforcement("ban");

        Ok(Some(format!(
            "Automatically removed <@{user_id}>!\n*Banned*: {}\n*Expires*: {}",
            ban.reason,
            format_timestamp(ban.expires_at),
        )))
    }

    /// Remove anyone but the bot from a channel that is not registered.
    pub async fn enforce_registration(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Option<CommandResponse> {
        match self.try_enforce_registration(channel_id, user_id).await {
            Ok(None) => None,
            Ok(Some(response)) => Some(CommandResponse::ok(response)),
            Err(e) => Some(self.conclude("enforce_registration", Err(e), || {
                format!("Sorry, but we were unable to enforce {} registration.", self.bot.name)
            })),
        }
    }

    async fn try_enforce_registration(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<Option<String>, ModerationError> {
        if user_id == self.evaluator.system_actor_id() {
            return Ok(None);
        }
        if self.db.channels().find_one(channel_id).await?.is_some() {
            return Ok(None);
        }

        let notice = format!(
            "Please register this channel with <#{}>",
            self.bot.support_channel_id
        );
        self.platform.kick(user_id, channel_id, &notice).await?;

        info!(channel = %channel_id, user = %user_id, "Removed user from unregistered channel");
        metrics::record_enforcement("registration");

        Ok(Some(format!("Automatically removed <@{user_id}>! {notice}")))
    }
}
