//! Moderation commands: KICK, BAN, UNBAN, BANS.

use super::{ChanServ, CommandResponse};
use crate::db::{Ban, NewSanction, RecordFilter, SanctionPatch, now};
use crate::error::ModerationError;
use crate::services::chanserv::format_timestamp;
use chrono::Duration;
use tracing::{info, warn};

impl ChanServ {
    /// Remove a user from the channel. Nothing is recorded.
    pub async fn kick(
        &self,
        channel_id: &str,
        actor_id: &str,
        target_id: &str,
        reason: &str,
    ) -> CommandResponse {
        let result = self.try_kick(channel_id, actor_id, target_id, reason).await;
        self.conclude("kick", result, || {
            format!("Sorry, but we were unable to kick *<@{target_id}>*")
        })
    }

    async fn try_kick(
        &self,
        channel_id: &str,
        actor_id: &str,
        target_id: &str,
        reason: &str,
    ) -> Result<String, ModerationError> {
        self.authorize(channel_id, actor_id, Some(target_id)).await?;
        self.platform.kick(target_id, channel_id, reason).await?;

        info!(channel = %channel_id, target = %target_id, by = %actor_id, "User kicked");
        Ok(format!(
            "*<@{target_id}>* has been kicked by {}!\n*Reason:* {reason}",
            self.bot.name
        ))
    }

    /// Ban a user for `duration`, then remove them.
    ///
    /// The ban is stored before the kick. If the kick fails the ban stands
    /// and join enforcement removes the user on their next join.
    pub async fn ban(
        &self,
        channel_id: &str,
        actor_id: &str,
        target_id: &str,
        duration: Duration,
        reason: &str,
    ) -> CommandResponse {
        let result = self
            .try_ban(channel_id, actor_id, target_id, duration, reason)
            .await;
        self.conclude("ban", result, || {
            format!("Sorry, but we were unable to ban *<@{target_id}>*")
        })
    }

    async fn try_ban(
        &self,
        channel_id: &str,
        actor_id: &str,
        target_id: &str,
        duration: Duration,
        reason: &str,
    ) -> Result<String, ModerationError> {
        self.authorize(channel_id, actor_id, Some(target_id)).await?;

        let expires_at = now().saturating_add(duration.num_seconds());
        let ban: Ban = self
            .db
            .bans()
            .create(NewSanction::new(channel_id, target_id, reason, expires_at))
            .await?;

        info!(
            channel = %channel_id,
            target = %target_id,
            by = %actor_id,
            expires_at,
            "User banned"
        );

        if let Err(e) = self.platform.kick(target_id, channel_id, reason).await {
            warn!(channel = %channel_id, target = %target_id, error = %e, "Ban stored but kick failed");
            return Err(e.into());
        }

        Ok(format!(
            "*<@{target_id}>* has been banned by {}!\n*Reason:* {}\n*Expires:* {}",
            self.bot.name,
            ban.reason,
            format_timestamp(ban.expires_at),
        ))
    }

    /// Expire every active ban of a user on this channel.
    pub async fn unban(&self, channel_id: &str, actor_id: &str, target_id: &str) -> CommandResponse {
        let result = self.try_unban(channel_id, actor_id, target_id).await;
        self.conclude("unban", result, || {
            format!("Sorry, but we were unable to unban *<@{target_id}>*")
        })
    }

    async fn try_unban(
        &self,
        channel_id: &str,
        actor_id: &str,
        target_id: &str,
    ) -> Result<String, ModerationError> {
        self.authorize(channel_id, actor_id, Some(target_id)).await?;

        let lifted = self
            .db
            .bans()
            .update(
                &RecordFilter::pair(channel_id, target_id),
                &SanctionPatch::expire_now(),
            )
            .await?;
        info!(channel = %channel_id, target = %target_id, by = %actor_id, lifted = lifted.len(), "User unbanned");

        Ok(format!("*<@{target_id}>* has been unbanned by {}!", self.bot.name))
    }

    /// List the active bans of this channel.
    pub async fn bans(&self, channel_id: &str) -> CommandResponse {
        let result = self.try_bans(channel_id).await;
        self.conclude("bans", result, || {
            format!("Sorry, but there was a problem getting <#{channel_id}> bans.")
        })
    }

    async fn try_bans(&self, channel_id: &str) -> Result<String, ModerationError> {
        let bans = self.db.bans().find(&RecordFilter::channel(channel_id)).await?;

        let listing: Vec<String> = bans
            .iter()
            .map(|b| {
                format!(
                    "<@{}>:\n    *Banned*: {}\n    *Expires*: {}\n    *Reason*: {}",
                    b.user_id,
                    format_timestamp(b.created_at),
                    format_timestamp(b.expires_at),
                    b.reason
                )
            })
            .collect();

        Ok(format!(
            "*<#{channel_id}> Bans*:\n{}",
            if listing.is_empty() {
                "None".to_string()
            } else {
                listing.join("\n")
            }
        ))
    }
}
