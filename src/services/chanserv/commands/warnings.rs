//! Warning commands: WARN, UNWARN, WARNINGS.

use super::{ChanServ, CommandResponse};
use crate::db::{NewSanction, RecordFilter, SanctionPatch, Warning, now};
use crate::error::ModerationError;
use crate::services::chanserv::format_timestamp;
use chrono::Duration;
use tracing::info;

/// How long a warning stays active.
pub const WARNING_LIFETIME: Duration = Duration::days(30);

impl ChanServ {
    /// Warn a user. The warning expires after thirty days.
    pub async fn warn(
        &self,
        channel_id: &str,
        actor_id: &str,
        target_id: &str,
        reason: &str,
    ) -> CommandResponse {
        let result = self.try_warn(channel_id, actor_id, target_id, reason).await;
        self.conclude("warn", result, || {
            format!("Sorry, but we were unable to warn *<@{target_id}>*")
        })
    }

    async fn try_warn(
        &self,
        channel_id: &str,
        actor_id: &str,
        target_id: &str,
        reason: &str,
    ) -> Result<String, ModerationError> {
        self.authorize(channel_id, actor_id, Some(target_id)).await?;

        let expires_at = now() + WARNING_LIFETIME.num_seconds();
        let warning: Warning = self
            .db
            .warnings()
            .create(NewSanction::new(channel_id, target_id, reason, expires_at))
            .await?;

        // No escalation: accumulated warnings never trigger a kick on their own.
        info!(channel = %channel_id, target = %target_id, by = %actor_id, "User warned");

        Ok(format!(
            "*<@{target_id}>* has been warned by {}!\n*Reason:* {}\n*Expires:* {}",
            self.bot.name,
            warning.reason,
            format_timestamp(warning.expires_at),
        ))
    }

    /// Expire every active warning of a user on this channel.
    pub async fn unwarn(&self, channel_id: &str, actor_id: &str, target_id: &str) -> CommandResponse {
        let result = self.try_unwarn(channel_id, actor_id, target_id).await;
        self.conclude("unwarn", result, || {
            format!("Sorry, but we were unable to unwarn *<@{target_id}>*")
        })
    }

    async fn try_unwarn(
        &self,
        channel_id: &str,
        actor_id: &str,
        target_id: &str,
    ) -> Result<String, ModerationError> {
        self.authorize(channel_id, actor_id, Some(target_id)).await?;

        let lifted = self
            .db
            .warnings()
            .update(
                &RecordFilter::pair(channel_id, target_id),
                &SanctionPatch::expire_now(),
            )
            .await?;
        info!(channel = %channel_id, target = %target_id, by = %actor_id, lifted = lifted.len(), "User unwarned");

        Ok(format!("*<@{target_id}>* has been unwarned by {}!", self.bot.name))
    }

    /// List the active warnings of this channel.
    pub async fn warnings(&self, channel_id: &str) -> CommandResponse {
        let result = self.try_warnings(channel_id).await;
        self.conclude("warnings", result, || {
            format!("Sorry, but there was a problem getting *<#{channel_id}> warnings.*")
        })
    }

    async fn try_warnings(&self, channel_id: &str) -> Result<String, ModerationError> {
        let warnings = self
            .db
            .warnings()
            .find(&RecordFilter::channel(channel_id))
            .await?;

        let listing: Vec<String> = warnings
            .iter()
            .map(|w| {
                format!(
                    "<@{}>:\n    *Warned*: {}\n    *Expires*: {}\n    *Reason*: {}",
                    w.user_id,
                    format_timestamp(w.created_at),
                    format_timestamp(w.expires_at),
                    w.reason
                )
            })
            .collect();

        Ok(format!(
            "*<#{channel_id}> Warnings*:\n{}",
            if listing.is_empty() {
                "None".to_string()
            } else {
                listing.join("\n")
            }
        ))
    }
}
