//! Operator commands: OP, DEOP.

use super::{ChanServ, CommandResponse};
use crate::db::{NewOperator, RecordFilter};
use crate::error::ModerationError;
use tracing::info;

impl ChanServ {
    /// Grant operator status on this channel.
    pub async fn op(&self, channel_id: &str, actor_id: &str, target_id: &str) -> CommandResponse {
        let result = self.try_op(channel_id, actor_id, target_id).await;
        self.conclude("op", result, || {
            format!("Sorry, but we were unable to op *<@{target_id}>*")
        })
    }

    async fn try_op(
        &self,
        channel_id: &str,
        actor_id: &str,
        target_id: &str,
    ) -> Result<String, ModerationError> {
        let (channel, _, _) = self.authorize(channel_id, actor_id, Some(target_id)).await?;

        if channel.is_op(target_id) {
            return Ok(format!("*<@{target_id}>* is already an operator on <#{channel_id}>."));
        }

        self.db
            .operators()
            .create(NewOperator::new(channel_id, target_id))
            .await?;

        info!(channel = %channel_id, target = %target_id, by = %actor_id, "Operator granted");
        Ok(format!("*<@{target_id}>* has been opped by {}!", self.bot.name))
    }

    /// Revoke operator status on this channel.
    pub async fn deop(&self, channel_id: &str, actor_id: &str, target_id: &str) -> CommandResponse {
        let result = self.try_deop(channel_id, actor_id, target_id).await;
        self.conclude("deop", result, || {
            format!("Sorry, but we were unable to deop *<@{target_id}>*")
        })
    }

    async fn try_deop(
        &self,
        channel_id: &str,
        actor_id: &str,
        target_id: &str,
    ) -> Result<String, ModerationError> {
        self.authorize(channel_id, actor_id, Some(target_id)).await?;

        let removed = self
            .db
            .operators()
            .delete(&RecordFilter::pair(channel_id, target_id))
            .await?;

        info!(channel = %channel_id, target = %target_id, by = %actor_id, removed, "Operator revoked");
        Ok(format!("*<@{target_id}>* has been deoped by {}!", self.bot.name))
    }
}
