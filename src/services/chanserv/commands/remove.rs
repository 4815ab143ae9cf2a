//! Message removal command: REMOVE.

use super::{ChanServ, CommandResponse};
use crate::error::ModerationError;
use tracing::info;

/// Arguments of `!remove <message link>`.
#[derive(Debug, Clone)]
pub struct RemoveRequest {
    pub actor_id: String,
    /// Channel holding the message to delete.
    pub target_channel_id: String,
    pub target_ts: String,
    /// Where the `!remove` command was posted.
    pub current_channel_id: String,
    pub current_ts: String,
}

impl ChanServ {
    /// Delete a linked message and the command message itself.
    ///
    /// Authorized against the target message's channel. There is no
    /// target user to protect.
    pub async fn remove_message(&self, request: &RemoveRequest) -> CommandResponse {
        let result = self.try_remove_message(request).await;
        self.conclude("remove", result, || {
            "Sorry, but we were unable to remove the message.".to_string()
        })
    }

    async fn try_remove_message(&self, request: &RemoveRequest) -> Result<String, ModerationError> {
        self.authorize(&request.target_channel_id, &request.actor_id, None)
            .await?;

        self.platform
            .delete_message(&request.target_channel_id, &request.target_ts)
            .await?;
        self.platform
            .delete_message(&request.current_channel_id, &request.current_ts)
            .await?;

        info!(
            channel = %request.target_channel_id,
            ts = %request.target_ts,
            by = %request.actor_id,
            "Message removed"
        );
        Ok(format!(
            "Message ({}) removed by {}.",
            request.target_ts, self.bot.name
        ))
    }
}
