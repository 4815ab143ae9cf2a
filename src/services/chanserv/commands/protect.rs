//! Topic and purpose protection.
//!
//! These run after the platform has already applied the change. A
//! privileged actor's change is ratified and stored; anyone else's is
//! rolled back to the last stored value.

use super::{ChanServ, CommandResponse};
use crate::error::ModerationError;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Topic,
    Purpose,
}

impl Field {
    fn label(self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Purpose => "purpose",
        }
    }
}

impl ChanServ {
    /// React to a topic change on a registered channel.
    pub async fn protect_topic(&self, channel_id: &str, user_id: &str, topic: &str) -> CommandResponse {
        self.protect(Field::Topic, channel_id, user_id, topic).await
    }

    /// React to a purpose change on a registered channel.
    pub async fn protect_purpose(
        &self,
        channel_id: &str,
        user_id: &str,
        purpose: &str,
    ) -> CommandResponse {
        self.protect(Field::Purpose, channel_id, user_id, purpose).await
    }

    async fn protect(
        &self,
        field: Field,
        channel_id: &str,
        user_id: &str,
        value: &str,
    ) -> CommandResponse {
        match self.try_protect(field, channel_id, user_id, value).await {
            Ok(()) => CommandResponse::silent(),
            Err(e) => {
                let command = match field {
                    Field::Topic => "protect_topic",
                    Field::Purpose => "protect_purpose",
                };
                self.conclude(command, Err(e), || {
                    format!("Sorry, but we were unable to keep the {}.", field.label())
                })
            }
        }
    }

    async fn try_protect(
        &self,
        field: Field,
        channel_id: &str,
        user_id: &str,
        value: &str,
    ) -> Result<(), ModerationError> {
        let Some(mut channel) = self.db.channels().find_one(channel_id).await? else {
            // Unregistered channels have nothing to protect.
            return Ok(());
        };
        let actor = self.platform.user_info(user_id).await?;
        let permissions = self.evaluator.permissions(&channel, &actor);

        if permissions.is_admin || permissions.is_op || permissions.is_system_actor {
            match field {
                Field::Topic => channel.topic = value.to_string(),
                Field::Purpose => channel.purpose = value.to_string(),
            }
            self.db.channels().update(&channel).await?;
            return Ok(());
        }

        match field {
            Field::Topic => self.platform.set_topic(channel_id, &channel.topic).await?,
            Field::Purpose => self.platform.set_purpose(channel_id, &channel.purpose).await?,
        }
        info!(channel = %channel_id, user = %user_id, field = field.label(), "Reverted unauthorized change");

        Err(ModerationError::Authorization(format!(
            "You are not an operator or an admin. You may not change the channel {}!",
            field.label()
        )))
    }
}
