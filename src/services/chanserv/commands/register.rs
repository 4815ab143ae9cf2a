//! Channel registration command: REGISTER.

use super::{ChanServ, CommandResponse};
use crate::db::{DbError, NewChannel};
use crate::error::ModerationError;
use crate::services::chanserv::format_timestamp;
use tracing::info;

/// Longest topic or purpose stored at registration.
const MAX_TEXT_LEN: usize = 250;

/// Arguments of `!register <#channel|name> <@owner>`.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub channel_id: String,
    /// Name from the mention; may be empty, in which case the platform's is used.
    pub channel_name: String,
    pub owner_id: String,
    /// The admin issuing the command.
    pub admin_id: String,
}

impl ChanServ {
    /// Register a channel to an owner. Admin only.
    pub async fn register(&self, request: &RegisterRequest) -> CommandResponse {
        let result = self.try_register(request).await;
        self.conclude("register", result, || {
            format!(
                "Sorry, but there was a problem registering *<#{}>.*",
                request.channel_id
            )
        })
    }

    async fn try_register(&self, request: &RegisterRequest) -> Result<String, ModerationError> {
        let channel_id = request.channel_id.as_str();

        let admin = self.platform.user_info(&request.admin_id).await?;
        if !admin.is_admin {
            return Err(ModerationError::Authorization(
                "You must be an administrator to register channels.".to_string(),
            ));
        }

        if let Some(existing) = self.db.channels().find_one(channel_id).await? {
            return Err(already_registered(&existing.owner_id));
        }

        let target = self.platform.channel_info(channel_id).await?;
        if !target.is_channel {
            return Err(ModerationError::NotFound(format!(
                "This channel <#{channel_id}> has not been created yet."
            )));
        }

        let name = if request.channel_name.is_empty() {
            target.name.clone()
        } else {
            request.channel_name.clone()
        };

        let created = self
            .db
            .channels()
            .create(NewChannel {
                channel_id: channel_id.to_string(),
                name,
                topic: truncate(&target.topic, MAX_TEXT_LEN),
                purpose: truncate(&target.purpose, MAX_TEXT_LEN),
                owner_id: request.owner_id.clone(),
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration.
                DbError::ChannelExists(_) => ModerationError::Rejected(format!(
                    "<#{channel_id}> was registered while this request was running."
                )),
                other => other.into(),
            })?;

        info!(
            channel = %channel_id,
            owner = %request.owner_id,
            by = %request.admin_id,
            "Channel registered"
        );

        self.platform.invite(channel_id, &self.bot.user_id).await?;
        self.platform.set_topic(channel_id, &created.topic).await?;
        self.platform.set_purpose(channel_id, &created.purpose).await?;

        let mut response = format!(
            "*Registered <#{channel_id}>!*:\n*Registered:* {}\n*Channel Owner:* <@{}>\n*Topic*: {}\n*Purpose*: {}",
            format_timestamp(created.created_at),
            request.owner_id,
            created.topic,
            created.purpose,
        );

        if !target.creator.is_empty() && target.creator != request.owner_id {
            response.push_str(&format!(
                "\n*Notice*: <@{}>, this channel has been registered to <@{}>. You initially created this channel on {}. If you would like to dispute this registration, please visit <#{}>.",
                target.creator,
                request.owner_id,
                format_timestamp(target.created),
                self.bot.support_channel_id,
            ));
        }

        Ok(response)
    }
}

fn already_registered(owner_id: &str) -> ModerationError {
    ModerationError::Rejected(format!("This channel is already registered to <@{owner_id}>"))
}

/// Cut to `max` characters, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("Welcome", 250), "Welcome");
        assert_eq!(truncate(&"a".repeat(250), 250), "a".repeat(250));
    }

    #[test]
    fn truncate_cuts_on_char_boundary() {
        let long = "é".repeat(300);
        let cut = truncate(&long, 250);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 253);
    }

    #[test]
    fn already_registered_names_owner() {
        assert_eq!(
            already_registered("UOWNER").to_string(),
            "This channel is already registered to <@UOWNER>"
        );
    }
}
