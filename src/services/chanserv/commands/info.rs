//! Informational commands: HELP, REPORT, INFO.

use super::{ChanServ, CommandResponse, mention_list};
use crate::error::ModerationError;
use crate::services::chanserv::format_timestamp;

/// One line of the help listing.
#[derive(Debug, Clone, Copy)]
pub struct HelpEntry<'a> {
    pub name: &'a str,
    pub scope: &'a str,
    pub help: &'a str,
}

impl ChanServ {
    /// List the available commands.
    pub fn help<'a>(&self, entries: impl IntoIterator<Item = HelpEntry<'a>>) -> CommandResponse {
        let commands: Vec<String> = entries
            .into_iter()
            .map(|e| format!("  — *{}* (_Scope: {}_):\n      {}", e.name, e.scope, e.help))
            .collect();

        CommandResponse::ok(format!(
            "*{name} Help*:\n\n{name} is a bot that helps manage channels on a public slack.\n\nBelow are a list of commands that are available:\n{}",
            commands.join("\n"),
            name = self.bot.name,
        ))
    }

    /// Acknowledge a request for help and notify the support channel.
    pub async fn report(&self, channel_id: &str, user_id: &str) -> CommandResponse {
        let result = self.try_report(channel_id, user_id).await;
        self.conclude("report", result, || {
            format!("Sorry, but there was a problem reporting from *<#{channel_id}>.*")
        })
    }

    async fn try_report(&self, channel_id: &str, user_id: &str) -> Result<String, ModerationError> {
        let notice = format!(
            "*Incident Report*: <@{user_id}> has asked for assistance in <#{channel_id}>."
        );
        self.platform
            .post_message(&self.bot.support_channel_id, &notice)
            .await?;

        Ok(format!(
            "*{name} Incident Response*:\n\nHello <@{user_id}>,\n\n<@{bot}> has notified the admin team that you are in need of assistance.\nThe server admins will contact you as soon as they are available.",
            name = self.bot.name,
            bot = self.bot.user_id,
        ))
    }

    /// Show a registered channel's owner, operators and active sanctions.
    pub async fn info(&self, channel_id: &str) -> CommandResponse {
        let result = self.try_info(channel_id).await;
        self.conclude("info", result, || {
            format!("Sorry, but there was a problem getting *<#{channel_id}> info.*")
        })
    }

    async fn try_info(&self, channel_id: &str) -> Result<String, ModerationError> {
        let channel = self.registered_channel(channel_id).await?;

        Ok(format!(
            "*<#{channel_id}> info*:\n*Registered:* {}\n*Channel Owner:* <@{}>\n*Operators:* {}\n*Active Bans:* {}\n*Active Warnings:* {}",
            format_timestamp(channel.created_at),
            channel.owner_id,
            mention_list(&channel.ops),
            mention_list(&channel.bans),
            mention_list(&channel.warnings),
        ))
    }
}
