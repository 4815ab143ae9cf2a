//! User lookup command: WHOIS.

use super::{ChanServ, CommandResponse};
use crate::db::RecordFilter;
use crate::error::ModerationError;

impl ChanServ {
    /// Report a user's profile, presence, operator grants and bans
    /// across every channel.
    pub async fn whois(&self, channel_id: &str, actor_id: &str, target_id: &str) -> CommandResponse {
        let result = self.try_whois(channel_id, actor_id, target_id).await;
        self.conclude("whois", result, || {
            format!("Sorry, but we were unable to whois *<@{target_id}>*")
        })
    }

    async fn try_whois(
        &self,
        channel_id: &str,
        actor_id: &str,
        target_id: &str,
    ) -> Result<String, ModerationError> {
        let (_, _, target) = self.authorize(channel_id, actor_id, Some(target_id)).await?;
        let target = target.ok_or_else(|| {
            ModerationError::NotFound(format!("No profile found for <@{target_id}>."))
        })?;

        let conversations = self.platform.user_conversations(target_id).await?;
        let presence = self.platform.presence(target_id).await?;
        let ops = self.db.operators().find(&RecordFilter::user(target_id)).await?;
        let bans = self.db.bans().find(&RecordFilter::user(target_id)).await?;

        let channels = channel_mentions(conversations.iter().map(String::as_str));
        let ops = channel_mentions(ops.iter().map(|o| o.channel_id.as_str()));
        let bans = channel_mentions(bans.iter().map(|b| b.channel_id.as_str()));

        Ok(format!(
            "WHOIS for *<@{target_id}> ({})*:\n\n*Status:* {presence} — {} — {}\n\n*Admin:* {}\n*Owner:* {}\n*Bot:* {}\n*Operator:* {}\n*Bans:* {}\n*Channels:* {}\n*Avatar:* {}",
            target.real_name,
            target.status_emoji,
            target.status_text,
            yes_no(target.is_admin),
            yes_no(target.is_owner),
            yes_no(target.is_bot),
            if ops.is_empty() { "No".to_string() } else { format!("On {ops}") },
            if bans.is_empty() { "No".to_string() } else { format!("Banned on {bans}") },
            if channels.is_empty() { "None".to_string() } else { channels },
            target.avatar_url,
        ))
    }
}

/// Deduplicated `<#C>` mentions in first-seen order.
fn channel_mentions<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen.iter()
        .map(|id| format!("<#{id}>"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}
