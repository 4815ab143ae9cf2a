//! ChanServ command handlers.
//!
//! Organized into submodules by functionality; each adds an `impl ChanServ`
//! block.

mod access;
mod info;
mod moderation;
mod protect;
mod register;
mod remove;
mod warnings;
mod whois;

pub use info::HelpEntry;
pub use register::RegisterRequest;
pub use remove::RemoveRequest;

use crate::config::BotConfig;
use crate::db::{Channel, Database};
use crate::error::ModerationError;
use crate::metrics;
use crate::platform::{Platform, UserProfile};
use crate::services::permissions::PermissionEvaluator;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of a command, ready to be posted back to a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResponse {
    pub response: Option<String>,
    pub error: Option<String>,
}

impl CommandResponse {
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            error: None,
        }
    }

    pub fn failed(response: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            error: Some(error.into()),
        }
    }

    /// Nothing to say.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Chat text for this response, or `None` when there is nothing to post.
    pub fn render(&self, bot_name: &str) -> Option<String> {
        if self.response.is_none() && self.error.is_none() {
            return None;
        }
        let mut text = format!("—— {bot_name} ——");
        if let Some(response) = &self.response {
            text.push('\n');
            text.push_str(response);
        }
        if let Some(error) = &self.error {
            text.push_str("\n*Error*: ");
            text.push_str(error);
        }
        Some(text)
    }
}

/// ChanServ service.
pub struct ChanServ {
    pub(crate) db: Database,
    pub(crate) platform: Arc<dyn Platform>,
    pub(crate) evaluator: PermissionEvaluator,
    pub(crate) bot: BotConfig,
}

impl ChanServ {
    /// Create a new ChanServ service.
    pub fn new(db: Database, platform: Arc<dyn Platform>, bot: BotConfig) -> Self {
        Self {
            db,
            platform,
            evaluator: PermissionEvaluator::new(bot.user_id.clone()),
            bot,
        }
    }

    pub fn bot(&self) -> &BotConfig {
        &self.bot
    }

    pub fn evaluator(&self) -> &PermissionEvaluator {
        &self.evaluator
    }

    /// Post a response to a channel. Silent responses post nothing.
    pub async fn respond(
        &self,
        channel_id: &str,
        response: &CommandResponse,
    ) -> Result<(), crate::platform::PlatformError> {
        match response.render(&self.bot.name) {
            Some(text) => self.platform.post_message(channel_id, &text).await,
            None => Ok(()),
        }
    }

    // ========== Helpers shared by command handlers ==========

    /// Load a registered channel, or fail with `NotFound`.
    pub(crate) async fn registered_channel(
        &self,
        channel_id: &str,
    ) -> Result<Channel, ModerationError> {
        self.db
            .channels()
            .find_one(channel_id)
            .await?
            .ok_or_else(|| {
                ModerationError::NotFound(format!("<#{channel_id}> is not a registered channel."))
            })
    }

    /// Fetch channel, actor and optional target, then authorize.
    ///
    /// Reads are sequential and fresh for every call.
    pub(crate) async fn authorize(
        &self,
        channel_id: &str,
        actor_id: &str,
        target_id: Option<&str>,
    ) -> Result<(Channel, UserProfile, Option<UserProfile>), ModerationError> {
        let channel = self.registered_channel(channel_id).await?;
        let actor = self.platform.user_info(actor_id).await?;
        let target = match target_id {
            Some(id) => Some(self.platform.user_info(id).await?),
            None => None,
        };

        self.evaluator.check(&channel, &actor, target.as_ref())?;
        Ok((channel, actor, target))
    }

    /// Close a command boundary: success text, or apology plus reason.
    pub(crate) fn conclude(
        &self,
        command: &'static str,
        result: Result<String, ModerationError>,
        apology: impl FnOnce() -> String,
    ) -> CommandResponse {
        match result {
            Ok(response) => CommandResponse::ok(response),
            Err(e) => {
                if e.is_external() {
                    warn!(command, error = %e, "Command failed");
                } else {
                    debug!(command, error = %e, "Command refused");
                }
                metrics::record_command_error(command, e.error_code());
                CommandResponse::failed(apology(), e.to_string())
            }
        }
    }
}

/// Join user ids as mentions, or "None".
pub(crate) fn mention_list<'a>(ids: impl IntoIterator<Item = &'a String>) -> String {
    let mentions: Vec<String> = ids.into_iter().map(|id| format!("<@{id}>")).collect();
    if mentions.is_empty() {
        "None".to_string()
    } else {
        mentions.join(", ")
    }
}
