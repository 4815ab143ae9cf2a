//! Event routing.
//!
//! The [`Bot`] owns the command [`Registry`] and the [`ChanServ`] service.
//! Messages are matched against every eligible descriptor and all matching
//! handlers run concurrently, each behind its own failure boundary. Join
//! events drive enforcement.

mod registry;

pub use registry::{CommandDescriptor, CommandKind, Registry, Scope};

use crate::config::BotConfig;
use crate::db::Database;
use crate::error::{HandlerError, HandlerResult};
use crate::events::{EventError, InboundEvent, JoinEvent, MessageEvent};
use crate::metrics;
use crate::platform::Platform;
use crate::services::chanserv::{
    ChanServ, CommandResponse, DEFAULT_BAN_DURATION, RegisterRequest, RemoveRequest,
    parse_duration,
};
use crate::telemetry::{CommandTimer, spans};
use chrono::Duration;
use futures_util::FutureExt;
use futures_util::future::join_all;
use regex::Captures;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{Instrument, debug, warn};

const WARN_REASON: &str = "You have been warned.";
const KICK_REASON: &str = "You have been kicked.";
const BAN_REASON: &str = "You have been banned.";

/// How a candidate command fared against one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// The pattern did not match; no handler ran.
    Unmatched,
    Matched,
    Error,
}

impl DispatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unmatched => "unmatched",
            Self::Matched => "matched",
            Self::Error => "error",
        }
    }
}

/// Result of one candidate command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub name: &'static str,
    pub status: DispatchStatus,
    pub error: Option<String>,
}

impl CommandOutcome {
    fn unmatched(name: &'static str) -> Self {
        Self {
            name,
            status: DispatchStatus::Unmatched,
            error: None,
        }
    }
}

/// Result of handling a member join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Not a public channel.
    Skipped,
    Handled,
    /// At least one enforcement reported an error.
    Failed,
}

/// Result of routing one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Message(Vec<CommandOutcome>),
    Join(JoinOutcome),
    Error,
    Ignored,
}

/// The bot: command router plus join enforcement.
pub struct Bot {
    chanserv: ChanServ,
    registry: Registry,
}

impl Bot {
    pub fn new(db: Database, platform: Arc<dyn Platform>, config: BotConfig) -> Self {
        let registry = Registry::new(&config);
        Self {
            chanserv: ChanServ::new(db, platform, config),
            registry,
        }
    }

    pub fn chanserv(&self) -> &ChanServ {
        &self.chanserv
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Log the command table and return the registered names.
    pub fn initialize(&self) -> Vec<&'static str> {
        for command in self.registry.commands() {
            debug!(
                command = command.name,
                scope = command.scope.as_str(),
                subtype = command.subtype.unwrap_or("-"),
                "Registered command"
            );
        }
        self.registry.names()
    }

    /// Route one inbound event.
    pub async fn handle_event(&self, event: InboundEvent) -> EventOutcome {
        metrics::record_event(event.kind());
        match event {
            InboundEvent::Message(message) => EventOutcome::Message(self.on_message(&message).await),
            InboundEvent::MemberJoined(join) => EventOutcome::Join(self.on_join(&join).await),
            InboundEvent::Error(error) => {
                self.on_error(&error);
                EventOutcome::Error
            }
            InboundEvent::Ignored(kind) => {
                debug!(kind = %kind, "Ignoring event");
                EventOutcome::Ignored
            }
        }
    }

    /// Dispatch a message to every candidate command.
    ///
    /// One outcome per candidate, in table order. Matched handlers run
    /// concurrently.
    pub async fn on_message(&self, message: &MessageEvent) -> Vec<CommandOutcome> {
        let Some(candidates) = self.registry.candidates(message.subtype.as_deref()) else {
            return Vec::new();
        };
        // Our own posts carry command usage text; never react to them.
        if message.subtype.is_none()
            && message.user.as_deref() == Some(self.chanserv.evaluator().system_actor_id())
        {
            return Vec::new();
        }

        let runs = candidates.into_iter().map(|descriptor| async move {
            match descriptor.pattern.captures(&message.text) {
                Some(captures) => self.run(descriptor, captures, message).await,
                None => CommandOutcome::unmatched(descriptor.name),
            }
        });
        join_all(runs).await
    }

    async fn run(
        &self,
        descriptor: &CommandDescriptor,
        captures: Captures<'_>,
        message: &MessageEvent,
    ) -> CommandOutcome {
        let name = descriptor.name;
        let span = spans::command(name, &message.channel, message.user.as_deref());

        let result = async {
            debug!("Command matched");
            let _timer = CommandTimer::new(name);
            AssertUnwindSafe(self.execute(descriptor.kind, &captures, message))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(HandlerError::Panicked(panic_message(panic))))
        }
        .instrument(span)
        .await;

        let outcome = match result {
            Ok(()) => {
                debug!(command = name, "Command completed");
                CommandOutcome {
                    name,
                    status: DispatchStatus::Matched,
                    error: None,
                }
            }
            Err(e) => {
                warn!(command = name, error = %e, "Command error");
                metrics::record_command_error(name, e.error_code());
                CommandOutcome {
                    name,
                    status: DispatchStatus::Error,
                    error: Some(e.to_string()),
                }
            }
        };
        metrics::record_command(name, outcome.status.as_str());
        outcome
    }

    async fn execute(
        &self,
        kind: CommandKind,
        captures: &Captures<'_>,
        message: &MessageEvent,
    ) -> HandlerResult {
        let cs = &self.chanserv;
        let channel = message.channel.as_str();

        let response = match kind {
            CommandKind::Help => cs.help(self.registry.help_entries()),
            CommandKind::Report => cs.report(channel, actor(message)?).await,
            CommandKind::Info => cs.info(channel).await,
            CommandKind::Warnings => cs.warnings(channel).await,
            CommandKind::Bans => cs.bans(channel).await,
            CommandKind::Register => {
                let request = RegisterRequest {
                    channel_id: arg(captures, 1, "channel")?.to_string(),
                    channel_name: captures
                        .get(2)
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default(),
                    owner_id: arg(captures, 3, "owner")?.to_string(),
                    admin_id: actor(message)?.to_string(),
                };
                let response = cs.register(&request).await;
                respond(cs, channel, &response).await?;
                if request.channel_id != channel {
                    respond(cs, &request.channel_id, &response).await?;
                }
                return Ok(());
            }
            CommandKind::Warn => {
                let target = arg(captures, 1, "user")?;
                let reason = reason_or(captures.get(2).map(|m| m.as_str()), WARN_REASON);
                cs.warn(channel, actor(message)?, target, &reason).await
            }
            CommandKind::Unwarn => {
                cs.unwarn(channel, actor(message)?, arg(captures, 1, "user")?)
                    .await
            }
            CommandKind::Kick => {
                let target = arg(captures, 1, "user")?;
                let reason = reason_or(captures.get(2).map(|m| m.as_str()), KICK_REASON);
                cs.kick(channel, actor(message)?, target, &reason).await
            }
            CommandKind::Ban => {
                let target = arg(captures, 1, "user")?;
                let (duration, reason) = ban_arguments(captures.get(2).map(|m| m.as_str()));
                cs.ban(channel, actor(message)?, target, duration, &reason)
                    .await
            }
            CommandKind::Unban => {
                cs.unban(channel, actor(message)?, arg(captures, 1, "user")?)
                    .await
            }
            CommandKind::Op => cs.op(channel, actor(message)?, arg(captures, 1, "user")?).await,
            CommandKind::Deop => {
                cs.deop(channel, actor(message)?, arg(captures, 1, "user")?)
                    .await
            }
            CommandKind::Whois => {
                cs.whois(channel, actor(message)?, arg(captures, 1, "user")?)
                    .await
            }
            CommandKind::Remove => {
                if message.ts.is_empty() {
                    return Err(HandlerError::MissingField("ts"));
                }
                let request = RemoveRequest {
                    actor_id: actor(message)?.to_string(),
                    target_channel_id: arg(captures, 1, "channel")?.to_string(),
                    target_ts: format!(
                        "{}.{}",
                        arg(captures, 2, "timestamp")?,
                        arg(captures, 3, "timestamp")?
                    ),
                    current_channel_id: channel.to_string(),
                    current_ts: message.ts.clone(),
                };
                cs.remove_message(&request).await
            }
            CommandKind::ProtectTopic => {
                let topic = message
                    .topic
                    .as_deref()
                    .ok_or(HandlerError::MissingField("topic"))?;
                cs.protect_topic(channel, actor(message)?, topic).await
            }
            CommandKind::ProtectPurpose => {
                let purpose = message
                    .purpose
                    .as_deref()
                    .ok_or(HandlerError::MissingField("purpose"))?;
                cs.protect_purpose(channel, actor(message)?, purpose).await
            }
        };

        respond(cs, channel, &response).await
    }

    /// Run ban and registration enforcement for a member join.
    ///
    /// Both checks always run; a failure in one does not stop the other.
    pub async fn on_join(&self, event: &JoinEvent) -> JoinOutcome {
        if event.channel_type != "C" {
            return JoinOutcome::Skipped;
        }

        async {
            let cs = &self.chanserv;
            let mut failed = false;

            let ban = cs.enforce_ban(&event.channel, &event.user).await;
            failed |= self.post_enforcement(&event.channel, ban).await;

            let registration = cs.enforce_registration(&event.channel, &event.user).await;
            failed |= self.post_enforcement(&event.channel, registration).await;

            if failed {
                JoinOutcome::Failed
            } else {
                JoinOutcome::Handled
            }
        }
        .instrument(spans::join(&event.channel, &event.user))
        .await
    }

    /// Post an enforcement result. Returns true when it counts as a failure.
    async fn post_enforcement(&self, channel: &str, response: Option<CommandResponse>) -> bool {
        let Some(response) = response else {
            return false;
        };
        if let Err(e) = self.chanserv.respond(channel, &response).await {
            warn!(channel = %channel, error = %e, "Failed to post enforcement result");
            return true;
        }
        response.is_error()
    }

    /// Log a platform error event.
    pub fn on_error(&self, error: &EventError) {
        warn!(message = %error.message, "Platform reported an error");
    }
}

async fn respond(cs: &ChanServ, channel: &str, response: &CommandResponse) -> HandlerResult {
    cs.respond(channel, response)
        .await
        .map_err(HandlerError::Respond)
}

fn actor(message: &MessageEvent) -> Result<&str, HandlerError> {
    message
        .user
        .as_deref()
        .ok_or(HandlerError::MissingField("user"))
}

fn arg<'t>(captures: &Captures<'t>, index: usize, name: &'static str) -> Result<&'t str, HandlerError> {
    captures
        .get(index)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .ok_or(HandlerError::MissingArgument(name))
}

fn reason_or(reason: Option<&str>, default: &str) -> String {
    match reason.map(str::trim) {
        Some(reason) if !reason.is_empty() => reason.to_string(),
        _ => default.to_string(),
    }
}

/// Split `!ban` trailing text into a duration and a reason.
///
/// The first token is a duration only if it parses as one; otherwise the
/// whole text is the reason and the default duration applies.
fn ban_arguments(rest: Option<&str>) -> (Duration, String) {
    let rest = rest.map(str::trim).unwrap_or_default();
    let (first, remainder) = match rest.split_once(char::is_whitespace) {
        Some((first, remainder)) => (first, remainder),
        None => (rest, ""),
    };

    match parse_duration(first) {
        Some(duration) => (duration, reason_or(Some(remainder), BAN_REASON)),
        None => (DEFAULT_BAN_DURATION, reason_or(Some(rest), BAN_REASON)),
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
