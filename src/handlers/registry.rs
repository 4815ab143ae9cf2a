//! Command registry.
//!
//! An ordered table of command descriptors. Text commands are `!`-prefixed
//! and matched case-insensitively; ambient commands are bound to a message
//! subtype and fire on any text that is not itself a command.

use crate::config::BotConfig;
use crate::services::chanserv::HelpEntry;
use regex::Regex;

/// Nominal privilege tier of a command, shown in help.
///
/// Authorization itself is decided by the permission evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Public,
    Op,
    Admin,
    System,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Op => "op",
            Self::Admin => "admin",
            Self::System => "system",
        }
    }
}

/// Which handler a descriptor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Help,
    Report,
    Info,
    Register,
    Warn,
    Unwarn,
    Warnings,
    Kick,
    Ban,
    Unban,
    Bans,
    Op,
    Deop,
    Whois,
    Remove,
    ProtectTopic,
    ProtectPurpose,
}

/// One entry of the command table.
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub scope: Scope,
    pub pattern: Regex,
    /// When set, the command only sees messages of this subtype.
    pub subtype: Option<&'static str>,
    pub help: &'static str,
    pub kind: CommandKind,
}

/// Matches a user mention: `<@U123>` or `<@U123|name>`.
const USER: &str = r"<@?(\w+)(?:\|[^>]*)?>";

/// Matches any text that does not start with the `!` command marker.
const AMBIENT: &str = r"(?s)^(?:[^!].*)?$";

/// The ordered command table.
pub struct Registry {
    commands: Vec<CommandDescriptor>,
}

impl Registry {
    /// Build the command table. The `remove` link pattern is bound to the
    /// configured workspace domain.
    pub fn new(bot: &BotConfig) -> Self {
        let remove = format!(
            r"!remove <https://{}\.slack\.com/archives/(\w+)/p(\d{{10}})(\d{{6}})(?:\?[^>|]*)?(?:\|[^>]*)?>",
            regex::escape(&bot.workspace_domain)
        );

        let table: Vec<(&'static str, Scope, String, Option<&'static str>, &'static str, CommandKind)> = vec![
            (
                "Help",
                Scope::Public,
                r"!help$".into(),
                None,
                "Display the available commands and their usage. Usage: `!help`",
                CommandKind::Help,
            ),
            (
                "Report",
                Scope::Public,
                r"!report$".into(),
                None,
                "Ping the server admins to report an incident or ask for help. Usage: `!report`",
                CommandKind::Report,
            ),
            (
                "Info",
                Scope::Public,
                r"!info$".into(),
                None,
                "Get information about a registered channel. Usage: `!info`",
                CommandKind::Info,
            ),
            (
                "Register",
                Scope::Admin,
                format!(r"!register <#(\w+)\|([^>]*)>\s+{USER}"),
                None,
                "Register a channel. Usage: `!register <#channel> <@user>`",
                CommandKind::Register,
            ),
            (
                "Warn",
                Scope::Op,
                format!(r"!warn {USER}(?:\s+(.*))?"),
                None,
                "Warn a user that if their behavior continues they will be kicked. Warnings expire after 30 days. Usage: `!warn <@user> <reason>`",
                CommandKind::Warn,
            ),
            (
                "Unwarn",
                Scope::Op,
                format!(r"!unwarn {USER}"),
                None,
                "Expire all active warnings for a user. Usage: `!unwarn <@user>`",
                CommandKind::Unwarn,
            ),
            (
                "Warnings",
                Scope::Public,
                r"!warnings$".into(),
                None,
                "List all warnings for a channel. Usage: `!warnings`",
                CommandKind::Warnings,
            ),
            (
                "Kick",
                Scope::Op,
                format!(r"!kick {USER}(?:\s+(.*))?"),
                None,
                "Remove a user from a channel. Usage: `!kick <@user> <reason?>`",
                CommandKind::Kick,
            ),
            (
                "Ban",
                Scope::Op,
                format!(r"!ban {USER}(?:\s+(.*))?"),
                None,
                "Ban a user from rejoining a channel. Defaults to 1 hour ban. Usage: `!ban <@user> <duration?> <reason?>`",
                CommandKind::Ban,
            ),
            (
                "Unban",
                Scope::Op,
                format!(r"!unban {USER}"),
                None,
                "Expire all active bans for a user. Usage: `!unban <@user>`",
                CommandKind::Unban,
            ),
            (
                "Bans",
                Scope::Public,
                r"!bans$".into(),
                None,
                "List all bans for a channel. Usage: `!bans`",
                CommandKind::Bans,
            ),
            (
                "Op",
                Scope::Op,
                format!(r"!op {USER}"),
                None,
                "Add an operator to the channel. An operator has access to kick, ban, op, warn, and other channel commands. Usage: `!op <@user>`",
                CommandKind::Op,
            ),
            (
                "Deop",
                Scope::Op,
                format!(r"!deop {USER}"),
                None,
                "Remove an operator from the channel. Usage: `!deop <@user>`",
                CommandKind::Deop,
            ),
            (
                "Whois",
                Scope::Public,
                format!(r"!whois {USER}"),
                None,
                "Display public information about a user. Such as channels, operator status, admin status. Usage: `!whois <@user>`",
                CommandKind::Whois,
            ),
            (
                "Remove",
                Scope::Op,
                remove,
                None,
                "Remove a message from a channel. Provide a link to the message (more actions -> copy link). Usage: `!remove <link>`",
                CommandKind::Remove,
            ),
            (
                "Protect Topic",
                Scope::System,
                AMBIENT.into(),
                Some("channel_topic"),
                "Enforces the set channel topic.",
                CommandKind::ProtectTopic,
            ),
            (
                "Protect Purpose",
                Scope::System,
                AMBIENT.into(),
                Some("channel_purpose"),
                "Enforces the set channel purpose.",
                CommandKind::ProtectPurpose,
            ),
        ];

        let commands = table
            .into_iter()
            .map(|(name, scope, pattern, subtype, help, kind)| CommandDescriptor {
                name,
                scope,
                pattern: Regex::new(&format!("(?i){pattern}"))
                    .expect("command patterns are valid regular expressions"),
                subtype,
                help,
                kind,
            })
            .collect();

        Self { commands }
    }

    /// Every descriptor, in table order.
    pub fn commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    /// Command names, in table order.
    pub fn names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|c| c.name).collect()
    }

    /// True when some descriptor is bound to `subtype`.
    pub fn accepts_subtype(&self, subtype: &str) -> bool {
        self.commands.iter().any(|c| c.subtype == Some(subtype))
    }

    /// Descriptors that see a message of the given subtype.
    ///
    /// `None` means the message is dropped outright: it carries a subtype no
    /// descriptor is bound to.
    pub fn candidates(&self, subtype: Option<&str>) -> Option<Vec<&CommandDescriptor>> {
        if let Some(subtype) = subtype
            && !self.accepts_subtype(subtype)
        {
            return None;
        }

        Some(
            self.commands
                .iter()
                .filter(|c| match c.subtype {
                    Some(bound) => Some(bound) == subtype,
                    None => true,
                })
                .collect(),
        )
    }

    /// Help listing: every command except system ones.
    pub fn help_entries(&self) -> impl Iterator<Item = HelpEntry<'_>> {
        self.commands
            .iter()
            .filter(|c| c.scope != Scope::System)
            .map(|c| HelpEntry {
                name: c.name,
                scope: c.scope.as_str(),
                help: c.help,
            })
    }
}
