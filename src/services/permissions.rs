//! Permission evaluation.
//!
//! Permission sets are derived on every check from the channel snapshot and
//! the user's platform profile. Nothing is cached between checks.

use crate::db::Channel;
use crate::error::ModerationError;
use crate::platform::UserProfile;

/// Roles a user holds relative to one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Permissions {
    pub is_owner: bool,
    pub is_op: bool,
    /// Platform-level admin flag.
    pub is_admin: bool,
    pub is_banned: bool,
    pub is_warned: bool,
    /// The bot itself.
    pub is_system_actor: bool,
}

impl Permissions {
    /// Protected identities can never be the object of a moderation action.
    pub fn is_protected(&self) -> bool {
        self.is_admin || self.is_system_actor
    }

    /// May run privileged commands.
    pub fn is_privileged(&self) -> bool {
        self.is_admin || self.is_op
    }
}

/// Computes permission sets and enforces the authorization rule.
#[derive(Debug, Clone)]
pub struct PermissionEvaluator {
    system_actor_id: String,
}

impl PermissionEvaluator {
    pub fn new(system_actor_id: impl Into<String>) -> Self {
        Self {
            system_actor_id: system_actor_id.into(),
        }
    }

    pub fn system_actor_id(&self) -> &str {
        &self.system_actor_id
    }

    /// Derive the permission set of `user` on `channel`.
    pub fn permissions(&self, channel: &Channel, user: &UserProfile) -> Permissions {
        Permissions {
            is_owner: channel.is_owner(&user.id),
            is_op: channel.is_op(&user.id),
            is_admin: user.is_admin,
            is_banned: channel.is_banned(&user.id),
            is_warned: channel.is_warned(&user.id),
            is_system_actor: user.id == self.system_actor_id,
        }
    }

    /// Authorize `actor` to act on `channel`, optionally against `target`.
    ///
    /// A protected target fails regardless of the actor's privilege.
    pub fn check(
        &self,
        channel: &Channel,
        actor: &UserProfile,
        target: Option<&UserProfile>,
    ) -> Result<(), ModerationError> {
        if let Some(target) = target
            && self.permissions(channel, target).is_protected()
        {
            return Err(ModerationError::Authorization(format!(
                "You can't perform that command on <@{}>.",
                target.id
            )));
        }

        if !self.permissions(channel, actor).is_privileged() {
            return Err(ModerationError::Authorization(format!(
                "You must be an operator on <#{}> or an admin to use this command.",
                channel.channel_id
            )));
        }

        Ok(())
    }
}
