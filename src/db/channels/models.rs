//! Channel database models.

use std::collections::BTreeSet;

/// A registered channel, as seen at the moment it was read.
///
/// `ops`, `bans` and `warnings` are deduplicated views over the operator,
/// ban and warning tables (bans and warnings filtered to unexpired rows).
/// They are a snapshot, not the source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub channel_id: String,
    pub name: String,
    pub topic: String,
    pub purpose: String,
    pub owner_id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub ops: BTreeSet<String>,
    pub bans: BTreeSet<String>,
    pub warnings: BTreeSet<String>,
}

impl Channel {
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    pub fn is_op(&self, user_id: &str) -> bool {
        self.ops.contains(user_id)
    }

    pub fn is_banned(&self, user_id: &str) -> bool {
        self.bans.contains(user_id)
    }

    pub fn is_warned(&self, user_id: &str) -> bool {
        self.warnings.contains(user_id)
    }
}

/// Fields supplied when registering a channel.
#[derive(Debug, Clone)]
pub struct NewChannel {
    pub channel_id: String,
    pub name: String,
    pub topic: String,
    pub purpose: String,
    pub owner_id: String,
}
