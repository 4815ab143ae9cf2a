//! Moderation services.
//!
//! - [`chanserv`]: command handlers, each behind its own failure boundary
//! - [`enforce`]: join enforcement (bans, registration)
//! - [`permissions`]: per-channel permission sets and the authorization rule

pub mod chanserv;
pub mod enforce;
pub mod permissions;

pub use chanserv::{ChanServ, CommandResponse};
pub use permissions::{PermissionEvaluator, Permissions};
