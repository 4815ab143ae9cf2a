//! chanserv-ng - channel registration and moderation bot for Slack.
//!
//! Registers channels to owners, maintains per-channel operators, bans and
//! warnings, and enforces them as users join and edit channels.

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod handlers;
pub mod http;
pub mod metrics;
pub mod platform;
pub mod services;
pub mod telemetry;
