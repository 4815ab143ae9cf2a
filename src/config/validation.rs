//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("bot.user_id is required")]
    MissingBotUserId,
    #[error("bot.support_channel_id is required")]
    MissingSupportChannel,
    #[error("bot.workspace_domain must be a DNS label, got '{0}'")]
    InvalidWorkspaceDomain(String),
    #[error("slack.{0} is required")]
    MissingCredential(&'static str),
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bot.user_id.trim().is_empty() {
        errors.push(ValidationError::MissingBotUserId);
    }
    if config.bot.support_channel_id.trim().is_empty() {
        errors.push(ValidationError::MissingSupportChannel);
    }
    if !is_dns_label(&config.bot.workspace_domain) {
        errors.push(ValidationError::InvalidWorkspaceDomain(
            config.bot.workspace_domain.clone(),
        ));
    }

    for (name, value) in [
        ("bot_token", &config.slack.bot_token),
        ("user_token", &config.slack.user_token),
        ("signing_secret", &config.slack.signing_secret),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::MissingCredential(name));
        }
    }

    if config.database.path != ":memory:" {
        let db_path = Path::new(&config.database.path);
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ValidationError::DatabasePathInvalid(
                config.database.path.clone(),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_dns_label(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 63
        && !s.starts_with('-')
        && !s.ends_with('-')
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
