//! Unified error handling for chanserv-ng.
//!
//! Two layers: [`ModerationError`] is what a command fails with inside its
//! own boundary (it always ends up as a chat response), while
//! [`HandlerError`] is what the router records when a dispatched command
//! could not even produce or deliver a response.

use crate::db::DbError;
use crate::platform::PlatformError;
use thiserror::Error;

// ============================================================================
// Moderation Errors (inside a command)
// ============================================================================

/// Failures of a moderation action. The message is shown to the actor.
#[derive(Debug, Error)]
pub enum ModerationError {
    /// Actor lacks privilege, or the target is a protected identity.
    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    /// The request is well-formed but refused, e.g. a duplicate registration.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl ModerationError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Authorization(_) => "authorization",
            Self::NotFound(_) => "not_found",
            Self::Rejected(_) => "rejected",
            Self::Database(_) => "database",
            Self::Platform(e) => e.error_code(),
        }
    }

    /// True for failures of an external collaborator rather than policy.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Platform(_))
    }
}

// ============================================================================
// Handler Errors (router boundary)
// ============================================================================

/// Errors recorded by the router for a matched command.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("event is missing field: {0}")]
    MissingField(&'static str),

    #[error("failed to post response: {0}")]
    Respond(#[source] PlatformError),

    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingArgument(_) => "missing_argument",
            Self::MissingField(_) => "missing_field",
            Self::Respond(_) => "respond",
            Self::Panicked(_) => "panicked",
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
