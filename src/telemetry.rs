//! Telemetry utilities for command timing and tracing spans.

use std::time::Instant;

/// Guard for timing command execution and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command_latency(&self.command, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Create a span for one dispatched command.
    pub fn command(name: &str, channel: &str, user: Option<&str>) -> Span {
        if let Some(user) = user {
            info_span!("chanserv.command", command = %name, channel = %channel, user = %user)
        } else {
            info_span!("chanserv.command", command = %name, channel = %channel)
        }
    }

    /// Create a span for one join event.
    pub fn join(channel: &str, user: &str) -> Span {
        info_span!("chanserv.join", channel = %channel, user = %user)
    }
}
