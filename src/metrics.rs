//! Prometheus metrics collection for chanserv-ng.
//!
//! - `chanserv_command_total{command,status}` - dispatched commands by outcome
//! - `chanserv_command_duration_seconds{command}` - command latency histogram
//! - `chanserv_command_errors_total{command,error}` - failures by error code
//! - `chanserv_enforcement_total{kind}` - users removed by join enforcement
//! - `chanserv_events_total{kind}` - inbound events by kind

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Commands dispatched, labeled by command name and outcome status.
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Command processing latency by command name.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Command errors by command name and error code.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Join enforcement removals (`ban`, `registration`).
pub static ENFORCEMENT: OnceLock<IntCounterVec> = OnceLock::new();

/// Inbound events by kind (`message`, `member_joined_channel`, ...).
pub static EVENTS: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at startup before any metrics are recorded.
/// Recording before `init` is a silent no-op.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("chanserv_command_total", "Commands dispatched by outcome"), &["command", "status"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("chanserv_command_duration_seconds", "Command latency by name")
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("chanserv_command_errors_total", "Command errors by type"), &["command", "error"]));
    register!(ENFORCEMENT, IntCounterVec::new(Opts::new("chanserv_enforcement_total", "Users removed by join enforcement"), &["kind"]));
    register!(EVENTS, IntCounterVec::new(Opts::new("chanserv_events_total", "Inbound events by kind"), &["kind"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

/// Record a dispatched command and its outcome status.
#[inline]
pub fn record_command(command: &str, status: &str) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command, status]).inc();
    }
}

/// Record command latency.
#[inline]
pub fn record_command_latency(command: &str, duration_secs: f64) {
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a command error.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

/// Record a user removed by join enforcement.
#[inline]
pub fn record_enforcement(kind: &str) {
    if let Some(c) = ENFORCEMENT.get() {
        c.with_label_values(&[kind]).inc();
    }
}

/// Record an inbound event.
#[inline]
pub fn record_event(kind: &str) {
    if let Some(c) = EVENTS.get() {
        c.with_label_values(&[kind]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        init();

        record_command("Ban", "matched");
        record_command_latency("Ban", 0.02);
        record_command_error("Ban", "authorization");
        record_enforcement("ban");
        record_event("message");

        let output = gather_metrics();
        assert!(output.contains("chanserv_command_total"));
        assert!(output.contains("chanserv_command_duration_seconds"));
        assert!(output.contains("chanserv_enforcement_total"));
        assert!(output.contains("chanserv_events_total"));
    }
}
