//! HTTP surface: the Slack Events API endpoint plus metrics and health.
//!
//! Event requests are authenticated with Slack's `v0` request signature
//! before anything else is looked at. Accepted events are acknowledged
//! immediately and routed on a background task.

use crate::events;
use crate::handlers::Bot;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::Sha256;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Requests older than this are rejected as replays.
const MAX_SKEW_SECS: i64 = 60 * 5;

const SIGNATURE_HEADER: &str = "x-slack-signature";
const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
const RETRY_HEADER: &str = "x-slack-retry-num";

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<Bot>,
    pub signing_secret: Arc<str>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing header: {0}")]
    MissingHeader(&'static str),
    #[error("malformed timestamp")]
    MalformedTimestamp,
    #[error("request timestamp outside the allowed window")]
    Stale,
    #[error("malformed signature")]
    MalformedSignature,
    #[error("signature mismatch")]
    Mismatch,
}

/// Check a Slack request signature.
///
/// The signed base string is `v0:{timestamp}:{body}`; the signature header
/// is `v0=` followed by the hex HMAC-SHA256 of it under the signing secret.
pub fn verify_signature(
    secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let sent_at: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::MalformedTimestamp)?;
    if (now - sent_at).abs() > MAX_SKEW_SECS {
        return Err(SignatureError::Stale);
    }

    let expected = signature
        .strip_prefix("v0=")
        .and_then(|hex_sig| hex::decode(hex_sig).ok())
        .ok_or(SignatureError::MalformedSignature)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::Mismatch)?;
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

/// Outer Events API envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Envelope {
    UrlVerification { challenge: String },
    EventCallback { event: Value },
    #[serde(other)]
    Other,
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, SignatureError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(SignatureError::MissingHeader(name))
}

fn authenticate(secret: &str, headers: &HeaderMap, body: &[u8]) -> Result<(), SignatureError> {
    let timestamp = header(headers, TIMESTAMP_HEADER)?;
    let signature = header(headers, SIGNATURE_HEADER)?;
    verify_signature(secret, timestamp, body, signature, chrono::Utc::now().timestamp())
}

/// POST /slack/events
async fn events_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(e) = authenticate(&state.signing_secret, &headers, &body) {
        warn!(error = %e, "Rejected event request");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let envelope: Envelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Malformed event envelope");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match envelope {
        Envelope::UrlVerification { challenge } => {
            Json(json!({ "challenge": challenge })).into_response()
        }
        Envelope::EventCallback { event } => {
            // We always acknowledge at once, so a retry is a duplicate.
            if let Some(retry) = headers.get(RETRY_HEADER) {
                debug!(retry = ?retry, "Skipping redelivered event");
                return StatusCode::OK.into_response();
            }
            let bot = Arc::clone(&state.bot);
            tokio::spawn(async move {
                bot.handle_event(events::decode(event)).await;
            });
            StatusCode::OK.into_response()
        }
        Envelope::Other => StatusCode::OK.into_response(),
    }
}

/// GET /metrics
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// GET /health
async fn health_handler() -> &'static str {
    "ok"
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/slack/events", post(events_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Serve the HTTP endpoints until the listener fails.
pub async fn run_http_server(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");
    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";

    fn sign(timestamp: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("v0:{timestamp}:").as_bytes());
        mac.update(body);
        format!("v0={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn accepts_valid_signature() {
        let body = br#"{"type":"url_verification","challenge":"abc"}"#;
        let signature = sign("1531420618", body);
        assert_eq!(
            verify_signature(SECRET, "1531420618", body, &signature, 1531420618 + 30),
            Ok(())
        );
    }

    #[test]
    fn rejects_tampered_body() {
        let signature = sign("1531420618", b"original");
        assert_eq!(
            verify_signature(SECRET, "1531420618", b"tampered", &signature, 1531420618),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_stale_requests() {
        let signature = sign("1531420618", b"body");
        assert_eq!(
            verify_signature(SECRET, "1531420618", b"body", &signature, 1531420618 + 301),
            Err(SignatureError::Stale)
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(
            verify_signature(SECRET, "soon", b"body", "v0=00", 0),
            Err(SignatureError::MalformedTimestamp)
        );
        assert_eq!(
            verify_signature(SECRET, "100", b"body", "v1=00", 100),
            Err(SignatureError::MalformedSignature)
        );
        assert_eq!(
            verify_signature(SECRET, "100", b"body", "v0=zz", 100),
            Err(SignatureError::MalformedSignature)
        );
    }

    #[test]
    fn decodes_envelopes() {
        let verification: Envelope =
            serde_json::from_str(r#"{"type":"url_verification","challenge":"xyz","token":"t"}"#)
                .unwrap();
        assert!(matches!(verification, Envelope::UrlVerification { challenge } if challenge == "xyz"));

        let callback: Envelope = serde_json::from_str(
            r#"{"type":"event_callback","event":{"type":"member_joined_channel"}}"#,
        )
        .unwrap();
        assert!(matches!(callback, Envelope::EventCallback { .. }));

        let other: Envelope = serde_json::from_str(r#"{"type":"app_rate_limited"}"#).unwrap();
        assert!(matches!(other, Envelope::Other));
    }

    #[test]
    fn missing_headers_are_reported() {
        let headers = HeaderMap::new();
        assert_eq!(
            authenticate(SECRET, &headers, b""),
            Err(SignatureError::MissingHeader(TIMESTAMP_HEADER))
        );
    }
}
