//! Inbound event types.
//!
//! Slack delivers events as loosely typed JSON. [`decode`] turns one inner
//! event object into an [`InboundEvent`] and never fails: payloads that do
//! not fit their declared type become [`InboundEvent::Error`].

use serde::Deserialize;
use serde_json::Value;

/// A decoded inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Message(MessageEvent),
    MemberJoined(JoinEvent),
    Error(EventError),
    /// A well-formed event of a type the bot does not handle.
    Ignored(String),
}

impl InboundEvent {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::MemberJoined(_) => "member_joined_channel",
            Self::Error(_) => "error",
            Self::Ignored(_) => "ignored",
        }
    }
}

/// A channel message, including topic/purpose change notices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageEvent {
    #[serde(default)]
    pub subtype: Option<String>,
    pub channel: String,
    /// Absent for some bot and system messages.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ts: String,
    /// New topic, on `channel_topic` messages.
    #[serde(default)]
    pub topic: Option<String>,
    /// New purpose, on `channel_purpose` messages.
    #[serde(default)]
    pub purpose: Option<String>,
}

/// A user joining a channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JoinEvent {
    pub user: String,
    pub channel: String,
    /// `C` for public channels, `G` for private ones.
    #[serde(default)]
    pub channel_type: String,
}

/// An event-stream error, or a payload that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventError {
    pub message: String,
}

/// Decode one inner event object.
pub fn decode(event: Value) -> InboundEvent {
    let Some(kind) = event.get("type").and_then(Value::as_str).map(str::to_owned) else {
        return InboundEvent::Error(EventError {
            message: "event has no type".to_string(),
        });
    };

    match kind.as_str() {
        "message" => match serde_json::from_value::<MessageEvent>(event) {
            Ok(message) => InboundEvent::Message(message),
            Err(e) => malformed(&kind, e),
        },
        "member_joined_channel" => match serde_json::from_value::<JoinEvent>(event) {
            Ok(join) => InboundEvent::MemberJoined(join),
            Err(e) => malformed(&kind, e),
        },
        "error" => {
            let message = event
                .get("error")
                .and_then(|e| {
                    e.as_str()
                        .or_else(|| e.get("msg").and_then(Value::as_str))
                        .or_else(|| e.get("message").and_then(Value::as_str))
                })
                .unwrap_or("unknown error")
                .to_string();
            InboundEvent::Error(EventError { message })
        }
        _ => InboundEvent::Ignored(kind),
    }
}

fn malformed(kind: &str, err: serde_json::Error) -> InboundEvent {
    InboundEvent::Error(EventError {
        message: format!("malformed {kind} event: {err}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_plain_message() {
        let event = decode(json!({
            "type": "message",
            "channel": "C1",
            "user": "U1",
            "text": "!help",
            "ts": "1530000000.000100"
        }));
        let InboundEvent::Message(message) = event else {
            panic!("expected message");
        };
        assert_eq!(message.text, "!help");
        assert_eq!(message.user.as_deref(), Some("U1"));
        assert!(message.subtype.is_none());
    }

    #[test]
    fn decodes_topic_change() {
        let event = decode(json!({
            "type": "message",
            "subtype": "channel_topic",
            "channel": "C1",
            "user": "U1",
            "text": "<@U1> set the channel topic: Rust",
            "topic": "Rust",
            "ts": "1.2"
        }));
        let InboundEvent::Message(message) = event else {
            panic!("expected message");
        };
        assert_eq!(message.subtype.as_deref(), Some("channel_topic"));
        assert_eq!(message.topic.as_deref(), Some("Rust"));
    }

    #[test]
    fn message_without_text_defaults_to_empty() {
        let event = decode(json!({"type": "message", "channel": "C1"}));
        assert!(matches!(event, InboundEvent::Message(m) if m.text.is_empty() && m.user.is_none()));
    }

    #[test]
    fn decodes_join() {
        let event = decode(json!({
            "type": "member_joined_channel",
            "user": "U1",
            "channel": "C1",
            "channel_type": "C"
        }));
        assert_eq!(
            event,
            InboundEvent::MemberJoined(JoinEvent {
                user: "U1".into(),
                channel: "C1".into(),
                channel_type: "C".into(),
            })
        );
    }

    #[test]
    fn malformed_payloads_become_errors() {
        assert!(matches!(
            decode(json!({"type": "member_joined_channel", "channel": "C1"})),
            InboundEvent::Error(e) if e.message.contains("member_joined_channel")
        ));
        assert!(matches!(decode(json!({"text": "no type"})), InboundEvent::Error(_)));
        assert!(matches!(decode(json!("not an object")), InboundEvent::Error(_)));
        assert!(matches!(
            decode(json!({"type": "message", "channel": 42})),
            InboundEvent::Error(_)
        ));
    }

    #[test]
    fn error_and_unknown_events() {
        assert_eq!(
            decode(json!({"type": "error", "error": {"msg": "socket closed"}})),
            InboundEvent::Error(EventError {
                message: "socket closed".into()
            })
        );
        assert_eq!(
            decode(json!({"type": "reaction_added"})),
            InboundEvent::Ignored("reaction_added".into())
        );
    }
}
