//! Inbound events from the platform connection.
//!
//! The connection collaborator pushes [`InboundEvent`]s into the runtime in
//! delivery order. The set of variants is closed: anything the platform sends
//! that Courier does not model is decoded as [`InboundEvent::Other`].
//!
//! ```text
//! InboundEvent
//! ├── Hello
//! ├── Connected { self }
//! ├── Message(MessageEvent { channel, user, bot_id, text, subtype })
//! ├── PresenceChange { user, presence }
//! ├── LatencyReport { value_ms }
//! ├── Error { error: { code, msg } }
//! ├── InvalidAuth
//! └── Other
//! ```

use serde::{Deserialize, Serialize};

use crate::error::EventResult;
use crate::identity::Identity;

/// Subtype the platform attaches to messages posted by bot integrations.
pub const BOT_MESSAGE_SUBTYPE: &str = "bot_message";

/// An event received from the platform connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// The server greeted the connection.
    Hello,

    /// The connection is established and the bot knows who it is.
    Connected {
        /// The bot's own user identity.
        #[serde(rename = "self")]
        self_identity: Identity,
    },

    /// A chat message.
    Message(MessageEvent),

    /// A user's presence changed.
    PresenceChange {
        /// The user whose presence changed.
        #[serde(default)]
        user: String,
        /// The new presence (`active`, `away`).
        #[serde(default)]
        presence: String,
    },

    /// Round-trip latency measured by the connection.
    LatencyReport {
        /// Latency in milliseconds.
        value_ms: u64,
    },

    /// The platform reported an error on the connection.
    Error {
        /// Error details.
        #[serde(default)]
        error: PlatformError,
    },

    /// The credentials were rejected; the connection will not recover.
    InvalidAuth,

    /// Any event type Courier does not model.
    #[serde(other)]
    Other,
}

impl InboundEvent {
    /// Decodes a single JSON wire event.
    pub fn from_json(payload: &str) -> EventResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Returns the wire name of this event.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Hello => "hello",
            Self::Connected { .. } => "connected",
            Self::Message(_) => "message",
            Self::PresenceChange { .. } => "presence_change",
            Self::LatencyReport { .. } => "latency_report",
            Self::Error { .. } => "error",
            Self::InvalidAuth => "invalid_auth",
            Self::Other => "other",
        }
    }
}

/// Error payload carried by [`InboundEvent::Error`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformError {
    /// Platform error code.
    #[serde(default)]
    pub code: i64,
    /// Human readable description.
    #[serde(default)]
    pub msg: String,
}

/// The raw fields of a chat message as delivered by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Channel id; its first character encodes the conversation kind.
    #[serde(default)]
    pub channel: String,
    /// Sender user id (empty for most bot messages).
    #[serde(default)]
    pub user: String,
    /// Sender bot id, set for bot-originated messages.
    #[serde(default)]
    pub bot_id: String,
    /// Message body, including raw `<@U…>` mention markup.
    #[serde(default)]
    pub text: String,
    /// Platform subtype, `bot_message` for bot posts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
}

impl MessageEvent {
    /// Creates a user message event.
    pub fn new(
        channel: impl Into<String>,
        user: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            user: user.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Creates a bot-originated message event.
    pub fn from_bot(
        channel: impl Into<String>,
        bot_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            bot_id: bot_id.into(),
            text: text.into(),
            subtype: Some(BOT_MESSAGE_SUBTYPE.to_string()),
            ..Default::default()
        }
    }

    /// Returns true if the platform flagged this message as posted by a bot.
    pub fn is_bot_subtype(&self) -> bool {
        self.subtype.as_deref() == Some(BOT_MESSAGE_SUBTYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_message() {
        let event = InboundEvent::from_json(
            r#"{"type":"message","channel":"D024BE91L","user":"U2147483697","text":"hello"}"#,
        )
        .unwrap();

        let InboundEvent::Message(msg) = event else {
            panic!("expected message event");
        };
        assert_eq!(msg.channel, "D024BE91L");
        assert_eq!(msg.user, "U2147483697");
        assert_eq!(msg.text, "hello");
        assert!(msg.bot_id.is_empty());
        assert!(!msg.is_bot_subtype());
    }

    #[test]
    fn test_parse_bot_message() {
        let event = InboundEvent::from_json(
            r#"{"type":"message","subtype":"bot_message","channel":"C1","bot_id":"B1","text":"deployed"}"#,
        )
        .unwrap();

        match event {
            InboundEvent::Message(msg) => {
                assert!(msg.is_bot_subtype());
                assert_eq!(msg.bot_id, "B1");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_other_subtypes_are_not_bot_messages() {
        let mut msg = MessageEvent::new("C1", "U1", "hi");
        msg.subtype = Some("channel_join".into());
        assert!(!msg.is_bot_subtype());
        assert!(MessageEvent::from_bot("C1", "B1", "hi").is_bot_subtype());
    }

    #[test]
    fn test_parse_connected() {
        let event = InboundEvent::from_json(
            r#"{"type":"connected","self":{"id":"U0BOT","name":"courier"}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            InboundEvent::Connected {
                self_identity: Identity::new("U0BOT", "courier"),
            }
        );
    }

    #[test]
    fn test_parse_error_and_invalid_auth() {
        let event =
            InboundEvent::from_json(r#"{"type":"error","error":{"code":1,"msg":"socket"}}"#)
                .unwrap();
        assert_eq!(event.event_name(), "error");

        let event = InboundEvent::from_json(r#"{"type":"invalid_auth"}"#).unwrap();
        assert_eq!(event, InboundEvent::InvalidAuth);
    }

    #[test]
    fn test_unknown_type_is_other() {
        let event = InboundEvent::from_json(r#"{"type":"reaction_added","user":"U1"}"#).unwrap();
        assert_eq!(event, InboundEvent::Other);
    }

    #[test]
    fn test_malformed_payload_is_parse_error() {
        assert!(InboundEvent::from_json("not json").is_err());
        assert!(InboundEvent::from_json(r#"{"channel":"C1"}"#).is_err());
    }
}
