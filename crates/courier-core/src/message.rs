//! The normalized message handed to handlers.

use serde::{Deserialize, Serialize};

use crate::classify::MessageType;
use crate::identity::Identity;

/// A fully built, classified chat message.
///
/// Produced by [`MessageBuilder`](crate::MessageBuilder) and consumed by the
/// dispatcher. `text` is the only field the dispatcher changes: command
/// handlers receive it with the command token stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The sender.
    pub from: Identity,
    /// Whether the platform flagged the message as posted by a bot.
    pub is_bot_message: bool,
    /// The message body.
    pub text: String,
    /// Channel id and display name.
    pub channel: Identity,
    /// Conversation kind derived from the channel id.
    pub message_type: MessageType,
    /// Whether the bot itself is among `mentions`.
    pub mentioned: bool,
    /// Resolved mentions, in order of appearance.
    pub mentions: Vec<Identity>,
}

impl Message {
    /// Returns true for direct conversations.
    pub fn is_direct(&self) -> bool {
        self.message_type == MessageType::Direct
    }

    /// Returns true for public channels.
    pub fn is_public(&self) -> bool {
        self.message_type == MessageType::Public
    }
}
