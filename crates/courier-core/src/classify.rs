//! Channel classification.
//!
//! The platform encodes the conversation kind in the first character of the
//! channel id: `D…` for direct conversations and `C…` for public channels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Display name given to direct conversations.
pub const DIRECT_MESSAGE_CHANNEL_NAME: &str = "Direct Message";

/// The kind of conversation a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// A one-to-one conversation with the bot.
    Direct,
    /// A public channel.
    Public,
    /// Reserved for messages a higher layer flags as bot traffic.
    /// [`classify`] never returns it.
    Bot,
    /// Any channel id Courier does not recognise, including the empty id.
    Unknown,
}

impl MessageType {
    /// Returns the type as a lowercase string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Public => "public",
            Self::Bot => "bot",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a channel id by its first character.
///
/// Total over all inputs: the empty string is [`MessageType::Unknown`].
pub fn classify(channel_id: &str) -> MessageType {
    match channel_id.chars().next() {
        Some('D') => MessageType::Direct,
        Some('C') => MessageType::Public,
        _ => MessageType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_channel() {
        assert_eq!(classify("D000000"), MessageType::Direct);
        assert_eq!(classify("D"), MessageType::Direct);
    }

    #[test]
    fn test_public_channel() {
        assert_eq!(classify("C024BE91L"), MessageType::Public);
    }

    #[test]
    fn test_other_prefixes_are_unknown() {
        for id in ["G024BE91L", "U1", "d000000", "c1", " D1", "1", "é"] {
            assert_eq!(classify(id), MessageType::Unknown, "channel id {id:?}");
        }
    }

    #[test]
    fn test_empty_channel_is_unknown() {
        assert_eq!(classify(""), MessageType::Unknown);
    }
}
