//! # Courier Core
//!
//! The message model of the Courier bot framework.
//!
//! This crate turns raw platform events into normalized [`Message`] values:
//!
//! - **Events**: the closed set of inbound events ([`InboundEvent`], [`MessageEvent`])
//! - **Identities**: platform actors by id and display name ([`Identity`])
//! - **Resolution**: the seam to the platform's identity service ([`IdentityResolver`])
//! - **Classification**: conversation kind from the channel id ([`classify`])
//! - **Mentions**: `<@U…>` extraction and resolution ([`extract_mentions`])
//! - **Building**: all of the above composed into a [`Message`] ([`MessageBuilder`])
//!
//! Routing a built message to a handler lives in `courier-framework`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use courier_core::{Directory, MessageBuilder, MessageEvent, MessageType};
//!
//! let directory = Directory::new()
//!     .with_self_id("U0BOT")
//!     .with_user("U1", "alice");
//!
//! let event = MessageEvent::new("D1", "U1", "hello <@U0BOT>");
//! let message = MessageBuilder::new(&directory).build(&event).await;
//!
//! assert_eq!(message.message_type, MessageType::Direct);
//! assert_eq!(message.channel.name, "Direct Message");
//! ```

pub mod builder;
pub mod classify;
pub mod directory;
pub mod error;
pub mod event;
pub mod identity;
pub mod mention;
pub mod message;
pub mod resolver;

pub use builder::{MessageBuilder, UNKNOWN_USER_NAME};
pub use classify::{DIRECT_MESSAGE_CHANNEL_NAME, MessageType, classify};
pub use directory::Directory;
pub use error::{EventError, EventResult, LookupError, LookupResult};
pub use event::{BOT_MESSAGE_SUBTYPE, InboundEvent, MessageEvent, PlatformError};
pub use identity::{Identity, IdentityKind};
pub use mention::{extract_mentions, mention_ids};
pub use message::Message;
pub use resolver::{BoxedResolver, IdentityResolver};

/// Prelude for common imports.
pub mod prelude {
    pub use super::{
        Identity, IdentityResolver, InboundEvent, Message, MessageBuilder, MessageEvent,
        MessageType,
    };
}
