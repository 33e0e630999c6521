//! Message construction.
//!
//! [`MessageBuilder`] turns a raw [`MessageEvent`] into a [`Message`]:
//!
//! 1. Resolve the sender (bot lookup for bot posts, user lookup otherwise)
//! 2. Resolve mentions in the text
//! 3. Decide whether the bot itself was mentioned
//! 4. Classify the channel and resolve its display name
//!
//! Every lookup is best effort. A failure degrades a display name and is
//! logged at debug level; building never fails.

use tracing::{debug, trace};

use crate::classify::{DIRECT_MESSAGE_CHANNEL_NAME, MessageType, classify};
use crate::event::MessageEvent;
use crate::identity::Identity;
use crate::mention::extract_mentions;
use crate::message::Message;
use crate::resolver::IdentityResolver;

/// Display name used when a human sender cannot be resolved.
pub const UNKNOWN_USER_NAME: &str = "?";

/// Builds [`Message`]s using an [`IdentityResolver`].
pub struct MessageBuilder<'a, R: ?Sized> {
    resolver: &'a R,
}

impl<'a, R: IdentityResolver + ?Sized> MessageBuilder<'a, R> {
    /// Creates a builder that resolves identities through `resolver`.
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    /// Builds a message from a raw event.
    pub async fn build(&self, event: &MessageEvent) -> Message {
        let is_bot_message = event.is_bot_subtype();
        let from = self.resolve_sender(event, is_bot_message).await;

        let resolver = self.resolver;
        let mentions = extract_mentions(&event.text, move |id| async move {
            resolver.lookup_user(&id).await
        })
        .await;

        let self_id = resolver.self_id();
        let mentioned = mentions.iter().any(|m| m.id == self_id);

        let message_type = classify(&event.channel);
        let channel = self.resolve_channel(&event.channel, message_type).await;

        trace!(
            channel = %channel,
            message_type = %message_type,
            mentions = mentions.len(),
            mentioned,
            "Built message"
        );

        Message {
            from,
            is_bot_message,
            text: event.text.clone(),
            channel,
            message_type,
            mentioned,
            mentions,
        }
    }

    async fn resolve_sender(&self, event: &MessageEvent, is_bot: bool) -> Identity {
        if is_bot {
            match self.resolver.lookup_bot(&event.bot_id).await {
                Ok(bot) => Identity::new(&event.bot_id, bot.name),
                Err(e) => {
                    debug!(bot_id = %event.bot_id, error = %e, "Bot lookup failed");
                    Identity::unnamed(&event.bot_id)
                }
            }
        } else {
            match self.resolver.lookup_user(&event.user).await {
                Ok(user) => Identity::new(&event.user, user.name),
                Err(e) => {
                    debug!(user_id = %event.user, error = %e, "User lookup failed");
                    Identity::new(&event.user, UNKNOWN_USER_NAME)
                }
            }
        }
    }

    async fn resolve_channel(&self, channel_id: &str, message_type: MessageType) -> Identity {
        match message_type {
            MessageType::Direct => Identity::new(channel_id, DIRECT_MESSAGE_CHANNEL_NAME),
            MessageType::Public | MessageType::Unknown | MessageType::Bot => {
                match self.resolver.lookup_channel(channel_id).await {
                    Ok(channel) => Identity::new(channel_id, channel.name),
                    Err(e) => {
                        debug!(channel_id = %channel_id, error = %e, "Channel lookup failed");
                        Identity::unnamed(channel_id)
                    }
                }
            }
        }
    }
}
