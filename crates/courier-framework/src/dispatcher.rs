//! Message dispatcher for the Courier framework.
//!
//! The [`Dispatcher`] owns a [`HandlerRegistry`] and invokes at most one
//! handler per message. Rules are evaluated in strict order:
//!
//! 1. **Suppression**: bot messages are dropped when suppression is on
//! 2. **Broadcast**: public messages go to the broadcast handler
//! 3. **Command**: direct messages whose first word is a registered token go
//!    to that command handler, with the token stripped from the text
//! 4. **Fallback**: remaining direct messages go to the fallback handler
//! 5. Anything else is dropped
//!
//! ```rust,ignore
//! use courier_framework::{Dispatcher, HandlerRegistry};
//!
//! let registry = HandlerRegistry::new()
//!     .with_broadcast(on_channel_message)
//!     .with_direct(on_direct_message)
//!     .with_command("echo", echo)?;
//!
//! let dispatcher = Dispatcher::new(registry).suppress_bot_messages(true);
//! let route = dispatcher.dispatch(message).await;
//! ```

use std::fmt;

use tracing::{Instrument, Level, debug, span};

use courier_core::Message;

use crate::command::split_first_token;
use crate::handler::BoxedHandler;
use crate::registry::HandlerRegistry;

/// The routing decision for a single message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// A bot message dropped by the suppression policy.
    Suppressed,
    /// Sent to the broadcast handler.
    Broadcast,
    /// Sent to the command handler bound to this token.
    Command(String),
    /// Sent to the fallback handler.
    Fallback,
    /// No handler matched; the message was dropped.
    Unrouted,
}

impl Route {
    /// Returns true if a handler was invoked.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Broadcast | Self::Command(_) | Self::Fallback)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suppressed => f.write_str("suppressed"),
            Self::Broadcast => f.write_str("broadcast"),
            Self::Command(token) => write!(f, "command:{token}"),
            Self::Fallback => f.write_str("fallback"),
            Self::Unrouted => f.write_str("unrouted"),
        }
    }
}

/// Decides where `message` should go without invoking anything.
pub fn route(
    message: &Message,
    registry: &HandlerRegistry,
    suppress_bot_messages: bool,
) -> Route {
    if message.is_bot_message && suppress_bot_messages {
        return Route::Suppressed;
    }

    if registry.broadcast().is_some() && message.is_public() {
        return Route::Broadcast;
    }

    if registry.has_commands() && message.is_direct() {
        let (token, _) = split_first_token(&message.text);
        if registry.command(token).is_some() {
            return Route::Command(token.to_string());
        }
    }

    if registry.fallback().is_some() && message.is_direct() {
        return Route::Fallback;
    }

    Route::Unrouted
}

/// Routes built messages to the handlers of a [`HandlerRegistry`].
#[derive(Clone, Default)]
pub struct Dispatcher {
    /// The handler bindings.
    registry: HandlerRegistry,
    /// Whether bot messages are dropped before routing.
    suppress_bot_messages: bool,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry`. Bot messages are not suppressed.
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry,
            suppress_bot_messages: false,
        }
    }

    /// Sets whether bot messages are dropped before routing.
    pub fn suppress_bot_messages(mut self, suppress: bool) -> Self {
        self.suppress_bot_messages = suppress;
        self
    }

    /// Returns true if bot messages are suppressed.
    pub fn suppresses_bot_messages(&self) -> bool {
        self.suppress_bot_messages
    }

    /// Returns the handler registry.
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Decides where `message` should go without invoking anything.
    pub fn route(&self, message: &Message) -> Route {
        route(message, &self.registry, self.suppress_bot_messages)
    }

    /// Dispatches a message to at most one handler.
    ///
    /// Command handlers receive the message with the command token and the
    /// whitespace after it removed from `text`. Every other handler receives
    /// the message unchanged.
    ///
    /// # Returns
    ///
    /// The [`Route`] taken.
    pub async fn dispatch(&self, mut message: Message) -> Route {
        let route = self.route(&message);

        let handler: Option<&BoxedHandler> = match &route {
            Route::Broadcast => self.registry.broadcast(),
            Route::Command(token) => {
                let rest = split_first_token(&message.text).1.to_string();
                message.text = rest;
                self.registry.command(token)
            }
            Route::Fallback => self.registry.fallback(),
            Route::Suppressed | Route::Unrouted => None,
        };

        let Some(handler) = handler else {
            debug!(
                route = %route,
                channel = %message.channel.id,
                message_type = %message.message_type,
                "Message not dispatched"
            );
            return route;
        };

        let span = span!(
            Level::DEBUG,
            "dispatch",
            route = %route,
            channel = %message.channel.id,
            from = %message.from.id
        );
        handler(message).instrument(span).await;

        route
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("suppress_bot_messages", &self.suppress_bot_messages)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{Identity, MessageType};
    use std::sync::Arc;
    use std::sync::Mutex;

    type Calls = Arc<Mutex<Vec<(&'static str, String)>>>;

    fn message(message_type: MessageType, text: &str) -> Message {
        let channel = match message_type {
            MessageType::Direct => Identity::new("D1", "Direct Message"),
            _ => Identity::new("C1", "general"),
        };
        Message {
            from: Identity::new("U2", "bob"),
            is_bot_message: false,
            text: text.to_string(),
            channel,
            message_type,
            mentioned: false,
            mentions: Vec::new(),
        }
    }

    fn bot_message(message_type: MessageType, text: &str) -> Message {
        Message {
            is_bot_message: true,
            ..message(message_type, text)
        }
    }

    fn recorder(
        calls: &Calls,
        name: &'static str,
    ) -> impl Fn(Message) -> std::future::Ready<()> + Clone + Send + Sync + 'static {
        let calls = Arc::clone(calls);
        move |msg: Message| {
            calls.lock().unwrap().push((name, msg.text));
            std::future::ready(())
        }
    }

    fn full_registry(calls: &Calls) -> HandlerRegistry {
        HandlerRegistry::new()
            .with_broadcast(recorder(calls, "broadcast"))
            .with_direct(recorder(calls, "fallback"))
            .with_command("foo", recorder(calls, "foo"))
            .unwrap()
    }

    fn recorded(calls: &Calls) -> Vec<(&'static str, String)> {
        calls.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_no_handlers_drops_message() {
        let dispatcher = Dispatcher::new(HandlerRegistry::new());
        let route = dispatcher.dispatch(message(MessageType::Public, "hi")).await;
        assert_eq!(route, Route::Unrouted);
        assert!(!route.is_handled());
    }

    #[tokio::test]
    async fn test_public_goes_to_broadcast_only() {
        let calls = Calls::default();
        let dispatcher = Dispatcher::new(full_registry(&calls));

        let route = dispatcher
            .dispatch(message(MessageType::Public, "foo bar"))
            .await;

        assert_eq!(route, Route::Broadcast);
        assert_eq!(recorded(&calls), vec![("broadcast", "foo bar".to_string())]);
    }

    #[tokio::test]
    async fn test_direct_command_beats_fallback() {
        let calls = Calls::default();
        let dispatcher = Dispatcher::new(full_registry(&calls));

        let route = dispatcher
            .dispatch(message(MessageType::Direct, "foo bar baz"))
            .await;

        assert_eq!(route, Route::Command("foo".to_string()));
        assert_eq!(recorded(&calls), vec![("foo", "bar baz".to_string())]);
    }

    #[tokio::test]
    async fn test_bare_command_gets_empty_text() {
        let calls = Calls::default();
        let dispatcher = Dispatcher::new(full_registry(&calls));

        dispatcher.dispatch(message(MessageType::Direct, "foo")).await;

        assert_eq!(recorded(&calls), vec![("foo", String::new())]);
    }

    #[tokio::test]
    async fn test_command_match_is_verbatim() {
        let calls = Calls::default();
        let dispatcher = Dispatcher::new(full_registry(&calls));

        for text in ["Foo bar", "foobar", " foo bar"] {
            let route = dispatcher.dispatch(message(MessageType::Direct, text)).await;
            assert_eq!(route, Route::Fallback, "text {text:?}");
        }
        assert_eq!(recorded(&calls).len(), 3);
        assert!(recorded(&calls).iter().all(|(name, _)| *name == "fallback"));
        assert_eq!(recorded(&calls)[2].1, " foo bar");
    }

    #[tokio::test]
    async fn test_commands_ignored_outside_direct() {
        let calls = Calls::default();
        let registry = HandlerRegistry::new()
            .with_command("foo", recorder(&calls, "foo"))
            .unwrap();
        let dispatcher = Dispatcher::new(registry);

        let route = dispatcher
            .dispatch(message(MessageType::Public, "foo bar"))
            .await;
        assert_eq!(route, Route::Unrouted);

        let route = dispatcher
            .dispatch(message(MessageType::Unknown, "foo bar"))
            .await;
        assert_eq!(route, Route::Unrouted);
        assert!(recorded(&calls).is_empty());
    }

    #[tokio::test]
    async fn test_fallback_without_commands() {
        let calls = Calls::default();
        let registry = HandlerRegistry::new().with_direct(recorder(&calls, "fallback"));
        let dispatcher = Dispatcher::new(registry);

        let route = dispatcher
            .dispatch(message(MessageType::Direct, "foo bar"))
            .await;

        assert_eq!(route, Route::Fallback);
        assert_eq!(recorded(&calls), vec![("fallback", "foo bar".to_string())]);
    }

    #[tokio::test]
    async fn test_unknown_public_without_broadcast_is_dropped() {
        let calls = Calls::default();
        let registry = HandlerRegistry::new().with_direct(recorder(&calls, "fallback"));
        let dispatcher = Dispatcher::new(registry);

        for message_type in [MessageType::Public, MessageType::Unknown, MessageType::Bot] {
            let route = dispatcher.dispatch(message(message_type, "hi")).await;
            assert_eq!(route, Route::Unrouted);
        }
        assert!(recorded(&calls).is_empty());
    }

    #[tokio::test]
    async fn test_suppression_blocks_everything() {
        let calls = Calls::default();
        let dispatcher = Dispatcher::new(full_registry(&calls)).suppress_bot_messages(true);

        for message_type in [MessageType::Public, MessageType::Direct, MessageType::Unknown] {
            let route = dispatcher
                .dispatch(bot_message(message_type, "foo bar"))
                .await;
            assert_eq!(route, Route::Suppressed);
        }
        assert!(recorded(&calls).is_empty());
    }

    #[tokio::test]
    async fn test_bot_messages_routed_when_not_suppressed() {
        let calls = Calls::default();
        let dispatcher = Dispatcher::new(full_registry(&calls)).suppress_bot_messages(false);

        let route = dispatcher
            .dispatch(bot_message(MessageType::Public, "deployed"))
            .await;

        assert_eq!(route, Route::Broadcast);
        assert_eq!(recorded(&calls).len(), 1);
    }

    #[tokio::test]
    async fn test_suppression_ignores_human_messages() {
        let calls = Calls::default();
        let dispatcher = Dispatcher::new(full_registry(&calls)).suppress_bot_messages(true);

        let route = dispatcher.dispatch(message(MessageType::Direct, "hi")).await;
        assert_eq!(route, Route::Fallback);
    }

    #[test]
    fn test_route_is_pure() {
        let calls = Calls::default();
        let registry = full_registry(&calls);
        let msg = message(MessageType::Direct, "foo bar");

        assert_eq!(route(&msg, &registry, false), Route::Command("foo".into()));
        assert_eq!(msg.text, "foo bar");
        assert!(recorded(&calls).is_empty());
    }

    #[test]
    fn test_route_display() {
        assert_eq!(Route::Command("foo".into()).to_string(), "command:foo");
        assert_eq!(Route::Unrouted.to_string(), "unrouted");
    }
}
