//! The handler registry.
//!
//! A [`HandlerRegistry`] has three independent slots:
//!
//! - one **broadcast** handler, for public-channel messages
//! - one **fallback** handler, for direct messages no command claimed
//! - any number of **command** handlers, keyed by the first word of a direct message
//!
//! Registration is last-write-wins per slot and per command token. The
//! registry is built once during setup and then moved into a
//! [`Dispatcher`](crate::Dispatcher); it is never shared mutably.
//!
//! ```rust,ignore
//! let registry = HandlerRegistry::new()
//!     .with_broadcast(log_channel)
//!     .with_direct(help)
//!     .with_command("deploy", deploy)?
//!     .with_command("status", status)?;
//! ```

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::command::is_valid_command_token;
use crate::error::{RegistryError, RegistryResult};
use crate::handler::{BoxedHandler, Handler, into_handler};

/// Handler bindings consulted by the dispatcher.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    broadcast: Option<BoxedHandler>,
    fallback: Option<BoxedHandler>,
    commands: HashMap<String, BoxedHandler>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the broadcast handler, invoked for public-channel messages.
    pub fn on_broadcast<H: Handler>(&mut self, handler: H) -> &mut Self {
        if self.broadcast.replace(into_handler(handler)).is_some() {
            debug!("Replaced broadcast handler");
        }
        self
    }

    /// Sets the fallback handler, invoked for direct messages that no
    /// command handler claimed.
    pub fn on_direct<H: Handler>(&mut self, handler: H) -> &mut Self {
        if self.fallback.replace(into_handler(handler)).is_some() {
            debug!("Replaced fallback handler");
        }
        self
    }

    /// Binds `token` to a command handler.
    ///
    /// The handler is invoked for direct messages whose first
    /// whitespace-delimited word equals `token` exactly (case-sensitive), with
    /// that word removed from the message text.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidCommandToken`] if `token` is empty or
    /// contains whitespace.
    pub fn on_command<H: Handler>(
        &mut self,
        token: impl Into<String>,
        handler: H,
    ) -> RegistryResult<&mut Self> {
        let token = token.into();
        if !is_valid_command_token(&token) {
            return Err(RegistryError::InvalidCommandToken { token });
        }

        debug!(token = %token, "Registered command handler");
        if self.commands.insert(token, into_handler(handler)).is_some() {
            debug!("Replaced existing command handler");
        }
        Ok(self)
    }

    /// Sets the broadcast handler (builder pattern).
    pub fn with_broadcast<H: Handler>(mut self, handler: H) -> Self {
        self.on_broadcast(handler);
        self
    }

    /// Sets the fallback handler (builder pattern).
    pub fn with_direct<H: Handler>(mut self, handler: H) -> Self {
        self.on_direct(handler);
        self
    }

    /// Binds a command handler (builder pattern).
    pub fn with_command<H: Handler>(
        mut self,
        token: impl Into<String>,
        handler: H,
    ) -> RegistryResult<Self> {
        self.on_command(token, handler)?;
        Ok(self)
    }

    /// Returns the broadcast handler, if any.
    pub fn broadcast(&self) -> Option<&BoxedHandler> {
        self.broadcast.as_ref()
    }

    /// Returns the fallback handler, if any.
    pub fn fallback(&self) -> Option<&BoxedHandler> {
        self.fallback.as_ref()
    }

    /// Returns the handler bound to `token`, if any.
    pub fn command(&self, token: &str) -> Option<&BoxedHandler> {
        self.commands.get(token)
    }

    /// Returns true if at least one command handler is registered.
    pub fn has_commands(&self) -> bool {
        !self.commands.is_empty()
    }

    /// Returns the registered command tokens, sorted.
    pub fn command_tokens(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        tokens.sort_unstable();
        tokens
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("broadcast", &self.broadcast.is_some())
            .field("fallback", &self.fallback.is_some())
            .field("commands", &self.command_tokens())
            .finish()
    }
}
