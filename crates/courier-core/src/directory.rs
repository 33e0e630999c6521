//! In-memory identity directory.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{LookupError, LookupResult};
use crate::identity::{Identity, IdentityKind};
use crate::resolver::IdentityResolver;

/// An [`IdentityResolver`] backed by fixed id-to-name tables.
///
/// # Example
///
/// ```rust
/// use courier_core::Directory;
///
/// let directory = Directory::new()
///     .with_self_id("U0BOT")
///     .with_user("U1", "alice")
///     .with_channel("C1", "general");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Directory {
    users: HashMap<String, String>,
    bots: HashMap<String, String>,
    channels: HashMap<String, String>,
    self_id: String,
}

impl Directory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user entry.
    pub fn with_user(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.users.insert(id.into(), name.into());
        self
    }

    /// Adds a bot entry.
    pub fn with_bot(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.bots.insert(id.into(), name.into());
        self
    }

    /// Adds a channel entry.
    pub fn with_channel(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.channels.insert(id.into(), name.into());
        self
    }

    /// Sets the id reported by [`IdentityResolver::self_id`].
    pub fn with_self_id(mut self, id: impl Into<String>) -> Self {
        self.self_id = id.into();
        self
    }

    fn lookup(
        table: &HashMap<String, String>,
        kind: IdentityKind,
        id: &str,
    ) -> LookupResult<Identity> {
        table
            .get(id)
            .map(|name| Identity::new(id, name.clone()))
            .ok_or_else(|| LookupError::not_found(kind, id))
    }
}

#[async_trait]
impl IdentityResolver for Directory {
    async fn lookup_user(&self, id: &str) -> LookupResult<Identity> {
        Self::lookup(&self.users, IdentityKind::User, id)
    }

    async fn lookup_bot(&self, id: &str) -> LookupResult<Identity> {
        Self::lookup(&self.bots, IdentityKind::Bot, id)
    }

    async fn lookup_channel(&self, id: &str) -> LookupResult<Identity> {
        Self::lookup(&self.channels, IdentityKind::Channel, id)
    }

    fn self_id(&self) -> String {
        self.self_id.clone()
    }
}
