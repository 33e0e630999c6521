//! The connected session.
//!
//! A [`Session`] sits in front of the platform's identity directory and
//! remembers who the bot is connected as. The builder asks it for
//! `self_id()` to decide whether a message mentions the bot.

use async_trait::async_trait;
use courier_core::{BoxedResolver, Identity, IdentityResolver, LookupResult};
use parking_lot::RwLock;
use tracing::info;

/// Identity directory plus the bot's own identity.
pub struct Session {
    resolver: BoxedResolver,
    self_identity: RwLock<Option<Identity>>,
}

impl Session {
    pub fn new(resolver: BoxedResolver) -> Self {
        Self {
            resolver,
            self_identity: RwLock::new(None),
        }
    }

    /// Records the identity reported by the connection handshake.
    pub fn connected(&self, identity: Identity) {
        info!(identity = %identity, "Connected");
        *self.self_identity.write() = Some(identity);
    }

    /// Forgets the connected identity.
    pub fn disconnected(&self) {
        self.self_identity.write().take();
    }

    /// The identity the bot is connected as, if the handshake has completed.
    pub fn who_am_i(&self) -> Option<Identity> {
        self.self_identity.read().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.self_identity.read().is_some()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("self_identity", &*self.self_identity.read())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IdentityResolver for Session {
    async fn lookup_user(&self, id: &str) -> LookupResult<Identity> {
        self.resolver.lookup_user(id).await
    }

    async fn lookup_bot(&self, id: &str) -> LookupResult<Identity> {
        self.resolver.lookup_bot(id).await
    }

    async fn lookup_channel(&self, id: &str) -> LookupResult<Identity> {
        self.resolver.lookup_channel(id).await
    }

    /// The connected id, or whatever the directory reports before `Connected`.
    fn self_id(&self) -> String {
        match &*self.self_identity.read() {
            Some(identity) => identity.id.clone(),
            None => self.resolver.self_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::Directory;
    use std::sync::Arc;

    fn session() -> Session {
        Session::new(Arc::new(Directory::new().with_user("U1", "alice")))
    }

    #[test]
    fn test_self_id_empty_before_connected() {
        let session = session();
        assert_eq!(session.self_id(), "");
        assert!(session.who_am_i().is_none());
        assert!(!session.is_connected());
    }

    #[test]
    fn test_connected_sets_identity() {
        let session = session();
        session.connected(Identity::new("U0BOT", "courier"));

        assert_eq!(session.self_id(), "U0BOT");
        assert_eq!(session.who_am_i(), Some(Identity::new("U0BOT", "courier")));

        session.disconnected();
        assert_eq!(session.self_id(), "");
    }

    #[test]
    fn test_directory_self_id_used_until_connected() {
        let session = Session::new(Arc::new(Directory::new().with_self_id("U9")));
        assert_eq!(session.self_id(), "U9");

        session.connected(Identity::new("U0BOT", "courier"));
        assert_eq!(session.self_id(), "U0BOT");
    }

    #[tokio::test]
    async fn test_lookups_delegate() {
        let session = session();
        assert_eq!(session.lookup_user("U1").await.unwrap().name, "alice");
        assert!(session.lookup_user("U2").await.is_err());
        assert!(session.lookup_channel("C1").await.is_err());
    }
}
