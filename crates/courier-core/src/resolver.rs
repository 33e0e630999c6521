//! The identity resolution seam.
//!
//! Courier never talks to the chat platform directly. Anything that can turn
//! an id into a display name implements [`IdentityResolver`]: a platform API
//! client, a cache in front of one, or the in-memory
//! [`Directory`](crate::Directory) used in tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LookupResult;
use crate::identity::Identity;

/// Resolves platform ids to identities.
///
/// Lookups are awaited inline while a message is built. Timeouts and retries
/// belong to the implementation; the builder treats any error as "name not
/// available" and carries on.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Looks up a human user by id.
    async fn lookup_user(&self, id: &str) -> LookupResult<Identity>;

    /// Looks up a bot integration by its bot id.
    async fn lookup_bot(&self, id: &str) -> LookupResult<Identity>;

    /// Looks up a conversation by channel id.
    async fn lookup_channel(&self, id: &str) -> LookupResult<Identity>;

    /// Returns the user id the bot itself is connected as.
    ///
    /// Empty when the connection has not identified itself yet.
    fn self_id(&self) -> String;
}

/// A shared, type-erased resolver.
pub type BoxedResolver = Arc<dyn IdentityResolver>;

#[async_trait]
impl<T: IdentityResolver + ?Sized> IdentityResolver for Arc<T> {
    async fn lookup_user(&self, id: &str) -> LookupResult<Identity> {
        (**self).lookup_user(id).await
    }

    async fn lookup_bot(&self, id: &str) -> LookupResult<Identity> {
        (**self).lookup_bot(id).await
    }

    async fn lookup_channel(&self, id: &str) -> LookupResult<Identity> {
        (**self).lookup_channel(id).await
    }

    fn self_id(&self) -> String {
        (**self).self_id()
    }
}
