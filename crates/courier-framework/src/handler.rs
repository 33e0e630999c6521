//! Message handlers.
//!
//! Any async function taking a [`Message`] is a [`Handler`]:
//!
//! ```rust,ignore
//! // No return value
//! async fn greet(msg: Message) {
//!     println!("{} said {}", msg.from, msg.text);
//! }
//!
//! // Errors are logged, never propagated into dispatch
//! async fn deploy(msg: Message) -> anyhow::Result<()> {
//!     start_deploy(&msg.text).await?;
//!     Ok(())
//! }
//! ```
//!
//! The registry stores handlers type-erased as [`BoxedHandler`].

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::error;

use courier_core::Message;

// ============================================================================
// HandleResponse - Handle handler return values
// ============================================================================

/// A trait for types a handler may return.
pub trait HandleResponse: Send {
    /// Consumes the return value once the handler has finished.
    fn handle_response(self);
}

/// Implementation for `()` - nothing to do.
impl HandleResponse for () {
    fn handle_response(self) {}
}

/// Implementation for `Result<T, E>` - logs the error on `Err`.
impl<T: HandleResponse, E: std::fmt::Display + Send> HandleResponse for Result<T, E> {
    fn handle_response(self) {
        match self {
            Ok(t) => t.handle_response(),
            Err(e) => error!("Handler error: {e}"),
        }
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// The trait implemented by message handlers.
///
/// Automatically implemented for async functions and closures that take a
/// [`Message`] and return a type implementing [`HandleResponse`].
#[async_trait]
pub trait Handler: Clone + Send + Sync + 'static {
    /// Calls the handler with the given message.
    async fn call(self, message: Message);
}

#[async_trait]
impl<F, Fut, Res> Handler for F
where
    F: FnOnce(Message) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: HandleResponse + 'static,
{
    async fn call(self, message: Message) {
        (self)(message).await.handle_response();
    }
}

// ============================================================================
// BoxedHandler - Type-erased handler stored in the registry
// ============================================================================

/// A type-erased handler.
///
/// Internally a closure that captures the wrapped handler and calls a clone
/// of it on each invocation.
pub type BoxedHandler = Arc<dyn Fn(Message) -> BoxFuture<'static, ()> + Send + Sync>;

/// Converts a handler into a boxed handler.
pub fn into_handler<H: Handler>(handler: H) -> BoxedHandler {
    Arc::new(move |message| handler.clone().call(message))
}
