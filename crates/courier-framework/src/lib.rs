//! # Courier Framework
//!
//! Handler registration and message dispatch for Courier bots.
//!
//! This layer provides:
//! - The [`Handler`] trait, implemented for any `async fn(Message)`
//! - The [`HandlerRegistry`] with broadcast, fallback and command slots
//! - The [`Dispatcher`], which picks at most one handler per message
//! - Command token splitting ([`split_first_token`])
//!
//! Message construction lives in `courier-core`; this crate only decides
//! what happens to a message once it is built.

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod registry;

pub use command::{is_valid_command_token, split_first_token};
pub use dispatcher::{Dispatcher, Route, route};
pub use error::{RegistryError, RegistryResult};
pub use handler::{BoxedHandler, HandleResponse, Handler, into_handler};
pub use registry::HandlerRegistry;

pub use futures::future::BoxFuture;
