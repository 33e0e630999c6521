//! # Courier
//!
//! A message-routing bot framework for chat platforms.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐  InboundEvent  ┌─────────┐  Message  ┌────────────┐
//! │ connection │───────────────▶│ runtime │──────────▶│ dispatcher │──▶ handler
//! └────────────┘   (mpsc)       └─────────┘           └────────────┘
//!                                    │ lookups
//!                                    ▼
//!                              IdentityResolver
//! ```
//!
//! - **Runtime**: drains inbound events, tracks the session, builds messages
//! - **Builder**: classifies the channel, resolves names and mentions
//! - **Dispatcher**: picks at most one handler (broadcast, command or fallback)
//! - **Handlers**: plain `async fn(Message)`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! async fn hello(msg: Message) {
//!     info!("{} says hi in {}", msg.from, msg.channel);
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = HandlerRegistry::new()
//!         .with_broadcast(hello)
//!         .with_command("ping", |_msg: Message| async {})?;
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(64);
//!     connect(tx);
//!
//!     CourierRuntime::builder()
//!         .resolver(directory)
//!         .registry(registry)
//!         .build()?
//!         .run(rx)
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use courier_core as core;
pub use courier_framework as framework;
pub use courier_runtime as runtime;

/// Commonly used types for building a bot.
pub mod prelude {
    // Runtime - main entry point
    pub use courier_runtime::{CourierConfig, CourierRuntime, RuntimeError, Session};

    // Message model
    pub use courier_core::{
        Directory, Identity, IdentityResolver, InboundEvent, Message, MessageEvent, MessageType,
    };

    // Handlers and routing
    pub use courier_framework::{Handler, HandlerRegistry, Route};

    // Logging macros
    pub use courier_runtime::prelude::*;
}
