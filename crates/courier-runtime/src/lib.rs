//! # Courier Runtime
//!
//! The outer layer of a Courier bot:
//!
//! - Layered configuration with figment ([`config`])
//! - `tracing` subscriber setup ([`logging`])
//! - The connected [`Session`], which knows the bot's own identity
//! - The event loop ([`CourierRuntime`]) that turns inbound events into
//!   dispatched messages
//!
//! The runtime does not open connections itself. A connection collaborator
//! decodes platform events (see [`InboundEvent::from_json`]) and sends them
//! down a `tokio::sync::mpsc` channel that [`CourierRuntime::run`] drains.
//!
//! ```rust,ignore
//! use courier_runtime::CourierRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
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
//! [`InboundEvent::from_json`]: courier_core::InboundEvent::from_json

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod session;

pub use config::{BotConfig, ConfigError, ConfigLoader, ConfigResult, CourierConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{CourierRuntime, RuntimeBuilder, RuntimeStats};
pub use session::Session;

// Re-export tracing for use by bot code
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for bot code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
