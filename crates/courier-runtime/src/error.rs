//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that stop the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The platform rejected the bot token.
    #[error("Invalid authentication token")]
    InvalidAuth,
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
