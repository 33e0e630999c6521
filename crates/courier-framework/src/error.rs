//! Error types for the Courier framework.

use thiserror::Error;

/// Errors that can occur while registering handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Command tokens are matched against the first whitespace-delimited word
    /// of a message, so a token that is empty or contains whitespace could
    /// never match.
    #[error("invalid command token '{token}': must be non-empty and contain no whitespace")]
    InvalidCommandToken {
        /// The rejected token.
        token: String,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
