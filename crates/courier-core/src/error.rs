//! Error types for the Courier core.
//!
//! Lookup errors never escape message construction: the builder turns them
//! into display-name defaults. They are still typed so resolvers can report
//! what went wrong and the builder can log it.

use thiserror::Error;

use crate::identity::IdentityKind;

// =============================================================================
// Lookup Errors
// =============================================================================

/// Errors returned by an [`IdentityResolver`](crate::IdentityResolver).
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// The platform does not know the requested id.
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// What kind of actor was looked up.
        kind: IdentityKind,
        /// The id that was looked up.
        id: String,
    },

    /// The identity service could not be reached or returned garbage.
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

impl LookupError {
    /// Creates a not-found error.
    pub fn not_found(kind: IdentityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

// =============================================================================
// Event Errors
// =============================================================================

/// Errors that can occur while decoding inbound events.
#[derive(Debug, Clone, Error)]
pub enum EventError {
    /// The wire payload is not a valid event.
    #[error("failed to parse event: {reason}")]
    Parse {
        /// Reason for failure.
        reason: String,
    },
}

impl EventError {
    /// Creates a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse { reason: msg.into() }
    }
}

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for identity lookups.
pub type LookupResult<T> = Result<T, LookupError>;

/// Result type for event decoding.
pub type EventResult<T> = Result<T, EventError>;
