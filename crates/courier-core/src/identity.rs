//! Platform actor identities.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A platform actor (user, bot or channel) identified by a stable id.
///
/// Two identities are equal when their ids are equal; the display name is
/// informational and may differ between lookups of the same actor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Identity {
    /// Stable platform identifier (e.g. `U024BE7LH`, `C024BE91L`).
    pub id: String,
    /// Display name, empty when it could not be resolved.
    #[serde(default)]
    pub name: String,
}

impl Identity {
    /// Creates a new identity.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Creates an identity whose display name is not known.
    pub fn unnamed(id: impl Into<String>) -> Self {
        Self::new(id, String::new())
    }

    /// Returns true if the display name is empty.
    pub fn is_unnamed(&self) -> bool {
        self.name.is_empty()
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}

/// The kind of actor an identity lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    /// A human user.
    User,
    /// A bot integration.
    Bot,
    /// A conversation.
    Channel,
}

impl IdentityKind {
    /// Returns the kind as a lowercase string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
            Self::Channel => "channel",
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_ignores_name() {
        assert_eq!(Identity::new("U1", "Alice"), Identity::new("U1", "alice"));
        assert_ne!(Identity::new("U1", "Alice"), Identity::new("U2", "Alice"));
    }

    #[test]
    fn test_hash_follows_id() {
        let mut set = HashSet::new();
        set.insert(Identity::new("U1", "Alice"));
        set.insert(Identity::new("U1", ""));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(Identity::new("U1", "Alice").to_string(), "Alice (U1)");
        assert_eq!(Identity::unnamed("U1").to_string(), "U1");
    }
}
