//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different ID types (e.g., passing a
//! ticket id where an entity id is expected) and make the code more
//! self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A GLPI ticket id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub u64);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TicketId {
    fn from(n: u64) -> Self {
        TicketId(n)
    }
}

/// A GLPI entity id: the organizational unit a ticket is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        EntityId(n)
    }
}

/// A GLPI user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A site name as it appears on disk: a directory under the log root and
/// under the staging area.
///
/// Site names are matched against the standardization table case-insensitively,
/// so the original casing is kept here and lowered only at lookup time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteName(pub String);

impl SiteName {
    pub fn new(s: impl Into<String>) -> Self {
        SiteName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the key used for standardization table lookups.
    pub fn lookup_key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for SiteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SiteName {
    fn from(s: String) -> Self {
        SiteName(s)
    }
}

impl From<&str> for SiteName {
    fn from(s: &str) -> Self {
        SiteName(s.to_string())
    }
}
