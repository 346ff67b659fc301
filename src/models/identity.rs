//! Identity and id types
//!
//! Callers are opaque principals supplied by the hosting environment.
//! Record ids are allocated sequentially from 1 and never reused.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque caller principal, compared by exact equality
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The id handed to the first session ever created
    #[must_use]
    pub fn first() -> Self {
        Self(1)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(u64);

impl TokenId {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The id handed to the first token ever minted
    #[must_use]
    pub fn first() -> Self {
        Self(1)
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        assert_eq!(SessionId::first().value(), 1);
        assert_eq!(SessionId::first().next(), SessionId::new(2));
        assert_eq!(TokenId::first().next().next().value(), 3);
    }

    #[test]
    fn test_identity_serializes_as_plain_string() {
        let identity = Identity::from("ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG");
        let json = serde_json::to_string(&identity).unwrap();
        assert_eq!(json, "\"ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG\"");

        let id_json = serde_json::to_string(&SessionId::new(7)).unwrap();
        assert_eq!(id_json, "7");
    }

    #[test]
    fn test_identity_equality_is_exact() {
        assert_ne!(Identity::from("alice"), Identity::from("Alice"));
        assert_eq!(Identity::from("alice"), Identity::new(String::from("alice")));
    }
}
