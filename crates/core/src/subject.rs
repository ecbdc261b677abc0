//! Subject identity — the DID of the account being labeled.

use serde::{Deserialize, Serialize};

/// A decentralized identifier for a social-network account.
///
/// Opaque and globally unique. Subjects are only ever referenced, never
/// mutated. Human-readable handles are resolved to a `Did` at the dispatch
/// boundary before any label work happens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Did(String);

impl Did {
    pub fn new(did: impl Into<String>) -> Self {
        Self(did.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a raw subject string is already a DID (as opposed to a handle
    /// that still needs resolution).
    pub fn is_did(s: &str) -> bool {
        s.starts_with("did:")
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Did {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn did_detection() {
        assert!(Did::is_did("did:plc:abc123"));
        assert!(Did::is_did("did:web:example.com"));
        assert!(!Did::is_did("alice.bsky.social"));
    }

    #[test]
    fn serde_transparent() {
        let did = Did::new("did:plc:abc123");
        let json = serde_json::to_string(&did).unwrap();
        assert_eq!(json, "\"did:plc:abc123\"");
        let back: Did = serde_json::from_str(&json).unwrap();
        assert_eq!(back, did);
    }
}
