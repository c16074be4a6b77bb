//! Ownership tokens.
//!
//! A fresh token is minted for every successful checkout and must be presented
//! verbatim to check in or discard that checkout.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The token value that asks check-in to register a brand-new resource.
pub const NEW_RESOURCE_TOKEN: &str = "new";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnershipToken(String);

impl OwnershipToken {
    /// Mint an unguessable token (random UUIDv4, simple hex form).
    pub fn mint() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OwnershipToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for OwnershipToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
