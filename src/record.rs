//! Typed view of a stored resource record.
//!
//! The store keeps records as attribute maps ([`Item`]). The state machine works
//! on [`ResourceRecord`], which is parsed fresh from the store on every request
//! and never cached.

use crate::error::{CheckoutError, Result};
use crate::store::{Attribute, Item};
use serde::{Deserialize, Serialize};

/// Checkout state of a registered resource.
///
/// An absent record is the third logical state, "unregistered".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcmState {
    CheckedIn,
    CheckedOut,
}

impl AcmState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcmState::CheckedIn => "CHECKED_IN",
            AcmState::CheckedOut => "CHECKED_OUT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CHECKED_IN" => Some(Self::CheckedIn),
            "CHECKED_OUT" => Some(Self::CheckedOut),
            _ => None,
        }
    }
}

impl std::fmt::Display for AcmState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who last returned the resource, and under which artifact label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinInfo {
    pub holder: String,
    pub contact: Option<String>,
    pub date: Option<String>,
    pub comment: Option<String>,
    pub artifact: Option<String>,
}

/// The current checkout. Present iff the record is `CHECKED_OUT`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutInfo {
    pub holder: String,
    pub contact: Option<String>,
    pub date: Option<String>,
    pub version: Option<String>,
    pub comment: Option<String>,
    pub token: String,
    pub origin: Option<String>,
}

/// One resource record, keyed by its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub name: String,
    pub state: AcmState,
    pub checkin: Option<CheckinInfo>,
    pub checkout: Option<CheckoutInfo>,
}

impl ResourceRecord {
    /// Parse a stored item.
    ///
    /// Checkout info is keyed off the holder attribute: it is the single
    /// attribute the checkout guard tests for.
    pub fn from_item(name: &str, item: &Item) -> Result<Self> {
        let get = |attr: Attribute| item.get(&attr).cloned();

        let state_raw = get(Attribute::State).ok_or_else(|| {
            CheckoutError::Store(format!("record '{}' has no state attribute", name))
        })?;
        let state = AcmState::parse(&state_raw).ok_or_else(|| {
            CheckoutError::Store(format!(
                "record '{}' has invalid state '{}'",
                name, state_raw
            ))
        })?;

        let checkin = get(Attribute::CheckinHolder).map(|holder| CheckinInfo {
            holder,
            contact: get(Attribute::CheckinContact),
            date: get(Attribute::CheckinDate),
            comment: get(Attribute::CheckinComment),
            artifact: get(Attribute::CheckinArtifact),
        });

        let checkout = get(Attribute::CheckoutHolder).map(|holder| CheckoutInfo {
            holder,
            contact: get(Attribute::CheckoutContact),
            date: get(Attribute::CheckoutDate),
            version: get(Attribute::CheckoutVersion),
            comment: get(Attribute::CheckoutComment),
            token: get(Attribute::CheckoutToken).unwrap_or_default(),
            origin: get(Attribute::CheckoutOrigin),
        });

        Ok(Self {
            name: name.to_string(),
            state,
            checkin,
            checkout,
        })
    }

    /// Artifact label of the last check-in, if any.
    pub fn artifact(&self) -> Option<&str> {
        self.checkin.as_ref().and_then(|c| c.artifact.as_deref())
    }

    pub fn is_held(&self) -> bool {
        self.checkout.is_some()
    }
}
