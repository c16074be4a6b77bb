//! Preconditions and mutations over named record attributes.
//!
//! A conditional write is described by two small value types instead of a
//! store-specific expression language:
//!
//! - [`Precondition`]: every [`Condition`] must hold on the currently stored item
//! - [`Mutation`]: an ordered list of [`Update`]s applied to the item
//!
//! Every store adapter evaluates these through [`Precondition::holds`] and
//! [`Mutation::apply`], so the in-memory and file-backed stores agree exactly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed set of attributes a resource record can carry.
///
/// The resource name is the store key and is not an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    State,
    CheckinHolder,
    CheckinContact,
    CheckinDate,
    CheckinComment,
    CheckinArtifact,
    CheckoutHolder,
    CheckoutContact,
    CheckoutDate,
    CheckoutVersion,
    CheckoutComment,
    CheckoutToken,
    CheckoutOrigin,
}

impl Attribute {
    /// Attributes that together make up the checkout info of a record.
    pub const CHECKOUT: [Attribute; 7] = [
        Attribute::CheckoutHolder,
        Attribute::CheckoutContact,
        Attribute::CheckoutDate,
        Attribute::CheckoutVersion,
        Attribute::CheckoutComment,
        Attribute::CheckoutToken,
        Attribute::CheckoutOrigin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::State => "state",
            Attribute::CheckinHolder => "checkin_holder",
            Attribute::CheckinContact => "checkin_contact",
            Attribute::CheckinDate => "checkin_date",
            Attribute::CheckinComment => "checkin_comment",
            Attribute::CheckinArtifact => "checkin_artifact",
            Attribute::CheckoutHolder => "checkout_holder",
            Attribute::CheckoutContact => "checkout_contact",
            Attribute::CheckoutDate => "checkout_date",
            Attribute::CheckoutVersion => "checkout_version",
            Attribute::CheckoutComment => "checkout_comment",
            Attribute::CheckoutToken => "checkout_token",
            Attribute::CheckoutOrigin => "checkout_origin",
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored record as the store sees it: attribute name to string value.
pub type Item = BTreeMap<Attribute, String>;

/// A single requirement on the stored item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The attribute is present and equal to the value.
    Equals(Attribute, String),
    /// The attribute is not present (an absent item has no attributes).
    Absent(Attribute),
    /// The attribute is present with any value.
    Present(Attribute),
}

impl Condition {
    fn holds(&self, item: Option<&Item>) -> bool {
        let value = |attr: &Attribute| item.and_then(|i| i.get(attr));
        match self {
            Condition::Equals(attr, expected) => value(attr) == Some(expected),
            Condition::Absent(attr) => value(attr).is_none(),
            Condition::Present(attr) => value(attr).is_some(),
        }
    }
}

/// Conjunction of conditions. An empty precondition always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Precondition {
    conditions: Vec<Condition>,
}

impl Precondition {
    /// A precondition that always holds.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn equals(mut self, attr: Attribute, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::Equals(attr, value.into()));
        self
    }

    pub fn absent(mut self, attr: Attribute) -> Self {
        self.conditions.push(Condition::Absent(attr));
        self
    }

    pub fn present(mut self, attr: Attribute) -> Self {
        self.conditions.push(Condition::Present(attr));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_unconditional(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate against the currently stored item (`None` when the key is absent).
    pub fn holds(&self, item: Option<&Item>) -> bool {
        self.conditions.iter().all(|c| c.holds(item))
    }
}

/// A single change to the stored item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    Set(Attribute, String),
    Remove(Attribute),
    /// Copy `from` into `to`; an absent `from` removes `to`.
    Copy { from: Attribute, to: Attribute },
}

/// Ordered list of updates applied as one all-or-nothing write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mutation {
    updates: Vec<Update>,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, attr: Attribute, value: impl Into<String>) -> Self {
        self.updates.push(Update::Set(attr, value.into()));
        self
    }

    /// Set the attribute when a value is given, otherwise leave it untouched.
    pub fn set_opt(self, attr: Attribute, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.set(attr, v),
            None => self,
        }
    }

    pub fn remove(mut self, attr: Attribute) -> Self {
        self.updates.push(Update::Remove(attr));
        self
    }

    /// Remove every checkout attribute, whichever of them the stored item has.
    pub fn clear_checkout(self) -> Self {
        Attribute::CHECKOUT
            .iter()
            .fold(self, |m, attr| m.remove(*attr))
    }

    pub fn copy(mut self, from: Attribute, to: Attribute) -> Self {
        self.updates.push(Update::Copy { from, to });
        self
    }

    pub fn updates(&self) -> &[Update] {
        &self.updates
    }

    /// Apply the updates in order.
    ///
    /// Copies read the item as it was before this mutation started, so
    /// `Copy { from: CheckoutComment, .. }` still sees the comment even when the
    /// same mutation removes it.
    pub fn apply(&self, item: &mut Item) {
        let before = item.clone();
        for update in &self.updates {
            match update {
                Update::Set(attr, value) => {
                    item.insert(*attr, value.clone());
                }
                Update::Remove(attr) => {
                    item.remove(attr);
                }
                Update::Copy { from, to } => match before.get(from) {
                    Some(value) => {
                        item.insert(*to, value.clone());
                    }
                    None => {
                        item.remove(to);
                    }
                },
            }
        }
    }
}
