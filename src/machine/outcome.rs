//! Structured results of a checkout-protocol request.

use crate::record::{CheckinInfo, ResourceRecord};
use crate::token::OwnershipToken;

/// Identity of whoever holds (or last touched) a resource, taken from a read
/// of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolderSnapshot {
    pub holder: String,
    pub contact: Option<String>,
    pub date: Option<String>,
    /// Artifact label of the last check-in.
    pub artifact: Option<String>,
}

impl HolderSnapshot {
    /// Snapshot of the current checkout, if the record is held.
    pub fn of_checkout(record: &ResourceRecord) -> Option<Self> {
        record.checkout.as_ref().map(|c| Self {
            holder: c.holder.clone(),
            contact: c.contact.clone(),
            date: c.date.clone(),
            artifact: record.artifact().map(str::to_string),
        })
    }
}

/// Business-rule reasons for denying a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The resource was never registered.
    NotFound,
    /// A `new` check-in targeted a resource that already exists.
    AlreadyExists,
    /// Checkout (or status) found the resource held.
    AlreadyHeld(HolderSnapshot),
    /// Token or holder name did not match the current checkout.
    OwnershipMismatch(Option<HolderSnapshot>),
    /// Check-in of a resource that is not checked out.
    AlreadyInState,
    /// The write lost a race and the fresh read did not pin down a cause.
    Conflict(Option<HolderSnapshot>),
}

impl Rejection {
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::NotFound => "not_found",
            Rejection::AlreadyExists => "already_exists",
            Rejection::AlreadyHeld(_) => "already_held",
            Rejection::OwnershipMismatch(_) => "ownership_mismatch",
            Rejection::AlreadyInState => "already_in_state",
            Rejection::Conflict(_) => "conflict",
        }
    }
}

/// A denial, remembering whether it was decided after losing a write race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub rejection: Rejection,
    pub raced: bool,
}

/// What happened to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Status or checkout of an unregistered resource: "create it first".
    Unregistered,
    /// Status of a checked-in resource.
    Available(Option<CheckinInfo>),
    CheckedOut {
        holder: String,
        token: OwnershipToken,
        artifact: Option<String>,
    },
    Created,
    CheckedIn {
        holder: String,
    },
    /// `noop` is set when a concurrent actor had already released the checkout.
    Discarded {
        noop: bool,
    },
    Revoked,
    Denied(Denial),
}

impl Outcome {
    pub fn denied(rejection: Rejection) -> Self {
        Outcome::Denied(Denial {
            rejection,
            raced: false,
        })
    }

    pub fn denied_after_race(rejection: Rejection) -> Self {
        Outcome::Denied(Denial {
            rejection,
            raced: true,
        })
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Outcome::Denied(_))
    }
}
