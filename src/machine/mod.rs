//! The per-resource checkout state machine.
//!
//! Pure decision logic: given a parsed request and the record as just read
//! from the store, decide either a final [`Outcome`] or the conditional write
//! to attempt. Nothing here touches the store.
//!
//! | Request | From | Precondition | Mutation |
//! |---|---|---|---|
//! | create (`key=new`) | unregistered | no check-in holder | state=CHECKED_IN, check-in info |
//! | checkOut | CHECKED_IN | no checkout holder | state=CHECKED_OUT, fresh token, checkout info |
//! | checkIn | CHECKED_OUT | token and holder match | clear checkout, state=CHECKED_IN, check-in info |
//! | discard | any registered | token and holder match | clear checkout, state=CHECKED_IN |
//! | revokeCheckOut | any (unregistered: no write) | none | clear checkout, state=CHECKED_IN |
//!
//! When a write's precondition fails, [`classify_conflict`] turns a fresh read
//! into the outcome the caller sees.

mod outcome;

#[cfg(test)]
mod tests;

pub use outcome::{Denial, HolderSnapshot, Outcome, Rejection};

use crate::record::{AcmState, ResourceRecord};
use crate::request::{
    CheckInRequest, CheckOutRequest, CreateRequest, DiscardRequest, Request,
};
use crate::store::{Attribute, Mutation, Precondition};
use crate::token::OwnershipToken;

/// Per-request inputs that are not part of the request itself.
#[derive(Debug, Clone)]
pub struct DecisionContext {
    /// Timestamp recorded on check-in/checkout info.
    pub now: String,
    /// Token that a successful checkout will hand out.
    pub token: OwnershipToken,
}

/// A conditional write, plus the outcome to report if it applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub precondition: Precondition,
    pub mutation: Mutation,
    pub on_success: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Answer without writing.
    Settled(Outcome),
    /// Try this write once.
    Attempt(Attempt),
}

/// Decide what to do with `request` given the current record.
pub fn decide(
    request: &Request,
    current: Option<&ResourceRecord>,
    ctx: &DecisionContext,
) -> Decision {
    match request {
        Request::Status { resource: None } => Decision::Settled(Outcome::Unregistered),
        Request::Status { resource: Some(_) } => Decision::Settled(status(current)),
        Request::CheckOut(r) => check_out(r, current, ctx),
        Request::Create(r) => create(r, current, ctx),
        Request::CheckIn(r) => check_in(r, current, ctx),
        Request::Discard(r) => discard(r, current),
        Request::Revoke { .. } => revoke(current),
    }
}

fn status(current: Option<&ResourceRecord>) -> Outcome {
    match current {
        None => Outcome::Unregistered,
        Some(record) => match HolderSnapshot::of_checkout(record) {
            Some(holder) => Outcome::denied(Rejection::AlreadyHeld(holder)),
            None => Outcome::Available(record.checkin.clone()),
        },
    }
}

fn check_out(
    r: &CheckOutRequest,
    current: Option<&ResourceRecord>,
    ctx: &DecisionContext,
) -> Decision {
    let record = match current {
        None => return Decision::Settled(Outcome::Unregistered),
        Some(record) => record,
    };
    if let Some(holder) = HolderSnapshot::of_checkout(record) {
        return Decision::Settled(Outcome::denied(Rejection::AlreadyHeld(holder)));
    }

    // A checkout without a holder name stores an empty holder; only a revoke
    // can release it.
    let holder = r.holder.clone().unwrap_or_default();

    Decision::Attempt(Attempt {
        precondition: Precondition::none()
            .present(Attribute::State)
            .absent(Attribute::CheckoutHolder),
        mutation: Mutation::new()
            .set(Attribute::State, AcmState::CheckedOut.as_str())
            .set(Attribute::CheckoutHolder, holder.as_str())
            .set(Attribute::CheckoutToken, ctx.token.as_str())
            .set(Attribute::CheckoutDate, ctx.now.as_str())
            .set_opt(Attribute::CheckoutContact, r.contact.as_deref())
            .set_opt(Attribute::CheckoutVersion, r.version.as_deref())
            .set_opt(Attribute::CheckoutComment, r.comment.as_deref())
            .set_opt(Attribute::CheckoutOrigin, r.origin.as_deref()),
        on_success: Outcome::CheckedOut {
            holder,
            token: ctx.token.clone(),
            artifact: record.artifact().map(str::to_string),
        },
    })
}

fn create(r: &CreateRequest, current: Option<&ResourceRecord>, ctx: &DecisionContext) -> Decision {
    if current.is_some() {
        return Decision::Settled(Outcome::denied(Rejection::AlreadyExists));
    }

    Decision::Attempt(Attempt {
        precondition: Precondition::none().absent(Attribute::CheckinHolder),
        mutation: Mutation::new()
            .set(Attribute::State, AcmState::CheckedIn.as_str())
            .set(Attribute::CheckinHolder, r.holder.as_str())
            .set(Attribute::CheckinArtifact, r.artifact.as_str())
            .set(Attribute::CheckinDate, ctx.now.as_str())
            .set_opt(Attribute::CheckinContact, r.contact.as_deref())
            .set_opt(Attribute::CheckinComment, r.comment.as_deref()),
        on_success: Outcome::Created,
    })
}

fn check_in(
    r: &CheckInRequest,
    current: Option<&ResourceRecord>,
    ctx: &DecisionContext,
) -> Decision {
    let record = match current {
        None => return Decision::Settled(Outcome::denied(Rejection::NotFound)),
        Some(record) => record,
    };
    if !record.is_held() {
        return Decision::Settled(Outcome::denied(Rejection::AlreadyInState));
    }
    let (token, holder) = match (&r.token, &r.holder) {
        (Some(token), Some(holder)) => (token, holder),
        _ => return not_the_holder(record),
    };

    Decision::Attempt(Attempt {
        precondition: ownership(token, holder),
        mutation: Mutation::new()
            .clear_checkout()
            .copy(Attribute::CheckoutComment, Attribute::CheckinComment)
            .set(Attribute::State, AcmState::CheckedIn.as_str())
            .set(Attribute::CheckinHolder, holder.as_str())
            .set(Attribute::CheckinDate, ctx.now.as_str())
            .set_opt(Attribute::CheckinArtifact, r.artifact.as_deref())
            .set_opt(Attribute::CheckinContact, r.contact.as_deref()),
        on_success: Outcome::CheckedIn {
            holder: holder.clone(),
        },
    })
}

fn discard(r: &DiscardRequest, current: Option<&ResourceRecord>) -> Decision {
    let record = match current {
        None => return Decision::Settled(Outcome::denied(Rejection::NotFound)),
        Some(record) => record,
    };
    let (token, holder) = match (&r.token, &r.holder) {
        (Some(token), Some(holder)) => (token, holder),
        _ => return not_the_holder(record),
    };

    // Attempted even when the pre-read shows no checkout: the failed write is
    // then classified as an already-satisfied discard.
    Decision::Attempt(Attempt {
        precondition: ownership(token, holder),
        mutation: Mutation::new()
            .clear_checkout()
            .set(Attribute::State, AcmState::CheckedIn.as_str()),
        on_success: Outcome::Discarded { noop: false },
    })
}

fn revoke(current: Option<&ResourceRecord>) -> Decision {
    // Nothing to clear, and writing would register the resource.
    if current.is_none() {
        return Decision::Settled(Outcome::Revoked);
    }

    Decision::Attempt(Attempt {
        precondition: Precondition::none(),
        mutation: Mutation::new()
            .clear_checkout()
            .set(Attribute::State, AcmState::CheckedIn.as_str()),
        on_success: Outcome::Revoked,
    })
}

/// A check-in or discard that lacks the token or the holder name can match no
/// checkout.
fn not_the_holder(record: &ResourceRecord) -> Decision {
    Decision::Settled(Outcome::denied(Rejection::OwnershipMismatch(
        HolderSnapshot::of_checkout(record),
    )))
}

fn ownership(token: &OwnershipToken, holder: &str) -> Precondition {
    Precondition::none()
        .equals(Attribute::CheckoutToken, token.as_str())
        .equals(Attribute::CheckoutHolder, holder)
}

/// Classify a failed conditional write from a fresh read of the record.
///
/// Only discard collapses into success: its intent ("stop holding this") is
/// already met when nobody holds the resource. Check-in reports the race.
pub fn classify_conflict(request: &Request, fresh: Option<&ResourceRecord>) -> Outcome {
    let record = match fresh {
        None => return Outcome::denied_after_race(Rejection::NotFound),
        Some(record) => record,
    };
    let holder = HolderSnapshot::of_checkout(record);

    match (request, holder) {
        (Request::Create(_), _) => Outcome::denied_after_race(Rejection::AlreadyExists),
        (Request::Discard(_), None) => Outcome::Discarded { noop: true },
        (Request::CheckIn(_), None) => Outcome::denied_after_race(Rejection::AlreadyInState),
        (Request::CheckOut(_), Some(holder)) => {
            Outcome::denied_after_race(Rejection::AlreadyHeld(holder))
        }
        (Request::CheckIn(_) | Request::Discard(_), Some(holder)) => {
            Outcome::denied_after_race(Rejection::OwnershipMismatch(Some(holder)))
        }
        (_, holder) => Outcome::denied_after_race(Rejection::Conflict(holder)),
    }
}
