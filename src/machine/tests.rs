//! Tests for the checkout state machine.

use super::*;
use crate::request::RawRequest;
use crate::store::Item;

fn ctx() -> DecisionContext {
    DecisionContext {
        now: "2026-03-01T10:00:00+00:00".to_string(),
        token: OwnershipToken::from("tok-1"),
    }
}

fn parse(json: &str) -> Request {
    let raw: RawRequest = serde_json::from_str(json).unwrap();
    Request::parse(&raw).unwrap()
}

fn checked_in_item() -> Item {
    let mut item = Item::new();
    Mutation::new()
        .set(Attribute::State, "CHECKED_IN")
        .set(Attribute::CheckinHolder, "alice")
        .set(Attribute::CheckinArtifact, "db12.zip")
        .set(Attribute::CheckinComment, "initial")
        .apply(&mut item);
    item
}

fn checked_out_item(holder: &str, token: &str) -> Item {
    let mut item = checked_in_item();
    Mutation::new()
        .set(Attribute::State, "CHECKED_OUT")
        .set(Attribute::CheckoutHolder, holder)
        .set(Attribute::CheckoutToken, token)
        .set(Attribute::CheckoutContact, "555-0100")
        .set(Attribute::CheckoutComment, "fixing prompts")
        .apply(&mut item);
    item
}

fn record(item: &Item) -> ResourceRecord {
    ResourceRecord::from_item("ACM-X", item).unwrap()
}

fn attempt(decision: Decision) -> Attempt {
    match decision {
        Decision::Attempt(attempt) => attempt,
        Decision::Settled(outcome) => panic!("expected a write, got {:?}", outcome),
    }
}

fn settled(decision: Decision) -> Outcome {
    match decision {
        Decision::Settled(outcome) => outcome,
        Decision::Attempt(attempt) => panic!("expected no write, got {:?}", attempt),
    }
}

/// Run an attempt against `item` the way a store would.
fn apply(attempt: &Attempt, item: &mut Item) -> bool {
    if attempt.precondition.holds(Some(item)) {
        attempt.mutation.apply(item);
        true
    } else {
        false
    }
}

#[test]
fn status_reports_each_state() {
    let ctx = ctx();
    let status = parse(r#"{"db":"ACM-X","action":"statusCheck"}"#);

    assert_eq!(settled(decide(&status, None, &ctx)), Outcome::Unregistered);

    let available = settled(decide(&status, Some(&record(&checked_in_item())), &ctx));
    assert!(matches!(available, Outcome::Available(Some(ref c)) if c.holder == "alice"));

    let held = settled(decide(
        &status,
        Some(&record(&checked_out_item("bob", "t"))),
        &ctx,
    ));
    assert!(matches!(
        held,
        Outcome::Denied(Denial { rejection: Rejection::AlreadyHeld(ref h), raced: false })
            if h.holder == "bob" && h.artifact.as_deref() == Some("db12.zip")
    ));
}

#[test]
fn status_without_name_is_unregistered() {
    let status = parse(r#"{"action":"statusCheck"}"#);
    assert_eq!(settled(decide(&status, None, &ctx())), Outcome::Unregistered);
}

#[test]
fn checkout_of_unregistered_resource_writes_nothing() {
    let request = parse(r#"{"db":"ACM-X","action":"checkOut","name":"bob"}"#);
    assert_eq!(settled(decide(&request, None, &ctx())), Outcome::Unregistered);
}

#[test]
fn checkout_moves_to_checked_out_with_fresh_token() {
    let ctx = ctx();
    let request = parse(
        r#"{"db":"ACM-X","action":"checkOut","name":"bob","version":"r1","computername":"lab-3"}"#,
    );
    let mut item = checked_in_item();

    let attempt = attempt(decide(&request, Some(&record(&item)), &ctx));
    assert!(apply(&attempt, &mut item));

    let after = record(&item);
    assert_eq!(after.state, AcmState::CheckedOut);
    let checkout = after.checkout.unwrap();
    assert_eq!(checkout.holder, "bob");
    assert_eq!(checkout.token, "tok-1");
    assert_eq!(checkout.version.as_deref(), Some("r1"));
    assert_eq!(checkout.origin.as_deref(), Some("lab-3"));
    assert_eq!(checkout.date.as_deref(), Some(ctx.now.as_str()));
    assert_eq!(
        attempt.on_success,
        Outcome::CheckedOut {
            holder: "bob".to_string(),
            token: ctx.token.clone(),
            artifact: Some("db12.zip".to_string()),
        }
    );
}

#[test]
fn checkout_of_held_resource_is_denied_without_write() {
    let request = parse(r#"{"db":"ACM-X","action":"checkOut","name":"carol"}"#);
    let outcome = settled(decide(
        &request,
        Some(&record(&checked_out_item("bob", "t"))),
        &ctx(),
    ));
    assert!(matches!(
        outcome,
        Outcome::Denied(Denial { rejection: Rejection::AlreadyHeld(ref h), .. }) if h.holder == "bob"
    ));
}

#[test]
fn checkout_guard_rejects_a_record_that_became_held() {
    let request = parse(r#"{"db":"ACM-X","action":"checkOut","name":"carol"}"#);
    let attempt = attempt(decide(&request, Some(&record(&checked_in_item())), &ctx()));

    let mut raced = checked_out_item("bob", "t");
    assert!(!apply(&attempt, &mut raced));
    assert_eq!(record(&raced).checkout.unwrap().holder, "bob");
}

#[test]
fn create_registers_checked_in_resource() {
    let ctx = ctx();
    let request = parse(
        r#"{"db":"ACM-X","action":"checkIn","key":"new","filename":"db1.zip","name":"alice","comment":"first"}"#,
    );
    let attempt = attempt(decide(&request, None, &ctx));
    assert_eq!(attempt.on_success, Outcome::Created);

    let mut item = Item::new();
    assert!(apply(&attempt, &mut item));
    let after = record(&item);
    assert_eq!(after.state, AcmState::CheckedIn);
    let checkin = after.checkin.unwrap();
    assert_eq!(checkin.holder, "alice");
    assert_eq!(checkin.artifact.as_deref(), Some("db1.zip"));
    assert_eq!(checkin.comment.as_deref(), Some("first"));
    assert!(after.checkout.is_none());
}

#[test]
fn create_of_existing_resource_is_denied() {
    let request = parse(
        r#"{"db":"ACM-X","action":"checkIn","key":"new","filename":"db1.zip","name":"bob"}"#,
    );
    let outcome = settled(decide(&request, Some(&record(&checked_in_item())), &ctx()));
    assert_eq!(outcome, Outcome::denied(Rejection::AlreadyExists));
}

#[test]
fn check_in_releases_and_carries_checkout_comment() {
    let request = parse(
        r#"{"db":"ACM-X","action":"checkIn","key":"tok-9","name":"bob","filename":"db13.zip"}"#,
    );
    let mut item = checked_out_item("bob", "tok-9");

    let attempt = attempt(decide(&request, Some(&record(&item)), &ctx()));
    assert!(apply(&attempt, &mut item));

    let after = record(&item);
    assert_eq!(after.state, AcmState::CheckedIn);
    assert!(after.checkout.is_none());
    let checkin = after.checkin.unwrap();
    assert_eq!(checkin.holder, "bob");
    assert_eq!(checkin.artifact.as_deref(), Some("db13.zip"));
    assert_eq!(checkin.comment.as_deref(), Some("fixing prompts"));
    for attr in Attribute::CHECKOUT {
        assert!(!item.contains_key(&attr), "{} left behind", attr);
    }
}

#[test]
fn check_in_keeps_previous_artifact_when_none_given() {
    let request = parse(r#"{"db":"ACM-X","action":"checkIn","key":"t","name":"bob"}"#);
    let mut item = checked_out_item("bob", "t");

    let attempt = attempt(decide(&request, Some(&record(&item)), &ctx()));
    assert!(apply(&attempt, &mut item));
    assert_eq!(record(&item).artifact(), Some("db12.zip"));
}

#[test]
fn check_in_with_wrong_token_fails_precondition() {
    let request = parse(r#"{"db":"ACM-X","action":"checkIn","key":"wrong","name":"bob"}"#);
    let mut item = checked_out_item("bob", "right");
    let before = item.clone();

    let attempt = attempt(decide(&request, Some(&record(&item)), &ctx()));
    assert!(!apply(&attempt, &mut item));
    assert_eq!(item, before);
}

#[test]
fn check_in_with_wrong_holder_fails_precondition() {
    let request = parse(r#"{"db":"ACM-X","action":"checkIn","key":"t","name":"mallory"}"#);
    let mut item = checked_out_item("bob", "t");

    let attempt = attempt(decide(&request, Some(&record(&item)), &ctx()));
    assert!(!apply(&attempt, &mut item));
}

#[test]
fn check_in_settles_without_write_when_not_applicable() {
    let ctx = ctx();
    let request = parse(r#"{"db":"ACM-X","action":"checkIn","key":"t","name":"bob"}"#);

    assert_eq!(
        settled(decide(&request, None, &ctx)),
        Outcome::denied(Rejection::NotFound)
    );
    assert_eq!(
        settled(decide(&request, Some(&record(&checked_in_item())), &ctx)),
        Outcome::denied(Rejection::AlreadyInState)
    );

    let anonymous = parse(r#"{"db":"ACM-X","action":"checkIn","key":"t"}"#);
    let outcome = settled(decide(
        &anonymous,
        Some(&record(&checked_out_item("bob", "t"))),
        &ctx,
    ));
    assert!(matches!(
        outcome,
        Outcome::Denied(Denial { rejection: Rejection::OwnershipMismatch(Some(ref h)), .. })
            if h.holder == "bob"
    ));
}

#[test]
fn missing_ownership_fields_deny_without_write() {
    let ctx = ctx();
    let held = record(&checked_out_item("bob", "t"));

    for json in [
        r#"{"db":"ACM-X","action":"checkIn","name":"bob"}"#,
        r#"{"db":"ACM-X","action":"discard","name":"bob"}"#,
        r#"{"db":"ACM-X","action":"discard","key":"t"}"#,
    ] {
        let outcome = settled(decide(&parse(json), Some(&held), &ctx));
        assert!(
            matches!(
                outcome,
                Outcome::Denied(Denial { rejection: Rejection::OwnershipMismatch(Some(ref h)), raced: false })
                    if h.holder == "bob"
            ),
            "{}",
            json
        );
    }
}

#[test]
fn discard_clears_checkout_without_touching_checkin() {
    let request = parse(r#"{"db":"ACM-X","action":"discard","key":"t","name":"bob"}"#);
    let mut item = checked_out_item("bob", "t");

    let attempt = attempt(decide(&request, Some(&record(&item)), &ctx()));
    assert!(apply(&attempt, &mut item));

    let after = record(&item);
    assert_eq!(after.state, AcmState::CheckedIn);
    assert!(after.checkout.is_none());
    assert_eq!(after.checkin.unwrap().comment.as_deref(), Some("initial"));
}

#[test]
fn discard_is_attempted_even_when_not_held() {
    let request = parse(r#"{"db":"ACM-X","action":"discard","key":"t","name":"bob"}"#);
    let mut item = checked_in_item();

    let attempt = attempt(decide(&request, Some(&record(&item)), &ctx()));
    assert!(!apply(&attempt, &mut item));
}

#[test]
fn revoke_is_unconditional() {
    let request = parse(r#"{"db":"ACM-X","action":"revokeCheckOut"}"#);
    let ctx = ctx();

    for mut item in [checked_in_item(), checked_out_item("bob", "t")] {
        let attempt = attempt(decide(&request, Some(&record(&item)), &ctx));
        assert!(attempt.precondition.is_unconditional());
        assert!(apply(&attempt, &mut item));
        let after = record(&item);
        assert_eq!(after.state, AcmState::CheckedIn);
        assert!(after.checkout.is_none());
    }
}

#[test]
fn lost_discard_race_on_released_resource_is_noop_success() {
    let request = parse(r#"{"db":"ACM-X","action":"discard","key":"t","name":"bob"}"#);
    let fresh = record(&checked_in_item());
    assert_eq!(
        classify_conflict(&request, Some(&fresh)),
        Outcome::Discarded { noop: true }
    );
}

#[test]
fn lost_check_in_race_on_released_resource_is_denied() {
    let request = parse(r#"{"db":"ACM-X","action":"checkIn","key":"t","name":"bob"}"#);
    let fresh = record(&checked_in_item());
    assert_eq!(
        classify_conflict(&request, Some(&fresh)),
        Outcome::denied_after_race(Rejection::AlreadyInState)
    );
}

#[test]
fn lost_races_report_current_holder() {
    let fresh = record(&checked_out_item("carol", "other"));

    let checkout = parse(r#"{"db":"ACM-X","action":"checkOut","name":"bob"}"#);
    assert!(matches!(
        classify_conflict(&checkout, Some(&fresh)),
        Outcome::Denied(Denial { rejection: Rejection::AlreadyHeld(ref h), raced: true })
            if h.holder == "carol"
    ));

    for json in [
        r#"{"db":"ACM-X","action":"checkIn","key":"t","name":"bob"}"#,
        r#"{"db":"ACM-X","action":"discard","key":"t","name":"bob"}"#,
    ] {
        assert!(matches!(
            classify_conflict(&parse(json), Some(&fresh)),
            Outcome::Denied(Denial {
                rejection: Rejection::OwnershipMismatch(Some(ref h)),
                raced: true
            }) if h.holder == "carol"
        ));
    }
}

#[test]
fn lost_create_race_is_already_exists() {
    let request = parse(
        r#"{"db":"ACM-X","action":"checkIn","key":"new","filename":"db1.zip","name":"bob"}"#,
    );
    assert_eq!(
        classify_conflict(&request, Some(&record(&checked_in_item()))),
        Outcome::denied_after_race(Rejection::AlreadyExists)
    );
}

#[test]
fn rejection_kinds_are_stable() {
    assert_eq!(Rejection::NotFound.kind(), "not_found");
    assert_eq!(
        Rejection::OwnershipMismatch(None).kind(),
        "ownership_mismatch"
    );
    assert_eq!(Rejection::Conflict(None).kind(), "conflict");
}

#[test]
fn revoke_of_unregistered_resource_succeeds_without_write() {
    let request = parse(r#"{"db":"ACM-NONE","action":"revokeCheckOut"}"#);
    assert_eq!(settled(decide(&request, None, &ctx())), Outcome::Revoked);
}
