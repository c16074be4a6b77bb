//! Caller-facing response rendering.
//!
//! Deployed clients parse these objects, so messages, the numbered `data` map
//! and the `NULL` absence marker are kept exactly as those clients expect.

use crate::exit_codes;
use crate::machine::{Denial, HolderSnapshot, Outcome, Rejection};
use crate::record::CheckinInfo;
use crate::request::Operation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stands in for a missing value in machine-parsed fields.
pub const ABSENT: &str = "NULL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Denied,
}

/// Either the literal `ok`/`denied` or a numbered list of `field=value` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    Text(String),
    Fields(BTreeMap<String, String>),
}

impl ResponseData {
    fn fields(pairs: &[(&str, &str)]) -> Self {
        ResponseData::Fields(
            pairs
                .iter()
                .enumerate()
                .map(|(i, (k, v))| ((i + 1).to_string(), format!("{}={}", k, v)))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    pub response: String,
    pub data: ResponseData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openby: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opendate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saveby: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savedate: Option<String>,
    /// Present only for unexpected failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn or_absent(value: Option<&str>) -> String {
    value.unwrap_or(ABSENT).to_string()
}

impl Response {
    fn new(status: Status, message: impl Into<String>) -> Self {
        let data = match status {
            Status::Ok => "ok",
            Status::Denied => "denied",
        };
        Self {
            status,
            response: message.into(),
            data: ResponseData::Text(data.to_string()),
            key: None,
            filename: None,
            openby: None,
            contact: None,
            opendate: None,
            saveby: None,
            savedate: None,
            error: None,
        }
    }

    fn ok(message: impl Into<String>) -> Self {
        Self::new(Status::Ok, message)
    }

    fn denied(message: impl Into<String>) -> Self {
        Self::new(Status::Denied, message)
    }

    pub fn unknown_action() -> Self {
        Self::denied("Unknown action requested")
    }

    /// Denial for a fault outside the business rules.
    pub fn unexpected(error: impl std::fmt::Display) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::denied("Unexpected Error")
        }
    }

    pub fn from_outcome(operation: Operation, outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Unregistered => Self {
                data: ResponseData::Text(format!("filename={}", ABSENT)),
                filename: Some(ABSENT.to_string()),
                ..Self::ok("Create new ACM")
            },
            Outcome::Available(checkin) => available(checkin.as_ref()),
            Outcome::CheckedOut {
                holder,
                token,
                artifact,
            } => {
                let filename = or_absent(artifact.as_deref());
                Self {
                    data: ResponseData::fields(&[("key", token.as_str()), ("filename", &filename)]),
                    key: Some(token.to_string()),
                    filename: Some(filename.clone()),
                    ..Self::ok(format!("SUCCESS. Checked out to {}", holder))
                }
            }
            Outcome::Created => Self::ok("SUCCESS. Created new ACM"),
            Outcome::CheckedIn { holder } => Self::ok(format!("SUCCESS. Checked in by {}", holder)),
            Outcome::Discarded { .. } => Self::ok("SUCCESS. Discarded check-out info"),
            Outcome::Revoked => Self::ok("Deleted check out entry"),
            Outcome::Denied(denial) => denied(operation, denial),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Process exit code for a CLI invocation that produced this response.
    pub fn exit_code(&self) -> i32 {
        match (self.status, &self.error) {
            (Status::Ok, _) => exit_codes::SUCCESS,
            (Status::Denied, Some(_)) => exit_codes::INTERNAL_FAILURE,
            (Status::Denied, None) => exit_codes::DENIED,
        }
    }
}

fn available(checkin: Option<&CheckinInfo>) -> Response {
    let filename = or_absent(checkin.and_then(|c| c.artifact.as_deref()));
    let updater = or_absent(checkin.map(|c| c.holder.as_str()));
    let contact = or_absent(checkin.and_then(|c| c.contact.as_deref()));
    let date = or_absent(checkin.and_then(|c| c.date.as_deref()));

    Response {
        data: ResponseData::fields(&[
            ("filename", &filename),
            ("updater", &updater),
            ("contact", &contact),
            ("date", &date),
        ]),
        filename: Some(filename.clone()),
        saveby: Some(updater.clone()),
        contact: Some(contact.clone()),
        savedate: Some(date.clone()),
        ..Response::ok("ACM available")
    }
}

fn held(holder: &HolderSnapshot) -> Response {
    let filename = or_absent(holder.artifact.as_deref());
    let contact = or_absent(holder.contact.as_deref());
    let date = or_absent(holder.date.as_deref());

    Response {
        data: ResponseData::fields(&[
            ("possessor", &holder.holder),
            ("filename", &filename),
            ("contact", &contact),
            ("date", &date),
        ]),
        openby: Some(holder.holder.clone()),
        contact: Some(contact.clone()),
        filename: Some(filename.clone()),
        opendate: Some(date.clone()),
        ..Response::denied("Already checked out")
    }
}

fn intercepted(holder: Option<&HolderSnapshot>) -> Response {
    let base = Response::denied("Your transaction was intercepted.");
    let Some(holder) = holder else {
        return base;
    };
    let filename = or_absent(holder.artifact.as_deref());

    Response {
        data: ResponseData::fields(&[("possessor", &holder.holder), ("filename", &filename)]),
        openby: Some(holder.holder.clone()),
        contact: Some(or_absent(holder.contact.as_deref())),
        filename: Some(filename.clone()),
        ..base
    }
}

fn denied(operation: Operation, denial: &Denial) -> Response {
    match &denial.rejection {
        Rejection::NotFound => Response::denied("Create new ACM"),
        Rejection::AlreadyExists => Response::denied("ACM already exists"),
        Rejection::AlreadyHeld(holder) if denial.raced => intercepted(Some(holder)),
        Rejection::AlreadyHeld(holder) => held(holder),
        Rejection::AlreadyInState => Response::denied("ACM is already checked-in"),
        Rejection::OwnershipMismatch(holder) => {
            let verb = match operation {
                Operation::Discard => "discard",
                _ => "check-in",
            };
            Response {
                openby: holder.as_ref().map(|h| h.holder.clone()),
                contact: holder.as_ref().map(|h| or_absent(h.contact.as_deref())),
                ..Response::denied(format!("FAILED. Do not have permission to perform {}", verb))
            }
        }
        Rejection::Conflict(holder) => intercepted(holder.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::OwnershipToken;
    use serde_json::json;

    fn json_of(response: &Response) -> serde_json::Value {
        serde_json::to_value(response).unwrap()
    }

    fn bob() -> HolderSnapshot {
        HolderSnapshot {
            holder: "bob".to_string(),
            contact: Some("555-0100".to_string()),
            date: Some("2026-03-01T10:00:00+00:00".to_string()),
            artifact: Some("db12.zip".to_string()),
        }
    }

    #[test]
    fn unregistered_uses_null_filename() {
        let response = Response::from_outcome(Operation::StatusCheck, &Outcome::Unregistered);
        assert_eq!(
            json_of(&response),
            json!({
                "status": "ok",
                "response": "Create new ACM",
                "data": "filename=NULL",
                "filename": "NULL"
            })
        );
        assert_eq!(response.exit_code(), exit_codes::SUCCESS);
    }

    #[test]
    fn available_lists_last_checkin() {
        let checkin = CheckinInfo {
            holder: "alice".to_string(),
            artifact: Some("db12.zip".to_string()),
            ..CheckinInfo::default()
        };
        let response =
            Response::from_outcome(Operation::StatusCheck, &Outcome::Available(Some(checkin)));
        assert_eq!(
            json_of(&response),
            json!({
                "status": "ok",
                "response": "ACM available",
                "data": {"1": "filename=db12.zip", "2": "updater=alice", "3": "contact=NULL", "4": "date=NULL"},
                "filename": "db12.zip",
                "saveby": "alice",
                "contact": "NULL",
                "savedate": "NULL"
            })
        );
    }

    #[test]
    fn held_reports_possessor() {
        let outcome = Outcome::denied(Rejection::AlreadyHeld(bob()));
        let response = Response::from_outcome(Operation::CheckOut, &outcome);
        assert_eq!(
            json_of(&response),
            json!({
                "status": "denied",
                "response": "Already checked out",
                "data": {
                    "1": "possessor=bob",
                    "2": "filename=db12.zip",
                    "3": "contact=555-0100",
                    "4": "date=2026-03-01T10:00:00+00:00"
                },
                "openby": "bob",
                "contact": "555-0100",
                "filename": "db12.zip",
                "opendate": "2026-03-01T10:00:00+00:00"
            })
        );
        assert_eq!(response.exit_code(), exit_codes::DENIED);
    }

    #[test]
    fn lost_checkout_race_is_intercepted() {
        let outcome = Outcome::denied_after_race(Rejection::AlreadyHeld(bob()));
        let response = Response::from_outcome(Operation::CheckOut, &outcome);
        assert_eq!(response.response, "Your transaction was intercepted.");
        assert_eq!(
            response.data,
            ResponseData::fields(&[("possessor", "bob"), ("filename", "db12.zip")])
        );
        assert_eq!(response.openby.as_deref(), Some("bob"));
        assert!(response.opendate.is_none());
    }

    #[test]
    fn checkout_success_carries_token_and_artifact() {
        let outcome = Outcome::CheckedOut {
            holder: "alice".to_string(),
            token: OwnershipToken::from("abc123"),
            artifact: Some("db12.zip".to_string()),
        };
        let response = Response::from_outcome(Operation::CheckOut, &outcome);
        assert_eq!(
            json_of(&response),
            json!({
                "status": "ok",
                "response": "SUCCESS. Checked out to alice",
                "data": {"1": "key=abc123", "2": "filename=db12.zip"},
                "key": "abc123",
                "filename": "db12.zip"
            })
        );
    }

    #[test]
    fn ownership_mismatch_names_operation() {
        let outcome = Outcome::denied(Rejection::OwnershipMismatch(Some(bob())));
        let check_in = Response::from_outcome(Operation::CheckIn, &outcome);
        assert_eq!(
            check_in.response,
            "FAILED. Do not have permission to perform check-in"
        );
        assert_eq!(check_in.openby.as_deref(), Some("bob"));

        let discard = Response::from_outcome(
            Operation::Discard,
            &Outcome::denied(Rejection::OwnershipMismatch(None)),
        );
        assert_eq!(
            discard.response,
            "FAILED. Do not have permission to perform discard"
        );
        assert!(discard.openby.is_none());
        assert_eq!(discard.data, ResponseData::Text("denied".to_string()));
    }

    #[test]
    fn simple_messages() {
        let cases = [
            (Outcome::Created, "SUCCESS. Created new ACM", Status::Ok),
            (
                Outcome::CheckedIn {
                    holder: "bob".to_string(),
                },
                "SUCCESS. Checked in by bob",
                Status::Ok,
            ),
            (
                Outcome::Discarded { noop: true },
                "SUCCESS. Discarded check-out info",
                Status::Ok,
            ),
            (Outcome::Revoked, "Deleted check out entry", Status::Ok),
            (
                Outcome::denied(Rejection::NotFound),
                "Create new ACM",
                Status::Denied,
            ),
            (
                Outcome::denied(Rejection::AlreadyExists),
                "ACM already exists",
                Status::Denied,
            ),
            (
                Outcome::denied(Rejection::AlreadyInState),
                "ACM is already checked-in",
                Status::Denied,
            ),
        ];
        for (outcome, message, status) in cases {
            let response = Response::from_outcome(Operation::CheckIn, &outcome);
            assert_eq!(response.response, message);
            assert_eq!(response.status, status);
        }
    }

    #[test]
    fn unexpected_carries_error_and_distinct_exit_code() {
        let response = Response::unexpected("disk on fire");
        assert_eq!(
            json_of(&response),
            json!({
                "status": "denied",
                "response": "Unexpected Error",
                "data": "denied",
                "error": "disk on fire"
            })
        );
        assert_eq!(response.exit_code(), exit_codes::INTERNAL_FAILURE);
        assert_eq!(
            Response::unknown_action().response,
            "Unknown action requested"
        );
    }
}
