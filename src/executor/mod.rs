//! Transaction executor.
//!
//! Runs one request end to end: parse, read the current record, let the state
//! machine decide, attempt at most one conditional write, classify a lost race
//! from a fresh read, emit exactly one audit entry and render the response.
//!
//! There is no retry loop. A caller that loses a race gets an immediate
//! denial naming whoever won and may retry on its own.


use crate::audit::{AuditEntry, AuditResult, AuditSink};
use crate::error::{CheckoutError, Result};
use crate::machine::{self, Decision, DecisionContext, Outcome};
use crate::record::ResourceRecord;
use crate::request::{Operation, ParseError, RawRequest, Request};
use crate::response::Response;
use crate::store::{PutOutcome, RecordStore};
use crate::token::OwnershipToken;
use chrono::Utc;
use tracing::{debug, error, info, warn};

/// Applies checkout-protocol requests to a record store.
pub struct Executor<S, A> {
    store: S,
    audit: A,
}

impl<S: RecordStore, A: AuditSink> Executor<S, A> {
    pub fn new(store: S, audit: A) -> Self {
        Self { store, audit }
    }

    /// Handle one request as received from a client.
    ///
    /// Never fails: faults become the `error`-carrying "Unexpected Error" denial.
    pub fn handle(&self, raw: &RawRequest) -> Response {
        let request = match Request::parse(raw) {
            Ok(request) => request,
            Err(ParseError::UnknownAction(action)) => {
                info!(action = ?action, resource = ?raw.db, "unknown action requested");
                self.emit(AuditEntry::from_request(raw, AuditResult::Denied));
                return Response::unknown_action();
            }
            Err(ParseError::Invalid(reason)) => {
                let err = CheckoutError::MalformedRequest(reason);
                warn!(action = ?raw.action, resource = ?raw.db, error = %err, "rejected malformed request");
                self.emit(AuditEntry::from_request(raw, AuditResult::Denied));
                return Response::unexpected(err);
            }
        };

        let operation = request.operation();
        match self.execute(&request) {
            Ok(outcome) => {
                self.emit(audit_entry(raw, operation, &outcome));
                Response::from_outcome(operation, &outcome)
            }
            Err(err) => {
                error!(action = %operation, resource = ?request.resource(), error = %err, "request failed");
                self.emit(AuditEntry::from_request(raw, AuditResult::Denied));
                Response::unexpected(err)
            }
        }
    }

    /// Answer a request body that could not be decoded at all. It is audited
    /// as an unknown action.
    pub fn reject_unreadable(&self, reason: impl Into<String>) -> Response {
        let err = CheckoutError::MalformedRequest(reason.into());
        warn!(error = %err, "rejected undecodable request");
        self.emit(AuditEntry::from_request(&RawRequest::default(), AuditResult::Denied));
        Response::unexpected(err)
    }

    fn execute(&self, request: &Request) -> Result<Outcome> {
        let operation = request.operation();
        let current = self.read(request.resource())?;
        let ctx = DecisionContext {
            now: Utc::now().to_rfc3339(),
            token: OwnershipToken::mint(),
        };

        let attempt = match machine::decide(request, current.as_ref(), &ctx) {
            Decision::Settled(outcome) => {
                debug!(action = %operation, resource = ?request.resource(), "settled without write");
                log_denial(request, &outcome);
                return Ok(outcome);
            }
            Decision::Attempt(attempt) => attempt,
        };

        let name = request.resource().ok_or_else(|| {
            CheckoutError::MalformedRequest("a write needs a resource name".to_string())
        })?;
        debug!(
            action = %operation,
            resource = name,
            conditions = attempt.precondition.conditions().len(),
            updates = attempt.mutation.updates().len(),
            "attempting conditional write"
        );

        match self
            .store
            .conditional_put(name, &attempt.mutation, &attempt.precondition)?
        {
            PutOutcome::Applied => {
                info!(action = %operation, resource = name, "committed");
                Ok(attempt.on_success)
            }
            PutOutcome::PreconditionFailed => {
                let fresh = self.read(Some(name))?;
                let outcome = machine::classify_conflict(request, fresh.as_ref());
                debug!(action = %operation, resource = name, "lost write race, re-read to classify");
                log_denial(request, &outcome);
                Ok(outcome)
            }
        }
    }

    fn read(&self, name: Option<&str>) -> Result<Option<ResourceRecord>> {
        let Some(name) = name else {
            return Ok(None);
        };
        self.store
            .get(name)?
            .map(|item| ResourceRecord::from_item(name, &item))
            .transpose()
    }

    /// Best-effort audit: failures are logged here and go no further.
    fn emit(&self, entry: AuditEntry) {
        if let Err(err) = self.audit.emit(&entry) {
            warn!(action = %entry.operation, error = %err, "audit entry dropped");
        }
    }
}

fn log_denial(request: &Request, outcome: &Outcome) {
    if let Outcome::Denied(denial) = outcome {
        info!(
            action = %request.operation(),
            resource = ?request.resource(),
            reason = denial.rejection.kind(),
            raced = denial.raced,
            "denied"
        );
    }
}

fn audit_result(operation: Operation, outcome: &Outcome) -> AuditResult {
    match outcome {
        Outcome::Denied(_) => AuditResult::Denied,
        Outcome::Discarded { noop: true } => AuditResult::Nop,
        Outcome::Unregistered if operation != Operation::StatusCheck => AuditResult::Denied,
        _ => AuditResult::Ok,
    }
}

fn audit_entry(raw: &RawRequest, operation: Operation, outcome: &Outcome) -> AuditEntry {
    let entry = AuditEntry::from_request(raw, audit_result(operation, outcome));
    match outcome {
        Outcome::CheckedOut {
            token, artifact, ..
        } => {
            let entry = entry.with_field("key", token.as_str());
            match artifact {
                Some(artifact) => entry.with_field("filename", artifact.as_str()),
                None => entry,
            }
        }
        _ => entry,
    }
}
