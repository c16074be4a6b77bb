//! Append-only audit trail.
//!
//! Every request, whatever its outcome, produces exactly one [`AuditEntry`].
//! Entries are single comma-separated lines:
//!
//! ```text
//! 2026-03-01T10:00:00.123456+00:00,checkOut,response:ok,db:ACM-X,key:1f0c...,filename:db12.zip,name:alice
//! ```
//!
//! The operation column is followed by `response:<ok|denied|nop>` and then every
//! non-empty request field as `field:value`, in wire order. Values containing a
//! comma are double-quoted; embedded quotes are backslash-escaped. An
//! unrecognized action is logged as `unknownAction`, and only then is the raw
//! `action` field listed.
//!
//! Emission is best effort: callers log sink failures and carry on.

mod sink;
mod viewer;


pub use sink::{FileAuditSink, MemoryAuditSink, NullAuditSink, audit_file_path};
pub use viewer::{DayLog, LogSelection, read_selection};

use crate::error::Result;
use crate::request::{Operation, RawRequest};
use chrono::{DateTime, SecondsFormat, Utc};

/// Operation column used when the action is missing or unrecognized.
pub const UNKNOWN_ACTION: &str = "unknownAction";

/// Recorded result of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditResult {
    Ok,
    Denied,
    /// Request reported success but a concurrent actor had already done the work.
    Nop,
}

impl AuditResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditResult::Ok => "ok",
            AuditResult::Denied => "denied",
            AuditResult::Nop => "nop",
        }
    }
}

impl std::fmt::Display for AuditResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub ts: DateTime<Utc>,
    pub operation: String,
    pub result: AuditResult,
    pub fields: Vec<(String, String)>,
}

impl AuditEntry {
    /// Entry for a request as received.
    pub fn from_request(raw: &RawRequest, result: AuditResult) -> Self {
        let mut fields: Vec<(String, String)> = raw
            .fields()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let operation = match raw.action_name().and_then(Operation::parse) {
            Some(op) => op.as_str().to_string(),
            None => {
                if let Some(action) = raw.action_name() {
                    let at = usize::from(fields.first().is_some_and(|(k, _)| k == "db"));
                    fields.insert(at, ("action".to_string(), action.to_string()));
                }
                UNKNOWN_ACTION.to_string()
            }
        };

        Self {
            ts: Utc::now(),
            operation,
            result,
            fields,
        }
    }

    /// Set a field, replacing an existing value in place or appending.
    pub fn with_field(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key.to_string(), value)),
        }
        self
    }

    /// Render as a single line (no trailing newline).
    pub fn to_line(&self) -> String {
        let mut line = format!(
            "{},{},response:{}",
            self.ts.to_rfc3339_opts(SecondsFormat::Micros, false),
            self.operation,
            self.result
        );
        for (key, value) in &self.fields {
            line.push(',');
            line.push_str(key);
            line.push(':');
            line.push_str(&enquote(value));
        }
        line
    }
}

/// Quote a value for the comma-separated audit line.
pub fn enquote(value: &str) -> String {
    let escaped = value.replace('"', "\\\"");
    if escaped.contains(',') {
        format!("\"{}\"", escaped)
    } else {
        escaped
    }
}

/// Destination for audit entries.
pub trait AuditSink {
    fn emit(&self, entry: &AuditEntry) -> Result<()>;
}

impl<T: AuditSink + ?Sized> AuditSink for &T {
    fn emit(&self, entry: &AuditEntry) -> Result<()> {
        (**self).emit(entry)
    }
}

impl<T: AuditSink + ?Sized> AuditSink for Box<T> {
    fn emit(&self, entry: &AuditEntry) -> Result<()> {
        (**self).emit(entry)
    }
}
