//! Inbound requests.
//!
//! Clients send a flat, operation-tagged object ([`RawRequest`]) whose field
//! names are fixed by deployed clients. It is parsed into the closed
//! [`Request`] enum, one variant per operation with exactly the fields that
//! operation uses, before any decision is made.

use crate::token::{NEW_RESOURCE_TOKEN, OwnershipToken};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static RESOURCE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,127}$").expect("resource name pattern is valid")
});

/// Wire shape of a request. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRequest {
    /// Resource (ACM) name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Ownership token, or `new` to register a resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Artifact label (e.g. `db12.zip`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Holder name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Origin label: the machine the checkout happens on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computername: Option<String>,
}

impl RawRequest {
    pub fn for_action(action: Operation, db: &str) -> Self {
        Self {
            db: Some(db.to_string()),
            action: Some(action.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Non-empty fields other than `action`, in wire order.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("db", &self.db),
            ("key", &self.key),
            ("filename", &self.filename),
            ("name", &self.name),
            ("contact", &self.contact),
            ("version", &self.version),
            ("comment", &self.comment),
            ("computername", &self.computername),
        ]
        .into_iter()
        .filter_map(|(k, v)| non_empty(v).map(|v| (k, v)))
        .collect()
    }

    /// The action as sent, if any.
    pub fn action_name(&self) -> Option<&str> {
        non_empty(&self.action)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn owned(value: &Option<String>) -> Option<String> {
    non_empty(value).map(str::to_string)
}

/// Recognized operation names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CheckOut,
    CheckIn,
    Discard,
    RevokeCheckOut,
    StatusCheck,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CheckOut => "checkOut",
            Operation::CheckIn => "checkIn",
            Operation::Discard => "discard",
            Operation::RevokeCheckOut => "revokeCheckOut",
            Operation::StatusCheck => "statusCheck",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "checkOut" => Some(Self::CheckOut),
            "checkIn" => Some(Self::CheckIn),
            "discard" => Some(Self::Discard),
            "revokeCheckOut" => Some(Self::RevokeCheckOut),
            "statusCheck" => Some(Self::StatusCheck),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutRequest {
    pub resource: String,
    pub holder: Option<String>,
    pub contact: Option<String>,
    pub version: Option<String>,
    pub comment: Option<String>,
    pub origin: Option<String>,
}

/// Check-in with the `new` token: registers a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub resource: String,
    pub artifact: String,
    pub holder: String,
    pub contact: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInRequest {
    pub resource: String,
    pub token: Option<OwnershipToken>,
    pub holder: Option<String>,
    pub artifact: Option<String>,
    pub contact: Option<String>,
}

/// Ownership fields stay optional: a missing one is an ownership denial, not
/// a malformed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardRequest {
    pub resource: String,
    pub token: Option<OwnershipToken>,
    pub holder: Option<String>,
}

/// A parsed request: one variant per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CheckOut(CheckOutRequest),
    Create(CreateRequest),
    CheckIn(CheckInRequest),
    Discard(DiscardRequest),
    Revoke { resource: String },
    /// Status of a resource; no name behaves like an unregistered resource.
    Status { resource: Option<String> },
}

/// Why a raw request could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Missing or unrecognized `action`.
    UnknownAction(Option<String>),
    /// A required field is missing or a value is invalid.
    Invalid(String),
}

impl Request {
    pub fn parse(raw: &RawRequest) -> Result<Self, ParseError> {
        let operation = raw
            .action_name()
            .and_then(Operation::parse)
            .ok_or_else(|| ParseError::UnknownAction(owned(&raw.action)))?;

        let request = match operation {
            Operation::StatusCheck => Request::Status {
                resource: match non_empty(&raw.db) {
                    Some(name) => Some(validate_name(name)?),
                    None => None,
                },
            },
            Operation::CheckOut => Request::CheckOut(CheckOutRequest {
                resource: resource(raw)?,
                holder: owned(&raw.name),
                contact: owned(&raw.contact),
                version: owned(&raw.version),
                comment: owned(&raw.comment),
                origin: owned(&raw.computername),
            }),
            Operation::CheckIn => {
                let resource = resource(raw)?;
                let token = non_empty(&raw.key);
                if token == Some(NEW_RESOURCE_TOKEN) {
                    Request::Create(CreateRequest {
                        resource,
                        artifact: required(&raw.filename, "filename")?,
                        holder: required(&raw.name, "name")?,
                        contact: owned(&raw.contact),
                        comment: owned(&raw.comment),
                    })
                } else {
                    Request::CheckIn(CheckInRequest {
                        resource,
                        token: token.map(OwnershipToken::from),
                        holder: owned(&raw.name),
                        artifact: owned(&raw.filename),
                        contact: owned(&raw.contact),
                    })
                }
            }
            Operation::Discard => Request::Discard(DiscardRequest {
                resource: resource(raw)?,
                token: non_empty(&raw.key).map(OwnershipToken::from),
                holder: owned(&raw.name),
            }),
            Operation::RevokeCheckOut => Request::Revoke {
                resource: resource(raw)?,
            },
        };

        Ok(request)
    }

    pub fn operation(&self) -> Operation {
        match self {
            Request::CheckOut(_) => Operation::CheckOut,
            Request::Create(_) | Request::CheckIn(_) => Operation::CheckIn,
            Request::Discard(_) => Operation::Discard,
            Request::Revoke { .. } => Operation::RevokeCheckOut,
            Request::Status { .. } => Operation::StatusCheck,
        }
    }

    pub fn resource(&self) -> Option<&str> {
        match self {
            Request::CheckOut(r) => Some(&r.resource),
            Request::Create(r) => Some(&r.resource),
            Request::CheckIn(r) => Some(&r.resource),
            Request::Discard(r) => Some(&r.resource),
            Request::Revoke { resource } => Some(resource),
            Request::Status { resource } => resource.as_deref(),
        }
    }
}

fn required(value: &Option<String>, field: &str) -> Result<String, ParseError> {
    owned(value).ok_or_else(|| ParseError::Invalid(format!("missing required field '{}'", field)))
}

fn resource(raw: &RawRequest) -> Result<String, ParseError> {
    validate_name(&required(&raw.db, "db")?)
}

/// Whether `name` can name a resource (and so a record or lock file).
pub fn is_valid_resource_name(name: &str) -> bool {
    RESOURCE_NAME.is_match(name)
}

fn validate_name(name: &str) -> Result<String, ParseError> {
    if is_valid_resource_name(name) {
        Ok(name.to_string())
    } else {
        Err(ParseError::Invalid(format!(
            "invalid resource name '{}': use letters, digits, '.', '_' or '-' (max 128)",
            name
        )))
    }
}
