//! Error types for acm-checkout.
//!
//! Business-rule failures (resource held by someone else, stale token, ...) are
//! not errors: they are `Rejection` values carried by an `Outcome`. The variants
//! here cover the truly unexpected faults that surface to callers as the generic
//! "Unexpected Error" denial, plus the failures of the maintenance commands.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for acm-checkout operations.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// User provided invalid arguments or the store is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// The request is missing a required field or carries an invalid value.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Reading or writing the record store failed.
    #[error("Record store failure: {0}")]
    Store(String),

    /// The per-record store lock could not be acquired.
    #[error("Lock acquisition failed: {0}")]
    Lock(String),

    /// Writing an audit entry failed.
    #[error("Audit sink failure: {0}")]
    Audit(String),

    /// The configuration file could not be read or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CheckoutError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            CheckoutError::UserError(_) => exit_codes::USER_ERROR,
            CheckoutError::MalformedRequest(_) => exit_codes::USER_ERROR,
            CheckoutError::Config(_) => exit_codes::USER_ERROR,
            CheckoutError::Store(_) => exit_codes::INTERNAL_FAILURE,
            CheckoutError::Audit(_) => exit_codes::INTERNAL_FAILURE,
            CheckoutError::Lock(_) => exit_codes::LOCK_FAILURE,
        }
    }
}

/// Result type alias for acm-checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_share_exit_code() {
        assert_eq!(
            CheckoutError::UserError("bad".into()).exit_code(),
            exit_codes::USER_ERROR
        );
        assert_eq!(
            CheckoutError::MalformedRequest("missing db".into()).exit_code(),
            exit_codes::USER_ERROR
        );
        assert_eq!(
            CheckoutError::Config("zero".into()).exit_code(),
            exit_codes::USER_ERROR
        );
    }

    #[test]
    fn store_and_audit_errors_are_internal_failures() {
        assert_eq!(
            CheckoutError::Store("disk full".into()).exit_code(),
            exit_codes::INTERNAL_FAILURE
        );
        assert_eq!(
            CheckoutError::Audit("read-only".into()).exit_code(),
            exit_codes::INTERNAL_FAILURE
        );
    }

    #[test]
    fn lock_error_has_correct_exit_code() {
        let err = CheckoutError::Lock("ACM-TEST held".to_string());
        assert_eq!(err.exit_code(), exit_codes::LOCK_FAILURE);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = CheckoutError::MalformedRequest("missing field 'db'".to_string());
        assert_eq!(err.to_string(), "Malformed request: missing field 'db'");

        let err = CheckoutError::Store("permission denied".to_string());
        assert_eq!(err.to_string(), "Record store failure: permission denied");
    }
}
