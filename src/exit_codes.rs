//! Exit code constants for the acmco CLI.
//!
//! - 0: Success (response status `ok`)
//! - 1: User error (bad args, uninitialized store, invalid config)
//! - 2: Request denied by the checkout protocol
//! - 3: Internal failure (record store or audit sink fault, `error` responses)
//! - 4: Store lock could not be acquired

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid state, or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// The request was understood but denied (held by someone else, stale token, ...).
pub const DENIED: i32 = 2;

/// Internal failure: the record store or audit sink misbehaved.
pub const INTERNAL_FAILURE: i32 = 3;

/// Lock acquisition failure: a per-record store lock stayed busy.
pub const LOCK_FAILURE: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, USER_ERROR, DENIED, INTERNAL_FAILURE, LOCK_FAILURE];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }
}
