//! Config struct definition and default implementation.

use serde::{Deserialize, Serialize};

/// Configuration for a checkout store.
///
/// This struct represents the contents of `<root>/config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Minutes after which a record lock is reported as stale.
    #[serde(default = "default_lock_stale_minutes")]
    pub lock_stale_minutes: u32,

    /// How many times a write tries to take a busy record lock.
    #[serde(default = "default_lock_retry_attempts")]
    pub lock_retry_attempts: u32,

    /// Pause between lock attempts, in milliseconds.
    #[serde(default = "default_lock_retry_delay_ms")]
    pub lock_retry_delay_ms: u64,

    // =========================================================================
    // Audit settings
    // =========================================================================
    /// Whether requests are written to the audit trail.
    #[serde(default = "default_true")]
    pub audit_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_stale_minutes: default_lock_stale_minutes(),
            lock_retry_attempts: default_lock_retry_attempts(),
            lock_retry_delay_ms: default_lock_retry_delay_ms(),
            audit_enabled: default_true(),
        }
    }
}

pub(crate) fn default_lock_stale_minutes() -> u32 {
    10
}
pub(crate) fn default_lock_retry_attempts() -> u32 {
    50
}
pub(crate) fn default_lock_retry_delay_ms() -> u64 {
    10
}
pub(crate) fn default_true() -> bool {
    true
}
