//! The contents of a record lock file.

use crate::error::{CheckoutError, Result};
use crate::identity::actor_string;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Who holds a record lock, for which resource and store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLock {
    /// Resource whose record file the lock guards.
    pub resource: String,
    /// Store operation that took the lock.
    pub operation: String,
    /// `user@HOST` of the taking process.
    pub owner: String,
    pub pid: u32,
    pub acquired_at: DateTime<Utc>,
}

impl RecordLock {
    /// A lock on `resource` taken by this process, now.
    pub fn taken_now(resource: &str, operation: &str) -> Self {
        Self {
            resource: resource.to_string(),
            operation: operation.to_string(),
            owner: actor_string(),
            pid: std::process::id(),
            acquired_at: Utc::now(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            CheckoutError::Lock(format!("cannot read lock '{}': {}", path.display(), e))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            CheckoutError::Lock(format!("lock '{}' is unreadable: {}", path.display(), e))
        })
    }

    pub fn held_for(&self) -> Duration {
        Utc::now() - self.acquired_at
    }

    /// Hold time as `42s`, `7m` or `3h05m`.
    pub fn held_for_label(&self) -> String {
        let held = self.held_for();
        match (held.num_hours(), held.num_minutes()) {
            (0, 0) => format!("{}s", held.num_seconds().max(0)),
            (0, m) => format!("{}m", m),
            (h, m) => format!("{}h{:02}m", h, m % 60),
        }
    }

    /// Held longer than `stale_minutes`: most likely left behind by a crash.
    pub fn is_stale(&self, stale_minutes: u32) -> bool {
        self.held_for() > Duration::minutes(i64::from(stale_minutes))
    }
}
