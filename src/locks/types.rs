//! Lock listing entries and retry policy.

use super::record::RecordLock;
use std::path::PathBuf;
use std::time::Duration;

/// How the file store waits for a busy record lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockRetry {
    /// Total acquisition attempts (at least one).
    pub attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl LockRetry {
    /// Fail on the first busy lock.
    pub fn once() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

impl Default for LockRetry {
    fn default() -> Self {
        Self {
            attempts: 50,
            delay: Duration::from_millis(10),
        }
    }
}

/// A record lock found on disk.
#[derive(Debug, Clone)]
pub struct LockInfo {
    pub path: PathBuf,
    pub lock: RecordLock,
    pub is_stale: bool,
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} by {}, held {}{})",
            self.lock.resource,
            self.lock.operation,
            self.lock.owner,
            self.lock.held_for_label(),
            if self.is_stale { ", STALE" } else { "" }
        )
    }
}
