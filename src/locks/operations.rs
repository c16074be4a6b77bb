//! Taking, listing and clearing record locks.

use super::record::RecordLock;
use super::types::{LockInfo, LockRetry};
use crate::error::{CheckoutError, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Path of the lock file guarding `resource` inside `locks_dir`.
pub fn record_lock_path(locks_dir: &Path, resource: &str) -> PathBuf {
    locks_dir.join(format!("{}.lock", resource))
}

/// A record lock this process holds. Dropping it deletes the lock file.
#[derive(Debug)]
pub struct HeldLock {
    path: PathBuf,
}

impl Drop for HeldLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(
                lock = %self.path.display(),
                error = %e,
                "failed to release record lock"
            );
        }
    }
}

/// Create the lock file exclusively. `None` when someone else holds it.
fn try_take(path: &Path, lock: &RecordLock) -> Result<Option<HeldLock>> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => {
            return Err(CheckoutError::Lock(format!(
                "cannot create lock '{}': {}",
                path.display(),
                e
            )));
        }
    };

    // From here on the file is ours; dropping `held` on error removes it.
    let held = HeldLock {
        path: path.to_path_buf(),
    };
    let body = serde_json::to_vec_pretty(lock)
        .map_err(|e| CheckoutError::Lock(format!("cannot encode lock: {}", e)))?;
    file.write_all(&body)
        .and_then(|()| file.sync_all())
        .map_err(|e| CheckoutError::Lock(format!("cannot write lock '{}': {}", path.display(), e)))?;

    Ok(Some(held))
}

/// Take the lock on `resource` for `operation`, waiting according to `retry`.
///
/// Fails with `CheckoutError::Lock` naming the current holder when the lock
/// stays busy through every attempt.
pub fn acquire_record_lock(
    locks_dir: &Path,
    resource: &str,
    operation: &str,
    retry: &LockRetry,
) -> Result<HeldLock> {
    fs::create_dir_all(locks_dir).map_err(|e| {
        CheckoutError::Lock(format!(
            "cannot create locks directory '{}': {}",
            locks_dir.display(),
            e
        ))
    })?;

    let path = record_lock_path(locks_dir, resource);
    let lock = RecordLock::taken_now(resource, operation);
    let attempts = retry.attempts.max(1);

    for attempt in 1..=attempts {
        if let Some(held) = try_take(&path, &lock)? {
            return Ok(held);
        }
        if attempt < attempts {
            std::thread::sleep(retry.delay);
        }
    }

    let holder = match RecordLock::load(&path) {
        Ok(current) => format!(
            " ({} by {} for {})",
            current.operation,
            current.owner,
            current.held_for_label()
        ),
        Err(_) => String::new(),
    };
    Err(CheckoutError::Lock(format!(
        "record '{}' is locked by another process{}: {}",
        resource,
        holder,
        path.display()
    )))
}

/// Every readable record lock in `locks_dir`, sorted by resource.
///
/// Files that do not parse (a lock still being written, stray files) are
/// skipped.
pub fn list_locks(locks_dir: &Path, stale_minutes: u32) -> Result<Vec<LockInfo>> {
    let entries = match fs::read_dir(locks_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(CheckoutError::UserError(format!(
                "cannot read locks directory '{}': {}",
                locks_dir.display(),
                e
            )));
        }
    };

    let mut locks: Vec<LockInfo> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "lock"))
        .filter_map(|path| {
            let lock = RecordLock::load(&path).ok()?;
            let is_stale = lock.is_stale(stale_minutes);
            Some(LockInfo {
                path,
                lock,
                is_stale,
            })
        })
        .collect();

    locks.sort_by(|a, b| a.lock.resource.cmp(&b.lock.resource));
    Ok(locks)
}

/// Remove the lock on `resource`.
///
/// Without `force`, only a stale lock may be cleared: a fresh one most likely
/// belongs to a write in progress.
pub fn clear_lock(
    locks_dir: &Path,
    resource: &str,
    stale_minutes: u32,
    force: bool,
) -> Result<LockInfo> {
    let path = record_lock_path(locks_dir, resource);
    if !path.exists() {
        return Err(CheckoutError::UserError(format!(
            "lock '{}' does not exist at: {}",
            resource,
            path.display()
        )));
    }

    let lock = RecordLock::load(&path)?;
    let is_stale = lock.is_stale(stale_minutes);
    if !is_stale && !force {
        return Err(CheckoutError::UserError(format!(
            "lock '{}' is not stale (held {}, threshold {}m). Use --force to clear it anyway.",
            resource,
            lock.held_for_label(),
            stale_minutes
        )));
    }

    fs::remove_file(&path).map_err(|e| {
        CheckoutError::UserError(format!("failed to clear lock '{}': {}", path.display(), e))
    })?;

    Ok(LockInfo {
        path,
        lock,
        is_stale,
    })
}
