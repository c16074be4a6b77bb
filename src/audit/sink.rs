//! Audit sink implementations.

use super::{AuditEntry, AuditSink};
use crate::error::{CheckoutError, Result};
use chrono::{Datelike, NaiveDate};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Path of the log file holding entries for `date`: `<dir>/<YYYY>/<M>/<YYYY-MM-DD>.log`.
pub fn audit_file_path(audit_dir: &Path, date: NaiveDate) -> PathBuf {
    audit_dir
        .join(date.year().to_string())
        .join(date.month().to_string())
        .join(format!("{}.log", date.format("%Y-%m-%d")))
}

/// Appends entries to date-partitioned files under the store's `audit/` directory.
#[derive(Debug, Clone)]
pub struct FileAuditSink {
    audit_dir: PathBuf,
}

impl FileAuditSink {
    pub fn new(audit_dir: impl Into<PathBuf>) -> Self {
        Self {
            audit_dir: audit_dir.into(),
        }
    }
}

impl AuditSink for FileAuditSink {
    fn emit(&self, entry: &AuditEntry) -> Result<()> {
        let path = audit_file_path(&self.audit_dir, entry.ts.date_naive());

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                CheckoutError::Audit(format!(
                    "failed to create audit directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                CheckoutError::Audit(format!(
                    "failed to open audit file '{}': {}",
                    path.display(),
                    e
                ))
            })?;

        // One write per line so concurrent appenders never interleave mid-line.
        let line = format!("{}\n", entry.to_line());
        file.write_all(line.as_bytes()).map_err(|e| {
            CheckoutError::Audit(format!(
                "failed to write audit entry to '{}': {}",
                path.display(),
                e
            ))
        })?;

        file.sync_all().map_err(|e| {
            CheckoutError::Audit(format!(
                "failed to sync audit file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(())
    }
}

/// Discards every entry. Used when auditing is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn emit(&self, _entry: &AuditEntry) -> Result<()> {
        Ok(())
    }
}

/// Keeps entries in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_else(|poison| poison.into_inner().clone())
    }
}

impl AuditSink for MemoryAuditSink {
    fn emit(&self, entry: &AuditEntry) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| CheckoutError::Audit("audit buffer poisoned".to_string()))?
            .push(entry.clone());
        Ok(())
    }
}
