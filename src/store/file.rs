//! File-backed record store.
//!
//! One JSON file per resource under `records/`. Conditional writes hold the
//! record's lock file for the whole read-check-write sequence; plain reads go
//! straight to the file since every write is an atomic rename.

use super::expr::{Item, Mutation, Precondition};
use super::{PutOutcome, RecordStore};
use crate::error::{CheckoutError, Result};
use crate::fs::atomic_write;
use crate::locks::{self, LockRetry};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileStore {
    records_dir: PathBuf,
    locks_dir: PathBuf,
    retry: LockRetry,
}

impl FileStore {
    pub fn new(records_dir: impl Into<PathBuf>, locks_dir: impl Into<PathBuf>) -> Self {
        Self {
            records_dir: records_dir.into(),
            locks_dir: locks_dir.into(),
            retry: LockRetry::default(),
        }
    }

    pub fn with_retry(mut self, retry: LockRetry) -> Self {
        self.retry = retry;
        self
    }

    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    /// Path of the record file for `name`.
    pub fn record_path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\'])
        {
            return Err(CheckoutError::Store(format!(
                "'{}' cannot be used as a record file name",
                name
            )));
        }
        Ok(self.records_dir.join(format!("{}.json", name)))
    }

    fn read_item(&self, path: &Path) -> Result<Option<Item>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CheckoutError::Store(format!(
                    "failed to read record '{}': {}",
                    path.display(),
                    e
                )));
            }
        };

        serde_json::from_str(&content).map(Some).map_err(|e| {
            CheckoutError::Store(format!(
                "failed to parse record '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

impl RecordStore for FileStore {
    fn get(&self, name: &str) -> Result<Option<Item>> {
        let path = self.record_path(name)?;
        self.read_item(&path)
    }

    fn conditional_put(
        &self,
        name: &str,
        mutation: &Mutation,
        precondition: &Precondition,
    ) -> Result<PutOutcome> {
        let path = self.record_path(name)?;
        let _lock =
            locks::acquire_record_lock(&self.locks_dir, name, "conditional_put", &self.retry)?;

        let current = self.read_item(&path)?;
        if !precondition.holds(current.as_ref()) {
            return Ok(PutOutcome::PreconditionFailed);
        }

        let mut item = current.unwrap_or_default();
        mutation.apply(&mut item);

        let json = serde_json::to_string_pretty(&item).map_err(|e| {
            CheckoutError::Store(format!("failed to serialize record '{}': {}", name, e))
        })?;
        atomic_write(&path, json.as_bytes())?;

        Ok(PutOutcome::Applied)
    }
}
