//! Store root resolution for acm-checkout.
//!
//! Every command locates its data through this module so that records, locks,
//! audit files and configuration always come from the same root:
//!
//! ```text
//! <root>/
//!   config.yaml
//!   records/   one JSON file per resource
//!   locks/     per-record write locks
//!   audit/     <YYYY>/<M>/<YYYY-MM-DD>.log
//! ```
//!
//! The root is `--root` when given, else `$ACM_CHECKOUT_ROOT`, else
//! `./.acm-checkout`.

use crate::audit::{AuditSink, FileAuditSink, NullAuditSink};
use crate::config::Config;
use crate::error::{CheckoutError, Result};
use crate::store::FileStore;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the store root.
pub const ROOT_ENV_VAR: &str = "ACM_CHECKOUT_ROOT";

/// Store root used when neither `--root` nor the environment names one.
pub const DEFAULT_ROOT: &str = ".acm-checkout";

/// Resolved paths for a checkout store.
#[derive(Debug, Clone)]
pub struct StoreContext {
    pub root: PathBuf,
    pub records_dir: PathBuf,
    pub locks_dir: PathBuf,
    pub audit_dir: PathBuf,
}

impl StoreContext {
    /// Resolve the store root from an explicit override, the environment, or
    /// the default relative to the working directory.
    pub fn resolve(root_override: Option<&Path>) -> Result<Self> {
        if let Some(root) = root_override {
            return Ok(Self::resolve_from(root));
        }

        if let Some(root) = env::var_os(ROOT_ENV_VAR).filter(|v| !v.is_empty()) {
            return Ok(Self::resolve_from(PathBuf::from(root)));
        }

        let cwd = env::current_dir().map_err(|e| {
            CheckoutError::UserError(format!("failed to get current working directory: {}", e))
        })?;
        Ok(Self::resolve_from(cwd.join(DEFAULT_ROOT)))
    }

    /// Lay out paths under a known root.
    pub fn resolve_from<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            records_dir: root.join("records"),
            locks_dir: root.join("locks"),
            audit_dir: root.join("audit"),
            root,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    /// Check if the store layout exists.
    pub fn store_exists(&self) -> bool {
        self.records_dir.is_dir() && self.locks_dir.is_dir()
    }

    /// Ensure the store is initialized, returning an error if not.
    ///
    /// Called by every command except `init`.
    pub fn ensure_initialized(&self) -> Result<()> {
        if !self.store_exists() {
            return Err(CheckoutError::UserError(format!(
                "checkout store not initialized.\n\
                 Expected store at: {}\n\n\
                 Run `acmco init` (or pass --root / set {}) first.",
                self.root.display(),
                ROOT_ENV_VAR
            )));
        }
        Ok(())
    }

    /// Create the store directories. Existing directories are left alone.
    pub fn create_layout(&self) -> Result<()> {
        for dir in [&self.root, &self.records_dir, &self.locks_dir, &self.audit_dir] {
            fs::create_dir_all(dir).map_err(|e| {
                CheckoutError::UserError(format!(
                    "failed to create directory '{}': {}",
                    dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Load `config.yaml`, or defaults when the store has none.
    pub fn load_config(&self) -> Result<Config> {
        Config::load_or_default(self.config_path())
    }

    /// The file-backed record store for this root.
    pub fn record_store(&self, config: &Config) -> FileStore {
        FileStore::new(&self.records_dir, &self.locks_dir).with_retry(config.lock_retry())
    }

    /// The audit sink for this root, honoring `audit_enabled`.
    pub fn audit_sink(&self, config: &Config) -> Box<dyn AuditSink> {
        if config.audit_enabled {
            Box::new(FileAuditSink::new(&self.audit_dir))
        } else {
            Box::new(NullAuditSink)
        }
    }
}
