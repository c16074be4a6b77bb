use crate::audit::{AuditEntry, AuditSink};
use crate::context::StoreContext;
use crate::error::{CheckoutError, Result};
use crate::store::{Item, MemoryStore, Mutation, Precondition, PutOutcome, RecordStore};
use std::sync::Mutex;
use tempfile::TempDir;

/// A store whose every call fails.
pub(crate) struct FailingStore;

impl RecordStore for FailingStore {
    fn get(&self, _name: &str) -> Result<Option<Item>> {
        Err(CheckoutError::Store("connection refused".to_string()))
    }

    fn conditional_put(
        &self,
        _name: &str,
        _mutation: &Mutation,
        _precondition: &Precondition,
    ) -> Result<PutOutcome> {
        Err(CheckoutError::Store("connection refused".to_string()))
    }
}

/// An audit sink whose every emit fails.
pub(crate) struct FailingAuditSink;

impl AuditSink for FailingAuditSink {
    fn emit(&self, _entry: &AuditEntry) -> Result<()> {
        Err(CheckoutError::Audit("bucket unavailable".to_string()))
    }
}

/// A memory store that lets another actor sneak in one write between a
/// request's read and its conditional write.
pub(crate) struct InterceptingStore {
    inner: MemoryStore,
    interceptor: Mutex<Option<Mutation>>,
}

impl InterceptingStore {
    pub(crate) fn new(inner: MemoryStore, interceptor: Mutation) -> Self {
        Self {
            inner,
            interceptor: Mutex::new(Some(interceptor)),
        }
    }

    pub(crate) fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl RecordStore for InterceptingStore {
    fn get(&self, name: &str) -> Result<Option<Item>> {
        self.inner.get(name)
    }

    fn conditional_put(
        &self,
        name: &str,
        mutation: &Mutation,
        precondition: &Precondition,
    ) -> Result<PutOutcome> {
        let interceptor = self.interceptor.lock().unwrap().take();
        if let Some(interceptor) = interceptor {
            self.inner
                .conditional_put(name, &interceptor, &Precondition::none())?;
        }
        self.inner.conditional_put(name, mutation, precondition)
    }
}

/// An initialized store root in a temp directory.
pub(crate) fn create_test_store() -> (TempDir, StoreContext) {
    let temp_dir = TempDir::new().unwrap();
    let ctx = StoreContext::resolve_from(temp_dir.path().join("store"));
    ctx.create_layout().unwrap();
    (temp_dir, ctx)
}
