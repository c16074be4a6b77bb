//! In-memory record store.

use super::expr::{Item, Mutation, Precondition};
use super::{PutOutcome, RecordStore};
use crate::error::{CheckoutError, Result};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// A `HashMap` behind a mutex; each conditional put runs entirely under the lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, Item>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an item unconditionally, replacing whatever was there.
    pub fn insert(&self, name: &str, item: Item) -> Result<()> {
        self.lock()?.insert(name.to_string(), item);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Item>>> {
        self.items
            .lock()
            .map_err(|_| CheckoutError::Store("in-memory store mutex poisoned".to_string()))
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, name: &str) -> Result<Option<Item>> {
        Ok(self.lock()?.get(name).cloned())
    }

    fn conditional_put(
        &self,
        name: &str,
        mutation: &Mutation,
        precondition: &Precondition,
    ) -> Result<PutOutcome> {
        let mut items = self.lock()?;

        if !precondition.holds(items.get(name)) {
            return Ok(PutOutcome::PreconditionFailed);
        }

        let item = items.entry(name.to_string()).or_default();
        mutation.apply(item);
        Ok(PutOutcome::Applied)
    }
}
