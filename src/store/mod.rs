//! Record store adapters.
//!
//! The checkout protocol needs exactly two operations from its store:
//!
//! - `get(name)`: the current item, or `None` if the resource is unregistered
//! - `conditional_put(name, mutation, precondition)`: apply the mutation iff the
//!   precondition holds on the stored item, atomically
//!
//! The protocol never holds a connection of its own; callers inject a store.
//! [`MemoryStore`] serves tests and embedding, [`FileStore`] is the on-disk
//! store used by the CLI.

pub mod expr;
mod file;
mod memory;


use crate::error::Result;

pub use expr::{Attribute, Condition, Item, Mutation, Precondition, Update};
pub use file::FileStore;
pub use memory::MemoryStore;

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The precondition held and the mutation was written.
    Applied,
    /// The stored item did not satisfy the precondition; nothing was written.
    PreconditionFailed,
}

/// Atomic get / conditional-put over named records.
///
/// Implementations must make `conditional_put` indivisible: no other write to
/// the same name may interleave between evaluating the precondition and
/// storing the mutated item. A put against an absent name starts from an
/// empty item.
pub trait RecordStore {
    fn get(&self, name: &str) -> Result<Option<Item>>;

    fn conditional_put(
        &self,
        name: &str,
        mutation: &Mutation,
        precondition: &Precondition,
    ) -> Result<PutOutcome>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn get(&self, name: &str) -> Result<Option<Item>> {
        (**self).get(name)
    }

    fn conditional_put(
        &self,
        name: &str,
        mutation: &Mutation,
        precondition: &Precondition,
    ) -> Result<PutOutcome> {
        (**self).conditional_put(name, mutation, precondition)
    }
}

impl<T: RecordStore + ?Sized> RecordStore for Box<T> {
    fn get(&self, name: &str) -> Result<Option<Item>> {
        (**self).get(name)
    }

    fn conditional_put(
        &self,
        name: &str,
        mutation: &Mutation,
        precondition: &Precondition,
    ) -> Result<PutOutcome> {
        (**self).conditional_put(name, mutation, precondition)
    }
}
