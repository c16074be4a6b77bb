//! Per-record locks for the file-backed record store.
//!
//! The file store makes each conditional write indivisible by holding an
//! exclusive lock file for the record while it re-reads, checks the
//! precondition, and writes.
//!
//! Lock files live in `<root>/locks/<resource>.lock` and are created with
//! **create_new** semantics, so only one process can hold a given record lock
//! at a time. Each file is a JSON [`RecordLock`]:
//! - `resource`: the record being written
//! - `operation`: the store operation holding the lock
//! - `owner`: `user@HOST`
//! - `pid`: the holding process
//! - `acquired_at`: RFC3339 timestamp
//!
//! A [`HeldLock`] deletes its file when dropped. A lock left behind by a
//! crashed process shows up as STALE in `acmco lock list`.

mod operations;
mod record;
mod types;


pub use operations::{HeldLock, acquire_record_lock, clear_lock, list_locks, record_lock_path};
pub use record::RecordLock;
pub use types::{LockInfo, LockRetry};
