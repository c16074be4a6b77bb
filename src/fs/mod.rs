//! Filesystem utilities for acm-checkout.
//!
//! Atomic writes keep record files readable at every instant, even while a
//! conditional write is replacing them.

pub mod atomic;

pub use atomic::atomic_write;
