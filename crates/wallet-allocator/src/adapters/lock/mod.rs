//! # Store Locking
//!
//! Serializes store mutation across threads and processes.
//!
//! ## Modules
//!
//! - `flock`: FileLock implementation using fs2

mod flock;

pub use flock::{FileLock, INITIAL_RETRY_DELAY, MAX_RETRY_DELAY};
