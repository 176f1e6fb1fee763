//! # Outbound Ports (Driven Ports)
//!
//! Storage the allocation service requires from its host.
//!
//! Production: `FileRecordStore` (UTF-8 file + fs2 sidecar lock)
//! Testing: `InMemoryRecordStore`

use crate::domain::config::LockWait;
use crate::domain::errors::{LockError, StoreError, StoreKind};

/// A durable, ordered sequence of text records with an exclusive lock.
///
/// Both the pool and the assignment store are a `RecordStore`; the typed
/// views in `crate::stores` give the lines meaning.
pub trait RecordStore: Send + Sync {
    /// Scoped lock guard. Dropping it releases the lock.
    type Guard<'a>
    where
        Self: 'a;

    /// Which store this is, for error reporting.
    fn kind(&self) -> StoreKind;

    /// Current durable content, in order, without blank lines.
    ///
    /// A store that does not exist yet reads as empty.
    fn read_lines(&self) -> Result<Vec<String>, StoreError>;

    /// Durably append one line. Visible to the next `read_lines` call.
    fn append_line(&self, line: &str) -> Result<(), StoreError>;

    /// Replace the whole content in one all-or-nothing step.
    ///
    /// ## Atomicity
    ///
    /// A concurrent reader, or a crash mid-write, observes either the old or
    /// the new content in full. An empty slice leaves an empty store, not a
    /// missing one.
    fn write_all_atomic(&self, lines: &[String]) -> Result<(), StoreError>;

    /// Take the store's exclusive lock, waiting according to `wait`.
    ///
    /// The lock must be visible across processes for production adapters.
    fn lock_exclusive(&self, wait: LockWait) -> Result<Self::Guard<'_>, LockError>;
}
