//! Storage Adapters
//!
//! Implementations of the `RecordStore` trait.

#[cfg(feature = "locking")]
mod file;
mod memory;

#[cfg(feature = "locking")]
pub use file::FileRecordStore;
pub use memory::InMemoryRecordStore;
