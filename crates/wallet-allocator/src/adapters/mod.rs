//! # Adapters Module
//!
//! Implementations of the outbound ports.
//!
//! ## Modules
//!
//! - `lock`: Cross-process store locking (fs2 advisory lock on a sidecar file)
//! - `storage`: `RecordStore` implementations (file-backed and in-memory)

#[cfg(feature = "locking")]
pub mod lock;
pub mod storage;

#[cfg(feature = "locking")]
pub use lock::FileLock;
pub use storage::InMemoryRecordStore;
#[cfg(feature = "locking")]
pub use storage::FileRecordStore;
