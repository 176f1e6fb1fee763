//! # Domain Errors
//!
//! Error types for the wallet allocator.
//!
//! ## Design Principles
//!
//! - Each error maps to one failure mode of the allocation protocol
//! - Messages name the store and record position, never a file path or the line
//!   content (store lines carry seed phrases)
//! - No panics in domain logic (use Result instead)

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

use super::config::ConfigError;

/// Which of the two stores an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    Pool,
    Assignments,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Pool => write!(f, "pool store"),
            StoreKind::Assignments => write!(f, "assignment store"),
        }
    }
}

/// A stored line that does not decode into the expected record shape.
///
/// `line` keeps the offending text for operators; it is deliberately absent
/// from the Display output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected} fields, found {found}")]
pub struct MalformedRecord {
    pub line: String,
    pub expected: usize,
    pub found: usize,
}

/// Failures of the underlying durable storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} I/O error during {op}: {source}")]
    Io {
        kind: StoreKind,
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// Fault injected by a test adapter.
    #[error("{kind} {op} failed: {message}")]
    Injected {
        kind: StoreKind,
        op: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn io(kind: StoreKind, op: &'static str, source: io::Error) -> Self {
        StoreError::Io { kind, op, source }
    }

    pub fn kind(&self) -> StoreKind {
        match self {
            StoreError::Io { kind, .. } | StoreError::Injected { kind, .. } => *kind,
        }
    }
}

/// Failures to take a store's exclusive lock.
#[derive(Debug, Error)]
pub enum LockError {
    /// The lock could not be taken (I/O failure, or held elsewhere under fail-fast).
    #[error("{kind} lock unavailable: {reason}")]
    Acquisition { kind: StoreKind, reason: String },

    /// The configured wait elapsed while another holder kept the lock.
    #[error("{kind} lock not acquired within {waited:?}")]
    Timeout { kind: StoreKind, waited: Duration },
}

/// Errors surfaced by the allocation engine.
///
/// All of them propagate to the immediate caller; the engine never retries.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// A stored line is corrupt. Not retried; needs an operator.
    #[error("malformed {store} record #{position}: {source}")]
    MalformedRecord {
        store: StoreKind,
        /// 1-based position among the store's non-blank lines.
        position: usize,
        #[source]
        source: MalformedRecord,
    },

    /// No free wallets remain.
    #[error("wallet pool is exhausted")]
    PoolExhausted,

    /// The store lock could not be taken.
    #[error("lock acquisition failed: {0}")]
    LockAcquisition(#[source] LockError),

    /// The store lock was not granted within the configured wait.
    #[error("lock timeout: {0}")]
    LockTimeout(#[source] LockError),

    /// Durable storage failed; no partial write is visible.
    #[error("store I/O failed: {0}")]
    StoreIo(#[from] StoreError),

    /// The user id cannot be stored safely.
    #[error("invalid user id: {reason}")]
    InvalidUserId { reason: &'static str },

    /// A wallet to be added cannot be stored safely.
    #[error("invalid wallet record: {reason}")]
    InvalidWallet { reason: &'static str },

    /// Replenishment with nothing to add.
    #[error("no wallets supplied")]
    EmptyBatch,

    /// Replenishment would break address uniqueness.
    #[error("wallet address already present: {address}")]
    DuplicateAddress { address: String },

    /// The store layout cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl AllocationError {
    /// Whether a caller may retry (with backoff) and expect a different outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AllocationError::LockAcquisition(_) | AllocationError::LockTimeout(_)
        )
    }
}

impl From<LockError> for AllocationError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Timeout { .. } => AllocationError::LockTimeout(err),
            LockError::Acquisition { .. } => AllocationError::LockAcquisition(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display_hides_line_content() {
        let err = AllocationError::MalformedRecord {
            store: StoreKind::Pool,
            position: 3,
            source: MalformedRecord {
                line: "secret seed words".into(),
                expected: 2,
                found: 1,
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("pool store"));
        assert!(msg.contains("record #3"));
        assert!(!msg.contains("secret"));
    }

    #[test]
    fn test_lock_error_conversion() {
        let timeout: AllocationError = LockError::Timeout {
            kind: StoreKind::Assignments,
            waited: Duration::from_millis(10),
        }
        .into();
        assert!(matches!(timeout, AllocationError::LockTimeout(_)));
        assert!(timeout.is_retryable());

        let busy: AllocationError = LockError::Acquisition {
            kind: StoreKind::Pool,
            reason: "held".into(),
        }
        .into();
        assert!(matches!(busy, AllocationError::LockAcquisition(_)));
        assert!(busy.is_retryable());
    }

    #[test]
    fn test_definitive_errors_not_retryable() {
        assert!(!AllocationError::PoolExhausted.is_retryable());
        let io = StoreError::io(
            StoreKind::Pool,
            "rename",
            io::Error::new(io::ErrorKind::Other, "disk failure"),
        );
        assert_eq!(io.kind(), StoreKind::Pool);
        let err: AllocationError = io.into();
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("disk failure"));
    }
}
