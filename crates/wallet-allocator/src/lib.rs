//! # Wallet Allocator
//!
//! Hands out pre-generated wallets (address + seed phrase) from a finite pool,
//! exactly once per user, under concurrent requests from any number of
//! threads or processes.
//!
//! ## Allocation Flow
//!
//! ```text
//! assign(user) ──→ read Assignment Store ──hit──→ (address, seed, false)
//!                        │
//!                       miss
//!                        ↓
//!          lock Pool Store → lock Assignment Store
//!                        ↓
//!        re-read both stores, re-check user (race guard)
//!                        ↓
//!   pop pool head → append assignment → atomic pool rewrite
//!                        ↓
//!             unlock (drop) → (address, seed, true)
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Unique Address | No address appears twice across both stores (after reconciliation) |
//! | 2 | One Wallet Per User | A user id is assigned at most once |
//! | 3 | FIFO Pool | The earliest pool record is always consumed first |
//! | 4 | Atomic Rewrite | The pool file is replaced whole, never partially written |
//! | 5 | Append Before Shrink | An assignment is durable before the pool shrinks |
//! | 6 | Lock Ordering | Pool lock is always taken before the assignment lock |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Entities, record codec, errors, configuration
//! - `ports/` - Port traits (inbound API, outbound record store)
//! - `adapters/` - File and in-memory record stores, fs2 advisory lock
//! - `stores` - Typed pool/assignment views over a record store
//! - `service/` - Application service implementing the API
//!
//! ## Usage
//!
//! ```ignore
//! use wallet_allocator::{AllocatorConfig, WalletAllocatorApi, WalletAllocatorService};
//!
//! let service = WalletAllocatorService::from_config(&AllocatorConfig::from_env())?;
//! let assignment = service.assign("100")?;
//! println!("{}", assignment.address);
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;
pub mod stores;

// Re-export key types for convenience
pub use domain::config::{AllocatorConfig, ConfigError, LockWait};
pub use domain::entities::{
    Assignment, AssignmentRecord, PoolStats, WalletFilter, WalletRecord, WalletView,
};
pub use domain::errors::{AllocationError, LockError, MalformedRecord, StoreError, StoreKind};
pub use domain::reconcile::ReconcileReport;
pub use ports::inbound::WalletAllocatorApi;
pub use ports::outbound::RecordStore;
pub use service::{WalletAllocatorDependencies, WalletAllocatorService};

pub use adapters::storage::InMemoryRecordStore;
#[cfg(feature = "locking")]
pub use adapters::storage::FileRecordStore;
