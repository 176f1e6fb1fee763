//! # Wallet Allocator Service
//!
//! The application service implementing `WalletAllocatorApi`.
//!
//! ## Architecture
//!
//! This service:
//! 1. Serves repeat requests from the assignment store without locking
//! 2. Takes the pool lock, then the assignment lock, for every mutation
//! 3. Re-reads both stores under the locks before deciding anything
//! 4. Uses dependency injection for both record stores

mod admin;
mod allocation;
mod api;

use crate::domain::config::LockWait;
use crate::ports::outbound::RecordStore;
use crate::stores::{AssignmentStore, PoolStore};

#[cfg(feature = "locking")]
use crate::adapters::storage::FileRecordStore;
#[cfg(feature = "locking")]
use crate::domain::config::AllocatorConfig;
#[cfg(feature = "locking")]
use crate::domain::errors::{AllocationError, StoreError, StoreKind};

/// The Wallet Allocator Service.
///
/// Holds no in-memory state besides its configuration: every decision is
/// made from what the stores contain at the time of the call.
#[derive(Debug)]
pub struct WalletAllocatorService<P, A>
where
    P: RecordStore,
    A: RecordStore,
{
    /// Ordered pool of unassigned wallets.
    pub(crate) pool: PoolStore<P>,
    /// Append-only user assignments.
    pub(crate) assignments: AssignmentStore<A>,
    /// Wait policy for both store locks.
    pub(crate) lock_wait: LockWait,
}

/// Dependencies for WalletAllocatorService
pub struct WalletAllocatorDependencies<P, A> {
    pub pool: P,
    pub assignments: A,
}

impl<P, A> WalletAllocatorService<P, A>
where
    P: RecordStore,
    A: RecordStore,
{
    pub fn new(deps: WalletAllocatorDependencies<P, A>, lock_wait: LockWait) -> Self {
        Self {
            pool: PoolStore::new(deps.pool),
            assignments: AssignmentStore::new(deps.assignments),
            lock_wait,
        }
    }

    pub fn pool_store(&self) -> &P {
        self.pool.inner()
    }

    pub fn assignment_store(&self) -> &A {
        self.assignments.inner()
    }
}

#[cfg(feature = "locking")]
impl WalletAllocatorService<FileRecordStore, FileRecordStore> {
    /// Build the file-backed service, creating the data directory if needed.
    ///
    /// The store files themselves are created lazily by the first write.
    pub fn from_config(config: &AllocatorConfig) -> Result<Self, AllocationError> {
        config.validate()?;
        std::fs::create_dir_all(&config.data_dir)
            .map_err(|e| StoreError::io(StoreKind::Pool, "create data directory", e))?;

        tracing::debug!(
            pool = %config.pool_path().display(),
            users = %config.users_path().display(),
            "opening file-backed wallet stores"
        );

        Ok(Self::new(
            WalletAllocatorDependencies {
                pool: FileRecordStore::new(config.pool_path(), StoreKind::Pool),
                assignments: FileRecordStore::new(config.users_path(), StoreKind::Assignments),
            },
            config.lock_wait,
        ))
    }
}
