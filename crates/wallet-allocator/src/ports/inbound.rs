//! # Inbound Ports (Driving Ports)
//!
//! The API the request gateway and admin tooling call.

use crate::domain::entities::{
    Assignment, AssignmentRecord, PoolStats, WalletFilter, WalletRecord, WalletView,
};
use crate::domain::errors::AllocationError;
use crate::domain::reconcile::ReconcileReport;

/// Primary API of the wallet allocator.
///
/// Every operation may block on the store locks; do not call it while holding
/// an unrelated lock.
pub trait WalletAllocatorApi {
    /// Assign a wallet to `user_id`, or return the one already assigned.
    ///
    /// ## Idempotence
    ///
    /// A repeated call for the same user returns the same wallet with
    /// `newly_created = false` and consumes nothing.
    ///
    /// ## Errors
    ///
    /// - `InvalidUserId`: empty, padded, or contains `|` / a line break
    /// - `MalformedRecord`: a store line is corrupt
    /// - `PoolExhausted`: no free wallet; both stores unchanged
    /// - `LockAcquisition` / `LockTimeout`: contention, retryable
    /// - `StoreIo`: durable storage failed
    fn assign(&self, user_id: &str) -> Result<Assignment, AllocationError>;

    /// The assignment for `user_id`, if any. Never mutates.
    fn lookup(&self, user_id: &str) -> Result<Option<AssignmentRecord>, AllocationError>;

    /// All assignments in store order.
    fn list_assignments(&self) -> Result<Vec<AssignmentRecord>, AllocationError>;

    /// Free and assigned wallets matching `filter`, free ones first.
    fn list_wallets(&self, filter: &WalletFilter) -> Result<Vec<WalletView>, AllocationError>;

    /// Append wallets to the pool tail. Returns how many were added.
    ///
    /// ## Errors
    ///
    /// - `EmptyBatch`: nothing to add
    /// - `InvalidWallet`: a field cannot be stored safely
    /// - `DuplicateAddress`: address already in either store or in the batch
    fn replenish(&self, wallets: Vec<WalletRecord>) -> Result<usize, AllocationError>;

    /// Drop pool records whose address is already assigned.
    fn reconcile(&self) -> Result<ReconcileReport, AllocationError>;

    /// Pool occupancy counters.
    fn stats(&self) -> Result<PoolStats, AllocationError>;
}
