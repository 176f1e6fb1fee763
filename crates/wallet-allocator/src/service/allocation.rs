//! # Allocation
//!
//! The `assign` protocol: lock-free fast path, then the locked section.

use super::*;
use crate::domain::codec;
use crate::domain::entities::{Assignment, AssignmentRecord};
use crate::domain::errors::AllocationError;
use crate::domain::reconcile::{partition_pool, PoolPartition};

impl<P, A> WalletAllocatorService<P, A>
where
    P: RecordStore,
    A: RecordStore,
{
    pub(crate) fn validate_user_id(user_id: &str) -> Result<(), AllocationError> {
        codec::validate_field(user_id).map_err(|reason| AllocationError::InvalidUserId { reason })
    }

    pub(crate) fn allocate(&self, user_id: &str) -> Result<Assignment, AllocationError> {
        Self::validate_user_id(user_id)?;

        // Fast path: atomic rewrites and whole-line appends make an unlocked
        // read safe, and an assignment is never removed once written.
        if let Some(existing) = self.assignments.find(user_id)? {
            tracing::debug!(user_id, address = %existing.address, "returning existing wallet");
            return Ok(Assignment::existing(existing));
        }

        self.allocate_locked(user_id)
    }

    /// Everything after the fast path. Both locks are held until return.
    pub(crate) fn allocate_locked(&self, user_id: &str) -> Result<Assignment, AllocationError> {
        // Lock order is fixed: pool, then assignments.
        let _pool_guard = self.pool.lock(self.lock_wait)?;
        let _assignments_guard = self.assignments.lock(self.lock_wait)?;

        let assignments = self.assignments.load()?;
        if let Some(existing) = assignments.iter().find(|r| r.user_id == user_id) {
            tracing::debug!(user_id, "wallet assigned by a concurrent request");
            return Ok(Assignment::existing(existing.clone()));
        }

        let PoolPartition {
            free,
            already_assigned,
        } = partition_pool(self.pool.load()?, &assignments);
        if !already_assigned.is_empty() {
            let skipped: Vec<&str> = already_assigned.iter().map(|w| w.address.as_str()).collect();
            tracing::warn!(
                ?skipped,
                "pool records already assigned (interrupted allocation), dropping them"
            );
        }

        let mut free = free.into_iter();
        let Some(wallet) = free.next() else {
            tracing::warn!(user_id, "wallet pool is exhausted");
            return Err(AllocationError::PoolExhausted);
        };
        let remaining: Vec<_> = free.collect();

        // The assignment must be durable before the wallet leaves the pool.
        let record = AssignmentRecord::new(user_id, wallet);
        self.assignments.append(&record)?;
        self.pool.replace(&remaining)?;

        tracing::info!(
            user_id,
            address = %record.address,
            remaining = remaining.len(),
            "wallet assigned"
        );
        Ok(Assignment::created(&record))
    }
}
