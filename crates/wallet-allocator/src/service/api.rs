//! # Wallet Allocator API Implementation

use super::*;
use crate::domain::entities::{
    Assignment, AssignmentRecord, PoolStats, WalletFilter, WalletRecord, WalletView,
};
use crate::domain::errors::AllocationError;
use crate::domain::reconcile::ReconcileReport;
use crate::ports::inbound::WalletAllocatorApi;

impl<P, A> WalletAllocatorApi for WalletAllocatorService<P, A>
where
    P: RecordStore,
    A: RecordStore,
{
    fn assign(&self, user_id: &str) -> Result<Assignment, AllocationError> {
        self.allocate(user_id)
    }

    fn lookup(&self, user_id: &str) -> Result<Option<AssignmentRecord>, AllocationError> {
        Self::validate_user_id(user_id)?;
        self.assignments.find(user_id)
    }

    fn list_assignments(&self) -> Result<Vec<AssignmentRecord>, AllocationError> {
        self.assignments.load()
    }

    fn list_wallets(&self, filter: &WalletFilter) -> Result<Vec<WalletView>, AllocationError> {
        self.wallet_views(filter)
    }

    fn replenish(&self, wallets: Vec<WalletRecord>) -> Result<usize, AllocationError> {
        self.add_wallets(wallets)
    }

    fn reconcile(&self) -> Result<ReconcileReport, AllocationError> {
        self.reconcile_stores()
    }

    fn stats(&self) -> Result<PoolStats, AllocationError> {
        self.pool_stats()
    }
}
