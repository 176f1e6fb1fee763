//! # Administration
//!
//! Listing, replenishment and reconciliation for operators.

use std::collections::HashSet;

use super::*;
use crate::domain::codec;
use crate::domain::entities::{PoolStats, WalletFilter, WalletRecord, WalletView};
use crate::domain::errors::AllocationError;
use crate::domain::reconcile::{duplicate_user_ids, partition_pool, ReconcileReport};

impl<P, A> WalletAllocatorService<P, A>
where
    P: RecordStore,
    A: RecordStore,
{
    /// Free wallets in pool order, then assigned ones in assignment order.
    pub(crate) fn wallet_views(
        &self,
        filter: &WalletFilter,
    ) -> Result<Vec<WalletView>, AllocationError> {
        let assignments = self.assignments.load()?;
        let partition = partition_pool(self.pool.load()?, &assignments);

        let free = partition.free.into_iter().map(|w| WalletView {
            address: w.address,
            assigned: false,
            assigned_user_id: None,
        });

        let mut views: Vec<WalletView> = free.filter(|v| filter.matches(&v.address)).collect();
        if filter.only_free {
            return Ok(views);
        }

        let mut seen = HashSet::new();
        views.extend(
            assignments
                .into_iter()
                .filter(|r| filter.matches(&r.address) && seen.insert(r.address.clone()))
                .map(|r| WalletView {
                    address: r.address,
                    assigned: true,
                    assigned_user_id: Some(r.user_id),
                }),
        );
        Ok(views)
    }

    pub(crate) fn add_wallets(&self, wallets: Vec<WalletRecord>) -> Result<usize, AllocationError> {
        if wallets.is_empty() {
            return Err(AllocationError::EmptyBatch);
        }
        for wallet in &wallets {
            codec::validate_field(&wallet.address)
                .and_then(|()| codec::validate_field(&wallet.seed))
                .map_err(|reason| AllocationError::InvalidWallet { reason })?;
        }

        let _pool_guard = self.pool.lock(self.lock_wait)?;
        let _assignments_guard = self.assignments.lock(self.lock_wait)?;

        let mut pool = self.pool.load()?;
        let mut known: HashSet<String> = pool.iter().map(|w| w.address.clone()).collect();
        known.extend(self.assignments.load()?.into_iter().map(|r| r.address));

        for wallet in &wallets {
            if !known.insert(wallet.address.clone()) {
                return Err(AllocationError::DuplicateAddress {
                    address: wallet.address.clone(),
                });
            }
        }

        let added = wallets.len();
        pool.extend(wallets);
        self.pool.replace(&pool)?;

        tracing::info!(added, pool_size = pool.len(), "wallet pool replenished");
        Ok(added)
    }

    pub(crate) fn reconcile_stores(&self) -> Result<ReconcileReport, AllocationError> {
        let _pool_guard = self.pool.lock(self.lock_wait)?;
        let _assignments_guard = self.assignments.lock(self.lock_wait)?;

        let assignments = self.assignments.load()?;
        let pool = self.pool.load()?;
        let pool_before = pool.len();
        let partition = partition_pool(pool, &assignments);

        let report = ReconcileReport {
            pool_before,
            pool_after: partition.free.len(),
            removed_addresses: partition
                .already_assigned
                .iter()
                .map(|w| w.address.clone())
                .collect(),
            duplicate_user_ids: duplicate_user_ids(&assignments),
        };

        if !partition.already_assigned.is_empty() {
            self.pool.replace(&partition.free)?;
            tracing::warn!(
                removed = ?report.removed_addresses,
                "removed already-assigned wallets from the pool"
            );
        }
        if !report.duplicate_user_ids.is_empty() {
            tracing::warn!(
                users = ?report.duplicate_user_ids,
                "users with more than one assignment record"
            );
        }
        Ok(report)
    }

    pub(crate) fn pool_stats(&self) -> Result<PoolStats, AllocationError> {
        Ok(PoolStats {
            free: self.pool.load()?.len(),
            assigned: self.assignments.load()?.len(),
        })
    }
}
