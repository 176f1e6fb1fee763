//! # Pool Reconciliation
//!
//! Assignments are appended before the pool is rewritten. A crash between the
//! two steps leaves a wallet in both stores. This module finds such overlaps
//! so they can be dropped from the pool before the wallet is handed out again.
//!
//! ## Algorithm
//!
//! 1. Collect every assigned address
//! 2. Partition the pool into still-free and already-assigned records,
//!    preserving pool order for the free ones
//! 3. Report user ids that appear more than once in the assignment store

use std::collections::HashSet;

use serde::Serialize;

use super::entities::{AssignmentRecord, WalletRecord};

/// Result of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Pool size before reconciliation.
    pub pool_before: usize,
    /// Pool size after reconciliation.
    pub pool_after: usize,
    /// Addresses removed from the pool because they were already assigned.
    pub removed_addresses: Vec<String>,
    /// User ids with more than one assignment record (first one wins).
    pub duplicate_user_ids: Vec<String>,
}

impl ReconcileReport {
    /// Whether the stores were already consistent.
    pub fn is_clean(&self) -> bool {
        self.removed_addresses.is_empty() && self.duplicate_user_ids.is_empty()
    }
}

/// Pool split into free records and records already present in assignments.
#[derive(Debug, Default)]
pub struct PoolPartition {
    pub free: Vec<WalletRecord>,
    pub already_assigned: Vec<WalletRecord>,
}

/// Split `pool` against the addresses in `assignments`, keeping FIFO order.
pub fn partition_pool(pool: Vec<WalletRecord>, assignments: &[AssignmentRecord]) -> PoolPartition {
    let assigned: HashSet<&str> = assignments.iter().map(|a| a.address.as_str()).collect();
    let mut partition = PoolPartition::default();
    for wallet in pool {
        if assigned.contains(wallet.address.as_str()) {
            partition.already_assigned.push(wallet);
        } else {
            partition.free.push(wallet);
        }
    }
    partition
}

/// User ids that occur more than once, in first-seen order.
pub fn duplicate_user_ids(assignments: &[AssignmentRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for record in assignments {
        if !seen.insert(record.user_id.as_str()) && reported.insert(record.user_id.as_str()) {
            duplicates.push(record.user_id.clone());
        }
    }
    duplicates
}
