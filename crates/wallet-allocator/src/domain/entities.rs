//! # Domain Entities
//!
//! Value types stored in, and derived from, the two record stores.

use serde::Serialize;

/// An unassigned wallet sitting in the pool.
///
/// Immutable once created. The `address` is unique across the pool and the
/// assignment store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct WalletRecord {
    pub address: String,
    pub seed: String,
}

impl WalletRecord {
    pub fn new(address: impl Into<String>, seed: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            seed: seed.into(),
        }
    }
}

/// A wallet bound to a user id.
///
/// Created exactly once per distinct `user_id`, from what was the head of the
/// pool at the moment of creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AssignmentRecord {
    pub user_id: String,
    pub address: String,
    pub seed: String,
}

impl AssignmentRecord {
    pub fn new(user_id: impl Into<String>, wallet: WalletRecord) -> Self {
        Self {
            user_id: user_id.into(),
            address: wallet.address,
            seed: wallet.seed,
        }
    }
}

/// Result of an `assign` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub address: String,
    pub seed: String,
    /// `false` when the user already held a wallet and nothing was consumed.
    pub newly_created: bool,
}

impl Assignment {
    pub(crate) fn existing(record: AssignmentRecord) -> Self {
        Self {
            address: record.address,
            seed: record.seed,
            newly_created: false,
        }
    }

    pub(crate) fn created(record: &AssignmentRecord) -> Self {
        Self {
            address: record.address.clone(),
            seed: record.seed.clone(),
            newly_created: true,
        }
    }
}

/// Admin listing filter for wallets.
#[derive(Debug, Clone, Default)]
pub struct WalletFilter {
    /// Case-insensitive substring match on the address.
    pub query: Option<String>,
    /// Exclude wallets that are already assigned.
    pub only_free: bool,
}

impl WalletFilter {
    pub(crate) fn matches(&self, address: &str) -> bool {
        match &self.query {
            Some(q) if !q.is_empty() => address.to_lowercase().contains(&q.to_lowercase()),
            _ => true,
        }
    }
}

/// Admin view of a wallet. Seeds are never part of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletView {
    pub address: String,
    pub assigned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_user_id: Option<String>,
}

/// Pool occupancy counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Wallets still in the pool.
    pub free: usize,
    /// Assignment records on disk.
    pub assigned: usize,
}
