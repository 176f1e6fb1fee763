//! # Typed Stores
//!
//! `PoolStore` and `AssignmentStore` give the raw lines of a `RecordStore`
//! their record type. Parsing is strict: one corrupt line fails the whole
//! read, since skipping it could change which pool record is first.

use crate::domain::codec;
use crate::domain::config::LockWait;
use crate::domain::entities::{AssignmentRecord, WalletRecord};
use crate::domain::errors::{AllocationError, MalformedRecord};
use crate::ports::outbound::RecordStore;

/// Decode every line, reporting the first corrupt one with its position.
fn decode_all<S, T>(
    store: &S,
    parse: fn(&str) -> Result<T, MalformedRecord>,
) -> Result<Vec<T>, AllocationError>
where
    S: RecordStore,
{
    store
        .read_lines()?
        .iter()
        .enumerate()
        .map(|(index, line)| {
            parse(line).map_err(|source| AllocationError::MalformedRecord {
                store: store.kind(),
                position: index + 1,
                source,
            })
        })
        .collect()
}

/// FIFO sequence of unassigned wallets.
#[derive(Debug)]
pub struct PoolStore<S> {
    inner: S,
}

impl<S: RecordStore> PoolStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Current pool, head first, read from durable storage.
    pub fn load(&self) -> Result<Vec<WalletRecord>, AllocationError> {
        decode_all(&self.inner, codec::parse_wallet)
    }

    /// Replace the pool in one atomic step.
    pub fn replace(&self, wallets: &[WalletRecord]) -> Result<(), AllocationError> {
        let lines: Vec<String> = wallets.iter().map(codec::encode_wallet).collect();
        self.inner.write_all_atomic(&lines)?;
        Ok(())
    }

    pub fn lock(&self, wait: LockWait) -> Result<S::Guard<'_>, AllocationError> {
        Ok(self.inner.lock_exclusive(wait)?)
    }
}

/// Append-only sequence of user assignments.
#[derive(Debug)]
pub struct AssignmentStore<S> {
    inner: S,
}

impl<S: RecordStore> AssignmentStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn load(&self) -> Result<Vec<AssignmentRecord>, AllocationError> {
        decode_all(&self.inner, codec::parse_assignment)
    }

    /// First assignment recorded for `user_id`.
    pub fn find(&self, user_id: &str) -> Result<Option<AssignmentRecord>, AllocationError> {
        Ok(find_user(self.load()?, user_id))
    }

    /// Durably append one assignment.
    pub fn append(&self, record: &AssignmentRecord) -> Result<(), AllocationError> {
        self.inner.append_line(&codec::encode_assignment(record))?;
        Ok(())
    }

    pub fn lock(&self, wait: LockWait) -> Result<S::Guard<'_>, AllocationError> {
        Ok(self.inner.lock_exclusive(wait)?)
    }
}

/// First record for `user_id` in store order.
pub(crate) fn find_user(
    records: Vec<AssignmentRecord>,
    user_id: &str,
) -> Option<AssignmentRecord> {
    records.into_iter().find(|r| r.user_id == user_id)
}
