use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::domain::config::LockWait;
use crate::domain::errors::{LockError, StoreError, StoreKind};
use crate::ports::outbound::RecordStore;

/// In-memory record store for unit tests.
///
/// The lock is a process-local mutex, so this adapter only serializes threads.
/// Production uses `FileRecordStore`, whose lock is visible across processes.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    kind: StoreKind,
    lines: Mutex<Vec<String>>,
    lock: Mutex<()>,
    fail_appends: AtomicBool,
    fail_rewrites: AtomicBool,
}

impl InMemoryRecordStore {
    pub fn new(kind: StoreKind) -> Self {
        Self::with_lines(kind, Vec::<String>::new())
    }

    /// Seed the store with raw lines (blank ones included, as on disk).
    pub fn with_lines<I, S>(kind: StoreKind, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            lines: Mutex::new(lines.into_iter().map(Into::into).collect()),
            lock: Mutex::new(()),
            fail_appends: AtomicBool::new(false),
            fail_rewrites: AtomicBool::new(false),
        }
    }

    /// Raw content, exactly as stored.
    pub fn snapshot(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Make every following `append_line` fail without writing.
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Make every following `write_all_atomic` fail without writing,
    /// like a crash before the rename.
    pub fn fail_rewrites(&self, fail: bool) {
        self.fail_rewrites.store(fail, Ordering::SeqCst);
    }
}

impl RecordStore for InMemoryRecordStore {
    type Guard<'a> = MutexGuard<'a, ()>;

    fn kind(&self) -> StoreKind {
        self.kind
    }

    fn read_lines(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .lines
            .lock()
            .iter()
            .filter(|line| !line.trim().is_empty())
            .cloned()
            .collect())
    }

    fn append_line(&self, line: &str) -> Result<(), StoreError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Injected {
                kind: self.kind,
                op: "append",
                message: "append disabled".into(),
            });
        }
        self.lines.lock().push(line.to_string());
        Ok(())
    }

    fn write_all_atomic(&self, lines: &[String]) -> Result<(), StoreError> {
        if self.fail_rewrites.load(Ordering::SeqCst) {
            return Err(StoreError::Injected {
                kind: self.kind,
                op: "rewrite",
                message: "rewrite disabled".into(),
            });
        }
        *self.lines.lock() = lines.to_vec();
        Ok(())
    }

    fn lock_exclusive(&self, wait: LockWait) -> Result<Self::Guard<'_>, LockError> {
        match wait {
            LockWait::Blocking => Ok(self.lock.lock()),
            LockWait::FailFast => self.lock.try_lock().ok_or_else(|| LockError::Acquisition {
                kind: self.kind,
                reason: "held by another thread".into(),
            }),
            LockWait::Timeout(timeout) => {
                self.lock
                    .try_lock_for(timeout)
                    .ok_or(LockError::Timeout {
                        kind: self.kind,
                        waited: timeout,
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_in_memory_store_reads_skip_blanks() {
        let store = InMemoryRecordStore::with_lines(StoreKind::Pool, ["a|1", "", "  ", "b|2"]);
        assert_eq!(store.read_lines().unwrap(), vec!["a|1", "b|2"]);
        assert_eq!(store.snapshot().len(), 4);
    }

    #[test]
    fn test_in_memory_append_and_rewrite() {
        let store = InMemoryRecordStore::new(StoreKind::Assignments);
        store.append_line("1|a|s").unwrap();
        store.append_line("2|b|s").unwrap();
        assert_eq!(store.read_lines().unwrap().len(), 2);

        store.write_all_atomic(&[]).unwrap();
        assert!(store.read_lines().unwrap().is_empty());
    }

    #[test]
    fn test_injected_rewrite_failure_keeps_content() {
        let store = InMemoryRecordStore::with_lines(StoreKind::Pool, ["a|1"]);
        store.fail_rewrites(true);

        let err = store.write_all_atomic(&[]).unwrap_err();
        assert_eq!(err.kind(), StoreKind::Pool);
        assert_eq!(store.read_lines().unwrap(), vec!["a|1"]);
    }

    #[test]
    fn test_in_memory_lock_contention() {
        let store = InMemoryRecordStore::new(StoreKind::Pool);
        let _guard = store.lock_exclusive(LockWait::Blocking).unwrap();

        assert!(matches!(
            store.lock_exclusive(LockWait::FailFast),
            Err(LockError::Acquisition { .. })
        ));
        assert!(matches!(
            store.lock_exclusive(LockWait::Timeout(Duration::from_millis(20))),
            Err(LockError::Timeout { .. })
        ));
    }
}
