//! # File Lock Implementation
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on Windows).
//!
//! The lock lives on a sidecar file next to the store. The store file itself is
//! replaced by rename on every pool rewrite, and a lock held on a replaced
//! inode would no longer exclude anyone.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::domain::config::LockWait;
use crate::domain::errors::{LockError, StoreKind};

/// First backoff delay when polling a held lock.
pub const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Backoff delay cap.
pub const MAX_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Exclusive advisory lock on a sidecar file.
///
/// Released on drop (RAII), including on every error path of the caller.
///
/// # Example
///
/// ```ignore
/// let lock = FileLock::acquire(Path::new("/data/wallet_pool.txt.lock"), StoreKind::Pool, LockWait::Blocking)?;
/// // Lock is held until `lock` goes out of scope
/// ```
#[derive(Debug)]
pub struct FileLock {
    /// The lock file handle (kept open to maintain the lock)
    file: File,
    /// Path to the lock file
    path: PathBuf,
    /// Store guarded by this lock
    kind: StoreKind,
}

impl FileLock {
    /// Acquire the lock at `path`, creating the file if needed.
    ///
    /// # Errors
    ///
    /// - `LockError::Acquisition` if the file cannot be opened or locked, or
    ///   if it is held elsewhere under `LockWait::FailFast`
    /// - `LockError::Timeout` if it is still held when the wait elapses
    pub fn acquire(path: &Path, kind: StoreKind, wait: LockWait) -> Result<Self, LockError> {
        // Never truncate or unlink: another process may hold a handle to this inode.
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| LockError::Acquisition {
                kind,
                reason: format!("cannot open lock file: {e}"),
            })?;

        match wait {
            LockWait::Blocking => {
                FileExt::lock_exclusive(&file).map_err(|e| LockError::Acquisition {
                    kind,
                    reason: e.to_string(),
                })?;
            }
            LockWait::FailFast => {
                if !Self::try_lock(&file, kind)? {
                    return Err(LockError::Acquisition {
                        kind,
                        reason: Self::held_by(path),
                    });
                }
            }
            LockWait::Timeout(timeout) => {
                let started = Instant::now();
                let deadline = started + timeout;
                let mut retry_delay = INITIAL_RETRY_DELAY;

                while !Self::try_lock(&file, kind)? {
                    let now = Instant::now();
                    if now >= deadline {
                        tracing::warn!(%kind, "{}; giving up after {:?}", Self::held_by(path), timeout);
                        return Err(LockError::Timeout {
                            kind,
                            waited: now - started,
                        });
                    }

                    // Retry with exponential backoff (capped, never past the deadline)
                    std::thread::sleep(retry_delay.min(deadline - now));
                    retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
                }
            }
        }

        let lock = Self {
            file,
            path: path.to_path_buf(),
            kind,
        };
        lock.record_pid();
        tracing::trace!(%kind, "store lock acquired");
        Ok(lock)
    }

    /// Non-blocking attempt. `Ok(false)` means another holder has it.
    fn try_lock(file: &File, kind: StoreKind) -> Result<bool, LockError> {
        match FileExt::try_lock_exclusive(file) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(false),
            Err(e) => Err(LockError::Acquisition {
                kind,
                reason: e.to_string(),
            }),
        }
    }

    /// Best-effort: write our PID so contention messages can name the holder.
    fn record_pid(&self) {
        let mut file = &self.file;
        let written = self
            .file
            .set_len(0)
            .and_then(|()| writeln!(file, "{}", std::process::id()));
        if let Err(e) = written {
            tracing::debug!(kind = %self.kind, "could not record lock holder pid: {e}");
        }
    }

    /// Describe the current holder, for error messages.
    fn held_by(path: &Path) -> String {
        match Self::read_holder_pid(path) {
            Some(pid) => format!("held by process {pid}"),
            None => "held by another process".to_string(),
        }
    }

    /// Read PID from the lock file (diagnostics only)
    fn read_holder_pid(path: &Path) -> Option<u32> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }

    /// Get the path to the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // The PID is left behind on purpose; the next holder overwrites it.
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(kind = %self.kind, "failed to release store lock: {e}");
        }
    }
}
