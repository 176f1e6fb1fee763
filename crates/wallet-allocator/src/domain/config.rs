//! # Allocator Configuration
//!
//! Store locations and the lock wait policy.
//!
//! ## Environment
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `WALLET_DATA_DIR` | `.` | Directory holding both stores |
//! | `WALLET_POOL_FILE` | `wallet_pool.txt` | Pool store file name |
//! | `WALLET_USERS_FILE` | `users.txt` | Assignment store file name |
//! | `WALLET_LOCK_TIMEOUT_MS` | `30000` | `0` = fail fast, `block` = wait forever |

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Default wait for a store lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(30);

/// Suffix of the sidecar file that carries a store's lock.
pub const LOCK_SUFFIX: &str = ".lock";

/// Sidecar lock path for the store at `store`.
pub fn lock_path_for(store: &Path) -> PathBuf {
    let mut name = store.as_os_str().to_owned();
    name.push(LOCK_SUFFIX);
    PathBuf::from(name)
}

/// How long `assign` may wait for a store lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockWait {
    /// Block until the lock is granted.
    Blocking,
    /// Try once and fail if the lock is held.
    FailFast,
    /// Retry with backoff until the duration elapses.
    Timeout(Duration),
}

impl Default for LockWait {
    fn default() -> Self {
        LockWait::Timeout(DEFAULT_LOCK_TIMEOUT)
    }
}

impl LockWait {
    /// Parse the `WALLET_LOCK_TIMEOUT_MS` format.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("block") {
            return Some(LockWait::Blocking);
        }
        match value.parse::<u64>().ok()? {
            0 => Some(LockWait::FailFast),
            ms => Some(LockWait::Timeout(Duration::from_millis(ms))),
        }
    }
}

/// Configuration for the file-backed allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatorConfig {
    /// Directory holding both stores.
    pub data_dir: PathBuf,
    /// Pool store file name, relative to `data_dir`.
    pub pool_file: PathBuf,
    /// Assignment store file name, relative to `data_dir`.
    pub users_file: PathBuf,
    /// Lock wait policy applied to both stores.
    pub lock_wait: LockWait,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            pool_file: PathBuf::from("wallet_pool.txt"),
            users_file: PathBuf::from("users.txt"),
            lock_wait: LockWait::default(),
        }
    }
}

impl AllocatorConfig {
    /// Defaults overridden by `WALLET_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("WALLET_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("WALLET_POOL_FILE") {
            config.pool_file = PathBuf::from(file);
        }
        if let Some(file) = lookup("WALLET_USERS_FILE") {
            config.users_file = PathBuf::from(file);
        }
        if let Some(raw) = lookup("WALLET_LOCK_TIMEOUT_MS") {
            match LockWait::parse(&raw) {
                Some(wait) => config.lock_wait = wait,
                None => tracing::warn!(
                    "WALLET_LOCK_TIMEOUT_MS must be milliseconds or \"block\", keeping default"
                ),
            }
        }

        config
    }

    pub fn pool_path(&self) -> PathBuf {
        self.data_dir.join(&self.pool_file)
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_file)
    }

    /// Reject configurations where two of the four files (both stores and
    /// their lock sidecars) coincide.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_file.as_os_str().is_empty() || self.users_file.as_os_str().is_empty() {
            return Err(ConfigError::EmptyFileName);
        }
        let pool = self.pool_path();
        let users = self.users_path();
        if pool == users {
            return Err(ConfigError::SharedStoreFile);
        }
        // Locking would truncate the other store to write a pid into it
        if pool == lock_path_for(&users) || users == lock_path_for(&pool) {
            return Err(ConfigError::StoreIsLockFile);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("pool and assignment stores must be different files")]
    SharedStoreFile,

    #[error("store file names cannot be empty")]
    EmptyFileName,

    #[error("a store file cannot be the other store's lock file")]
    StoreIsLockFile,
}
