//! Per-folder write exclusion via a sentinel lock file.

use crate::store::{StoreError, StoreResult};
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sentinel file guarding a folder against concurrent writers
pub const LOCK_FILE: &str = ".lock";

/// Exclusive write lock on an entity folder.
///
/// Acquired by atomically creating the sentinel file; `create_new` gives
/// single-winner semantics per path. The sentinel is removed when the guard
/// drops, so the lock is released even when the write fails mid-way. A
/// sentinel left behind by a crashed process must be removed manually; there
/// is no lease or expiry.
#[derive(Debug)]
pub struct WriteLock {
    path: PathBuf,
}

impl WriteLock {
    /// Acquire the lock for `dir`, failing immediately if it is already held.
    ///
    /// No retry, no backoff: callers that want to wait must do so themselves.
    pub fn acquire(dir: &Path) -> StoreResult<Self> {
        let path = dir.join(LOCK_FILE);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StoreError::WriteConflict {
                    dir: dir.to_path_buf(),
                    lock: path,
                });
            }
            Err(err) => return Err(StoreError::Io(err)),
        };

        // Owner pid + timestamp so a stale lock can be attributed by hand.
        let _ = writeln!(file, "{} {}", std::process::id(), Utc::now().to_rfc3339());

        Ok(Self { path })
    }

    /// Path of the sentinel file held by this guard.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
