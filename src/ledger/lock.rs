use std::ffi::OsString;
use std::fs::{self, File, OpenOptions, TryLockError};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, warn};

use super::error::{LedgerError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Mutual exclusion for one ledger file
///
/// Two layers: an in-process mutex serializes threads sharing a handle, and
/// an advisory lock on a sidecar `<ledger>.lock` file serializes separate
/// handles and processes. The ledger file itself cannot carry the OS lock
/// because every write replaces it by rename.
pub(crate) struct LedgerLock {
    local: Mutex<()>,
    lock_path: PathBuf,
    timeout: Duration,
}

/// Held for the duration of one read or read-modify-write cycle
pub(crate) struct LedgerGuard<'a> {
    _local: MutexGuard<'a, ()>,
    file: File,
}

impl LedgerLock {
    pub fn new(ledger_path: &Path, timeout: Duration) -> Self {
        Self {
            local: Mutex::new(()),
            lock_path: sidecar_path(ledger_path),
            timeout,
        }
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Block until both layers are held or `timeout` elapses
    pub fn acquire(&self) -> Result<LedgerGuard<'_>> {
        let started = Instant::now();

        let local = self.local.try_lock_for(self.timeout).ok_or_else(|| {
            warn!(timeout = ?self.timeout, "Timed out waiting for in-process ledger lock");
            LedgerError::Busy(self.timeout)
        })?;

        // The directory may have been removed since the ledger was opened.
        fs::create_dir_all(parent_dir(&self.lock_path))?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;

        loop {
            match file.try_lock() {
                Ok(()) => break,
                Err(TryLockError::WouldBlock) => {
                    if started.elapsed() >= self.timeout {
                        warn!(
                            lock_path = %self.lock_path.display(),
                            timeout = ?self.timeout,
                            "Timed out waiting for ledger file lock"
                        );
                        return Err(LedgerError::Busy(self.timeout));
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(TryLockError::Error(err)) => return Err(err.into()),
            }
        }

        debug!(waited = ?started.elapsed(), "Ledger lock acquired");
        Ok(LedgerGuard {
            _local: local,
            file,
        })
    }
}

impl Drop for LedgerGuard<'_> {
    fn drop(&mut self) {
        // Closing the handle releases the lock as well
        if let Err(err) = self.file.unlock() {
            warn!(error = %err, "Failed to release ledger file lock");
        }
    }
}

/// Directory holding `path`; `.` for a bare file name
pub(super) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn sidecar_path(ledger_path: &Path) -> PathBuf {
    let mut name: OsString = ledger_path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    ledger_path.with_file_name(name)
}
