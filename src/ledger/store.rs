use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::LedgerConfig;

use super::entry::{next_timestamp, HistoryEntry};
use super::error::{LedgerError, Result};
use super::lock::{parent_dir, LedgerLock};

/// Append-only, newest-first history ledger persisted as one JSON array
///
/// Every mutation rewrites the whole file through a temporary file and an
/// atomic rename, so readers never see a truncated array.
pub struct HistoryLedger {
    path: PathBuf,
    lock: LedgerLock,
}

impl HistoryLedger {
    /// Open the ledger, creating an empty one if the file does not exist
    ///
    /// An existing ledger is left untouched, so reopening is idempotent.
    pub fn open(config: &LedgerConfig) -> Result<Self> {
        let path = config.path.clone();
        info!("Opening history ledger at: {}", path.display());

        let ledger = Self {
            lock: LedgerLock::new(&path, config.lock_timeout()),
            path,
        };

        debug!(lock_path = %ledger.lock.lock_path().display(), "Using ledger lock file");
        {
            let _guard = ledger.lock.acquire()?;
            if !ledger.path.exists() {
                ledger.write_entries(&[])?;
                info!("Initialized empty history ledger");
            }
        }

        Ok(ledger)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Prepend a new entry stamped with the current time
    pub fn record(&self, filename: &str, action: &str) -> Result<HistoryEntry> {
        let _guard = self.lock.acquire()?;

        let mut entries = self.read_entries()?;
        let entry = HistoryEntry {
            filename: filename.to_string(),
            action: action.to_string(),
            timestamp: next_timestamp(entries.first()),
        };
        entries.insert(0, entry.clone());
        self.write_entries(&entries)?;

        info!(
            filename,
            action,
            timestamp = %entry.timestamp,
            total = entries.len(),
            "Recorded history entry"
        );
        Ok(entry)
    }

    /// Snapshot of all entries, newest first
    pub fn list(&self) -> Result<Vec<HistoryEntry>> {
        let _guard = self.lock.acquire()?;
        self.read_entries()
    }

    /// Most recent entry referencing `filename`
    pub fn find(&self, filename: &str) -> Result<Option<HistoryEntry>> {
        Ok(self
            .list()?
            .into_iter()
            .find(|entry| entry.filename == filename))
    }

    // Callers must hold the lock.
    fn read_entries(&self) -> Result<Vec<HistoryEntry>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "Ledger file missing, treating as empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        serde_json::from_slice(&bytes).map_err(|source| LedgerError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    // Callers must hold the lock.
    fn write_entries(&self, entries: &[HistoryEntry]) -> Result<()> {
        let mut tmp = tempfile::Builder::new()
            .prefix(".history-")
            .tempfile_in(parent_dir(&self.path))?;
        serde_json::to_writer_pretty(&mut tmp, entries)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!(entries = entries.len(), "Ledger written");
        Ok(())
    }
}
