//! Directory-backed output store for generated artifacts
//!
//! Artifacts are keyed by a flat filename inside the configured root
//! directory. Writes go to a temporary file in the same directory and are
//! renamed into place, so a reader never observes a half-written artifact
//! under its final name.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::OutputStoreConfig;

/// Prefix of in-flight temporary files; never a valid artifact name
const TEMP_PREFIX: &str = ".tmp-";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid artifact name: {0:?}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Output store rooted at a single directory
#[derive(Debug, Clone)]
pub struct OutputStore {
    root: PathBuf,
}

impl OutputStore {
    pub fn new(config: &OutputStoreConfig) -> Self {
        Self {
            root: config.root_dir.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under `filename`, replacing any existing artifact
    ///
    /// The root directory is created if absent. Returns the final path.
    pub fn put(&self, bytes: &[u8], filename: &str) -> Result<PathBuf> {
        let path = self.resolve(filename)?;
        fs::create_dir_all(&self.root)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        info!(filename, size = bytes.len(), "Stored artifact");
        Ok(path)
    }

    /// Read an artifact in full; `None` when it does not exist
    pub fn get(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        let path = self.resolve(filename)?;
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(filename, size = bytes.len(), "Read artifact");
                Ok(Some(bytes))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Check if an artifact exists. Invalid names never exist.
    pub fn exists(&self, filename: &str) -> bool {
        self.resolve(filename)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    fn resolve(&self, filename: &str) -> Result<PathBuf> {
        validate_name(filename)?;
        Ok(self.root.join(filename))
    }
}

/// Suffix of the ledger's sidecar lock file, which may share the root
const LOCK_SUFFIX: &str = ".lock";

/// Artifact names are single, non-hidden path components
///
/// Hidden names cover this store's temp files and the ledger's. Lock files
/// are rejected so a ledger kept in the root is never served or clobbered.
fn validate_name(filename: &str) -> Result<()> {
    let invalid = filename.is_empty()
        || filename.starts_with('.')
        || filename.ends_with(LOCK_SUFFIX)
        || filename.contains(['/', '\\', '\0']);

    if invalid {
        return Err(StorageError::InvalidName(filename.to_string()));
    }
    Ok(())
}
