//! Operation pipeline: produce bytes, persist them, record the action
//!
//! Each public method runs one PDF operation, writes the result to the
//! [`OutputStore`] under a freshly generated filename and records it in the
//! [`HistoryLedger`]. Every call blocks (PDF work, file I/O, lock waits);
//! async callers should use `spawn_blocking`.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::ledger::{actions, HistoryEntry, HistoryLedger, LedgerError};
use crate::observability::Metrics;
use crate::pdf::{DocumentMetadata, PageRange, PdfError, PdfOperations};
use crate::storage::{OutputStore, StorageError};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

/// A persisted and recorded operation result
#[derive(Debug, Clone)]
pub struct Artifact {
    pub entry: HistoryEntry,
    pub path: PathBuf,
    pub size: usize,
}

pub struct Workflow {
    store: OutputStore,
    ledger: HistoryLedger,
    pdf: Arc<dyn PdfOperations>,
    metrics: Arc<Metrics>,
}

impl Workflow {
    pub fn new(
        store: OutputStore,
        ledger: HistoryLedger,
        pdf: Arc<dyn PdfOperations>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            ledger,
            pdf,
            metrics,
        }
    }

    /// Open the store and ledger described by `config`
    pub fn open(config: &Config, pdf: Arc<dyn PdfOperations>) -> Result<Self> {
        let store = OutputStore::new(&config.storage);
        let ledger = HistoryLedger::open(&config.ledger)?;
        Ok(Self::new(store, ledger, pdf, Arc::new(Metrics::new())))
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn merge(&self, documents: &[Vec<u8>]) -> Result<Artifact> {
        self.run(actions::MERGE, "merged", |pdf| pdf.combine(documents))
    }

    pub fn split(&self, document: &[u8], range: PageRange) -> Result<Artifact> {
        let prefix = format!("split_{}_{}", range.start(), range.end());
        self.run(actions::SPLIT, &prefix, |pdf| pdf.extract(document, range))
    }

    /// Keep the pages at the 0-based indices of `order`, in that order
    pub fn reorder(&self, document: &[u8], order: &[u32]) -> Result<Artifact> {
        self.run(actions::REORDER, "reordered", |pdf| pdf.reorder(document, order))
    }

    pub fn update_metadata(
        &self,
        document: &[u8],
        metadata: &DocumentMetadata,
    ) -> Result<Artifact> {
        self.run(actions::METADATA, "metadata_updated", |pdf| {
            pdf.set_metadata(document, metadata)
        })
    }

    pub fn merge_images(&self, images: &[Vec<u8>]) -> Result<Artifact> {
        self.run(actions::IMAGES_MERGE, "images_merged", |pdf| {
            pdf.images_to_pdf(images)
        })
    }

    pub fn encrypt(&self, document: &[u8], passphrase: &str) -> Result<Artifact> {
        self.run(actions::ENCRYPT, "encrypted", |pdf| {
            pdf.encrypt(document, passphrase)
        })
    }

    /// All recorded operations, newest first
    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.ledger.list()?)
    }

    /// Artifact bytes; `None` if the file is gone (e.g. removed out of band)
    pub fn artifact(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.store.get(filename)?)
    }

    fn run<F>(&self, action: &str, prefix: &str, produce: F) -> Result<Artifact>
    where
        F: FnOnce(&dyn PdfOperations) -> crate::pdf::Result<Vec<u8>>,
    {
        let result = produce(self.pdf.as_ref())
            .map_err(WorkflowError::from)
            .and_then(|bytes| self.persist(&bytes, prefix, action));

        if let Err(err) = &result {
            self.metrics.operation_failed();
            warn!(action, error = %err, "Operation failed");
        }
        result
    }

    fn persist(&self, bytes: &[u8], prefix: &str, action: &str) -> Result<Artifact> {
        let filename = artifact_name(prefix);

        let path = self.store.put(bytes, &filename)?;
        self.metrics.artifact_written();

        let entry = self.ledger.record(&filename, action)?;
        self.metrics.entry_recorded();

        info!(filename, action, size = bytes.len(), "Artifact created");
        Ok(Artifact {
            entry,
            path,
            size: bytes.len(),
        })
    }
}

/// `{prefix}_{unix seconds}_{12 random hex}.pdf`
pub fn artifact_name(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}_{}.pdf", Utc::now().timestamp(), &suffix[..12])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LedgerConfig, OutputStoreConfig};
    use crate::pdf::testing::{page_labels, sample_pdf};
    use crate::pdf::LopdfBackend;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn create_test_workflow() -> (Workflow, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("saved_pdfs");
        let store = OutputStore::new(&OutputStoreConfig::new(&root));
        let ledger = HistoryLedger::open(&LedgerConfig::new(root.join("history.json"))).unwrap();
        let workflow = Workflow::new(
            store,
            ledger,
            Arc::new(LopdfBackend::new()),
            Arc::new(Metrics::new()),
        );
        (workflow, temp_dir)
    }

    #[test]
    fn test_artifact_name_shape() {
        let name = artifact_name("merged");

        assert!(name.starts_with("merged_"));
        assert!(name.ends_with(".pdf"));
        let parts: Vec<&str> = name.trim_end_matches(".pdf").split('_').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 12);
    }

    #[test]
    fn test_artifact_names_unique() {
        let names: HashSet<String> = (0..100).map(|_| artifact_name("split_1_5")).collect();
        assert_eq!(names.len(), 100);
    }

    #[test]
    fn test_merge_persists_and_records() {
        let (workflow, _temp) = create_test_workflow();

        let artifact = workflow.merge(&[sample_pdf(1), sample_pdf(2)]).unwrap();

        assert_eq!(artifact.entry.action, "merge");
        assert!(artifact.entry.filename.starts_with("merged_"));
        let stored = workflow.artifact(&artifact.entry.filename).unwrap().unwrap();
        assert_eq!(stored.len(), artifact.size);
        assert_eq!(page_labels(&stored), vec![1, 1, 2]);
        assert_eq!(workflow.history().unwrap(), vec![artifact.entry]);
    }

    #[test]
    fn test_history_newest_first_across_operations() {
        let (workflow, _temp) = create_test_workflow();

        workflow.merge(&[sample_pdf(2)]).unwrap();
        workflow
            .split(&sample_pdf(6), PageRange::new(1, 5).unwrap())
            .unwrap();
        workflow.reorder(&sample_pdf(3), &[2, 1, 0]).unwrap();

        let actions: Vec<String> = workflow
            .history()
            .unwrap()
            .into_iter()
            .map(|entry| entry.action)
            .collect();
        assert_eq!(actions, vec!["reorder", "split", "merge"]);
    }

    #[test]
    fn test_split_filename_embeds_range() {
        let (workflow, _temp) = create_test_workflow();

        let artifact = workflow
            .split(&sample_pdf(6), PageRange::new(2, 3).unwrap())
            .unwrap();

        assert!(artifact.entry.filename.starts_with("split_2_3_"));
    }

    #[test]
    fn test_failed_operation_records_nothing() {
        let (workflow, _temp) = create_test_workflow();

        let result = workflow.split(&sample_pdf(2), PageRange::new(1, 5).unwrap());

        assert!(matches!(
            result,
            Err(WorkflowError::Pdf(PdfError::InvalidRange { .. }))
        ));
        assert!(workflow.history().unwrap().is_empty());
        assert_eq!(workflow.metrics().snapshot().operations_failed, 1);
        assert_eq!(workflow.metrics().snapshot().artifacts_written, 0);
    }

    #[test]
    fn test_encrypt_persists_and_records() {
        let (workflow, _temp) = create_test_workflow();

        let artifact = workflow.encrypt(&sample_pdf(2), "secret").unwrap();

        assert_eq!(artifact.entry.action, "encrypt");
        assert!(artifact.entry.filename.starts_with("encrypted_"));
        let stored = workflow.artifact(&artifact.entry.filename).unwrap().unwrap();
        let doc = lopdf::Document::load_mem(&stored).unwrap();
        assert!(doc.is_encrypted());
        assert!(doc.authenticate_password("secret").is_ok());
        assert_eq!(workflow.history().unwrap(), vec![artifact.entry]);
    }

    #[test]
    fn test_encrypt_empty_passphrase_records_nothing() {
        let (workflow, _temp) = create_test_workflow();

        let result = workflow.encrypt(&sample_pdf(1), "");

        assert!(matches!(
            result,
            Err(WorkflowError::Pdf(PdfError::EmptyPassphrase))
        ));
        assert!(workflow.history().unwrap().is_empty());
    }

    #[test]
    fn test_stale_entry_reads_as_unavailable() {
        let (workflow, _temp) = create_test_workflow();
        let artifact = workflow.merge(&[sample_pdf(1)]).unwrap();

        std::fs::remove_file(&artifact.path).unwrap();

        assert_eq!(workflow.history().unwrap().len(), 1);
        assert!(workflow.artifact(&artifact.entry.filename).unwrap().is_none());
    }

    #[test]
    fn test_metrics_count_successes() {
        let (workflow, _temp) = create_test_workflow();

        workflow.merge(&[sample_pdf(1)]).unwrap();
        workflow
            .update_metadata(
                &sample_pdf(1),
                &DocumentMetadata {
                    author: Some("Ada".to_string()),
                    title: None,
                },
            )
            .unwrap();

        let snapshot = workflow.metrics().snapshot();
        assert_eq!(snapshot.artifacts_written, 2);
        assert_eq!(snapshot.entries_recorded, 2);
        assert_eq!(snapshot.operations_failed, 0);
    }
}
