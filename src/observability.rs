//! In-process counters for artifact and ledger activity

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    artifacts_written: AtomicU64,
    entries_recorded: AtomicU64,
    operations_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifact_written(&self) {
        self.artifacts_written.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "artifacts_written", "Metric incremented");
    }

    pub fn entry_recorded(&self) {
        self.entries_recorded.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "entries_recorded", "Metric incremented");
    }

    pub fn operation_failed(&self) {
        self.operations_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "operations_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            artifacts_written: self.artifacts_written.load(Ordering::Relaxed),
            entries_recorded: self.entries_recorded.load(Ordering::Relaxed),
            operations_failed: self.operations_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub artifacts_written: u64,
    pub entries_recorded: u64,
    pub operations_failed: u64,
}
