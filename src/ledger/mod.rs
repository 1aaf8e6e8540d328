/// JSON-file history ledger for generated artifacts
///
/// Every operation that writes an artifact to the output store records one
/// entry here. The ledger is a single pretty-printed JSON array, newest
/// entry first:
///
/// ```json
/// [
///   { "filename": "split_1_5.pdf", "action": "split", "timestamp": "2024-05-01T10:00:01.000002" },
///   { "filename": "merged_1700000000.pdf", "action": "merge", "timestamp": "2024-05-01T10:00:00.000001" }
/// ]
/// ```
///
/// ## Concurrency
///
/// `record` is a read-modify-write of the whole file. At most one cycle is
/// in flight per ledger file: threads sharing a handle are serialized by a
/// mutex, separate handles and processes by an advisory lock on
/// `<ledger>.lock`. Waiting longer than `lock_timeout_ms` yields
/// [`LedgerError::Busy`].
///
/// ## Usage
///
/// ```rust,ignore
/// use pdfdesk::config::LedgerConfig;
/// use pdfdesk::ledger::{actions, HistoryLedger};
///
/// let ledger = HistoryLedger::open(&LedgerConfig::new("saved_pdfs/history.json"))?;
/// ledger.record("merged_1700000000.pdf", actions::MERGE)?;
/// let entries = ledger.list()?;
/// ```

pub mod entry;
pub mod error;
mod lock;
pub mod store;

pub use entry::{actions, HistoryEntry};
pub use error::{LedgerError, Result};
pub use store::HistoryLedger;
