//! Concurrent writers against one ledger file, with one shared handle and
//! with independent handles (each with its own lock state, as separate
//! processes would have).

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use pdfdesk::config::LedgerConfig;
use pdfdesk::ledger::{HistoryEntry, HistoryLedger};

const WRITERS: usize = 50;

fn config(dir: &TempDir) -> LedgerConfig {
    LedgerConfig::new(dir.path().join("history.json")).with_lock_timeout(Duration::from_secs(30))
}

fn assert_complete(entries: &[HistoryEntry]) {
    assert_eq!(entries.len(), WRITERS);

    let names: HashSet<_> = entries.iter().map(|e| e.filename.as_str()).collect();
    for i in 0..WRITERS {
        assert!(names.contains(format!("file_{i}.pdf").as_str()), "lost file_{i}.pdf");
    }

    // Newest first: timestamps never increase towards the tail
    for pair in entries.windows(2) {
        assert!(
            pair[0].timestamp >= pair[1].timestamp,
            "{} recorded before {}",
            pair[0].timestamp,
            pair[1].timestamp
        );
    }
}

#[test]
fn concurrent_records_through_shared_handle() {
    let dir = TempDir::new().unwrap();
    let ledger = Arc::new(HistoryLedger::open(&config(&dir)).unwrap());
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                ledger.record(&format!("file_{i}.pdf"), "merge").unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_complete(&ledger.list().unwrap());
}

#[test]
fn concurrent_records_through_independent_handles() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    HistoryLedger::open(&config).unwrap();
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let config = config.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let ledger = HistoryLedger::open(&config).unwrap();
                barrier.wait();
                ledger.record(&format!("file_{i}.pdf"), "split").unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let entries = HistoryLedger::open(&config).unwrap().list().unwrap();
    assert_complete(&entries);
}

#[test]
fn readers_never_see_partial_ledger() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let writer = HistoryLedger::open(&config).unwrap();
    let reader_config = config.clone();

    let reader = thread::spawn(move || {
        let ledger = HistoryLedger::open(&reader_config).unwrap();
        let mut last = 0;
        for _ in 0..200 {
            let len = ledger.list().unwrap().len();
            assert!(len >= last);
            last = len;
        }
    });

    for i in 0..WRITERS {
        writer.record(&format!("file_{i}.pdf"), "reorder").unwrap();
    }
    reader.join().unwrap();

    assert_complete(&writer.list().unwrap());
}
