use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Action tags written by the built-in operations. The ledger accepts any
/// other tag verbatim.
pub mod actions {
    pub const MERGE: &str = "merge";
    pub const SPLIT: &str = "split";
    pub const REORDER: &str = "reorder";
    pub const METADATA: &str = "metadata";
    pub const IMAGES_MERGE: &str = "images_merge";
    pub const ENCRYPT: &str = "encrypt";
}

/// Local ISO-8601 with microseconds, e.g. `2024-05-01T10:00:00.123456`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// One recorded operation, referencing an artifact by filename
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub filename: String,
    pub action: String,
    pub timestamp: String,
}

impl HistoryEntry {
    /// Parsed timestamp; `None` for foreign formats the ledger did not write
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Timestamp for a new front entry, never earlier than the current front
pub(crate) fn next_timestamp(front: Option<&HistoryEntry>) -> String {
    let now = Local::now().naive_local();
    let stamp = match front.and_then(HistoryEntry::recorded_at) {
        Some(previous) if previous > now => previous,
        _ => now,
    };
    stamp.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(timestamp: &str) -> HistoryEntry {
        HistoryEntry {
            filename: "a.pdf".to_string(),
            action: actions::MERGE.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn test_parse_with_and_without_fraction() {
        assert!(entry("2024-05-01T10:00:00.123456").recorded_at().is_some());
        assert!(entry("2024-05-01T10:00:00").recorded_at().is_some());
        assert!(entry("2024-05-01T10:00:00+02:00").recorded_at().is_some());
        assert!(entry("yesterday").recorded_at().is_none());
    }

    #[test]
    fn test_next_timestamp_format() {
        let stamp = next_timestamp(None);
        assert!(entry(&stamp).recorded_at().is_some());
        assert_eq!(stamp.len(), "2024-05-01T10:00:00.123456".len());
    }

    #[test]
    fn test_next_timestamp_not_before_front() {
        let front = entry("2999-01-01T00:00:00.000001");
        assert_eq!(next_timestamp(Some(&front)), "2999-01-01T00:00:00.000001");
    }

    #[test]
    fn test_next_timestamp_ignores_unparseable_front() {
        let front = entry("not a date");
        let stamp = next_timestamp(Some(&front));
        assert!(entry(&stamp).recorded_at().is_some());
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(entry("2024-05-01T10:00:00")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "filename": "a.pdf",
                "action": "merge",
                "timestamp": "2024-05-01T10:00:00"
            })
        );
    }
}
