use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Segment, SpentTime};

/// The struct used for storing the ledger on the disk: `{"2024-05-06": [entry, ...], ...}`.
pub type LedgerDocument = BTreeMap<String, StoredDay>;

/// Entries stored under one date. A value that isn't a list is kept aside the same way an
/// unrecognized entry is, the remaining dates stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredDay {
    Entries(Vec<StoredEntry>),
    Unrecognized(serde_json::Value),
}

/// Every entry shape found in ledger documents. Entries are written as the positional form,
/// older documents also contain named records. Anything else is captured so that a single bad
/// entry doesn't make the whole document unreadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredEntry {
    /// `[label, "H:MM:SS", task, job]`
    Positional(String, String, String, String),
    Named {
        label: String,
        duration: String,
        #[serde(default)]
        task: String,
        #[serde(default)]
        job: String,
    },
    Unrecognized(serde_json::Value),
}

impl StoredEntry {
    /// Normalizes a known shape into a [Segment]. Unknown shapes are handed back for reporting.
    pub fn into_segment(self) -> Result<Segment, serde_json::Value> {
        match self {
            StoredEntry::Positional(label, duration, task, job)
            | StoredEntry::Named {
                label,
                duration,
                task,
                job,
            } => Ok(Segment {
                label,
                duration: SpentTime::from_stored(duration),
                task,
                job,
            }),
            StoredEntry::Unrecognized(value) => Err(value),
        }
    }
}

impl From<&Segment> for StoredEntry {
    fn from(segment: &Segment) -> Self {
        StoredEntry::Positional(
            segment.label.clone(),
            segment.duration.as_str().to_string(),
            segment.task.clone(),
            segment.job.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::ledger::Ledger;

    use super::{LedgerDocument, StoredEntry};

    #[test]
    fn test_both_legacy_shapes_are_normalized() {
        let document: LedgerDocument = serde_json::from_str(
            r#"{
                "2024-05-06": [
                    ["Coding", "1:00:00", "parser", "J-1"],
                    {"label": "Meetings", "duration": "0:30:00", "task": "standup", "job": "J-2"},
                    {"label": "Email", "duration": "0:05:00"}
                ]
            }"#,
        )
        .unwrap();

        let ledger = Ledger::load(document);
        let entries = ledger.iter().map(|(_, s)| s.clone()).collect::<Vec<_>>();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].label, "Coding");
        assert_eq!(entries[0].job, "J-1");
        assert_eq!(entries[1].label, "Meetings");
        assert_eq!(entries[1].task, "standup");
        assert_eq!(entries[2].task, "");
        assert_eq!(entries[2].duration.as_str(), "0:05:00");
    }

    #[test]
    fn test_unrecognized_entries_are_skipped() {
        let document: LedgerDocument = serde_json::from_str(
            r#"{
                "2024-05-06": [
                    ["Coding"],
                    42,
                    {"name": "Wrong"},
                    ["Coding", "1:00:00", "parser", "J-1"]
                ],
                "not a date": [["Lost", "1:00:00", "", ""]],
                "2024-05-07": [null]
            }"#,
        )
        .unwrap();

        let ledger = Ledger::load(document);

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.dates().count(), 1);
    }

    #[test]
    fn test_unreadable_day_keeps_other_dates() {
        let document: LedgerDocument = serde_json::from_str(
            r#"{
                "2024-05-06": [["Coding", "1:00:00", "", ""]],
                "2024-05-07": "oops",
                "2024-05-08": {"label": "Email", "duration": "0:05:00"}
            }"#,
        )
        .unwrap();

        let ledger = Ledger::load(document);

        assert_eq!(ledger.len(), 1);
        assert_eq!(
            ledger.dates().collect::<Vec<_>>(),
            vec![chrono::NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()]
        );
    }

    #[test]
    fn test_saved_shape_is_positional() {
        let document: LedgerDocument = serde_json::from_str(
            r#"{"2024-05-06": [{"label": "Email", "duration": "0:05:00", "task": "inbox", "job": ""}]}"#,
        )
        .unwrap();

        let saved = serde_json::to_value(Ledger::load(document).save()).unwrap();

        assert_eq!(
            saved,
            serde_json::json!({"2024-05-06": [["Email", "0:05:00", "inbox", ""]]})
        );
        assert!(matches!(
            serde_json::from_value::<StoredEntry>(saved["2024-05-06"][0].clone()).unwrap(),
            StoredEntry::Positional(..)
        ));
    }
}
