//! Date partitioned record of finished activity.
//!
//! Entries for a date keep their insertion order. Within one date an entry is identified by its
//! `(label, task, job)` triple: submitting the same triple again is treated as an accidental
//! double submission and ignored, durations are never merged.

pub mod entities;
pub mod store;

use std::{collections::BTreeMap, fmt::Display};

use chrono::{Duration, NaiveDate};
use tracing::{debug, info, warn};

use crate::{
    error::{Result, TrackerError},
    utils::time::{date_to_record_name, format_hms, parse_hms, parse_record_date},
};

use entities::{LedgerDocument, StoredDay, StoredEntry};

/// Time spent on a segment as it's written in the ledger, normally `H:MM:SS`.
/// Historical documents may contain other notations, the text is kept verbatim so nothing is lost
/// on a load/save cycle; [SpentTime::hours] decides whether it's usable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpentTime(String);

impl SpentTime {
    pub fn from_duration(duration: Duration) -> Self {
        SpentTime(format_hms(duration))
    }

    /// Keeps stored text as is, without validation.
    pub fn from_stored(text: impl Into<String>) -> Self {
        SpentTime(text.into())
    }

    /// Validates user input. Accepts `H:MM:SS` and hour counts like `2.5h` or `2.5`.
    pub fn parse(text: &str) -> Result<Self> {
        let spent = SpentTime(text.trim().to_string());
        match spent.hours() {
            Some(_) => Ok(spent),
            None => Err(TrackerError::InvalidDuration(text.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fractional hours, `None` when the text can't be understood.
    pub fn hours(&self) -> Option<f64> {
        let text = self.0.trim();
        if text.contains(':') {
            return parse_hms(text).map(|d| d.num_seconds() as f64 / 3600.);
        }
        let hours = text
            .strip_suffix('h')
            .unwrap_or(text)
            .trim()
            .parse::<f64>()
            .ok()?;
        (hours.is_finite() && hours >= 0.).then_some(hours)
    }
}

impl Display for SpentTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A finished, labeled piece of activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub label: String,
    pub duration: SpentTime,
    pub task: String,
    pub job: String,
}

impl Segment {
    pub fn new(
        label: impl Into<String>,
        duration: SpentTime,
        task: impl Into<String>,
        job: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            duration,
            task: task.into(),
            job: job.into(),
        }
    }

    fn same_activity(&self, other: &Segment) -> bool {
        self.label == other.label && self.task == other.task && self.job == other.job
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Stored,
    /// An entry with the same label, task and job already exists for the date.
    Duplicate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    days: BTreeMap<NaiveDate, Vec<Segment>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, date: NaiveDate, segment: Segment) -> AppendOutcome {
        let entries = self.days.entry(date).or_default();
        if entries.iter().any(|entry| entry.same_activity(&segment)) {
            info!(
                "Ignoring duplicate entry {} / {} / {} on {date}",
                segment.label, segment.task, segment.job
            );
            return AppendOutcome::Duplicate;
        }
        debug!("Recording {segment:?} on {date}");
        entries.push(segment);
        AppendOutcome::Stored
    }

    /// Removes one entry. The date disappears together with its last entry.
    pub fn delete(&mut self, date: NaiveDate, index: usize) -> Result<Segment> {
        let entries = self
            .days
            .get_mut(&date)
            .filter(|entries| index < entries.len())
            .ok_or(TrackerError::NotFound { date, index })?;
        let removed = entries.remove(index);
        if entries.is_empty() {
            self.days.remove(&date);
        }
        debug!("Deleted {removed:?} from {date}");
        Ok(removed)
    }

    /// Replaces an entry, possibly moving it to another date. Works as a delete followed by an
    /// append, so the replacement can itself be rejected as a duplicate.
    pub fn update(
        &mut self,
        date: NaiveDate,
        index: usize,
        new_date: NaiveDate,
        segment: Segment,
    ) -> Result<AppendOutcome> {
        self.delete(date, index)?;
        let outcome = self.append(new_date, segment);
        if outcome == AppendOutcome::Duplicate {
            warn!("Edited entry from {date} matches an existing entry on {new_date} and was dropped");
        }
        Ok(outcome)
    }

    pub fn entries_for(&self, date: NaiveDate) -> &[Segment] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    /// Every entry in date order, then insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &Segment)> {
        self.days
            .iter()
            .flat_map(|(date, entries)| entries.iter().map(move |entry| (*date, entry)))
    }

    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Builds a ledger from a stored document. Unreadable dates and entries are skipped with a
    /// warning, stored entries are kept as they are.
    pub fn load(document: LedgerDocument) -> Self {
        let mut days = BTreeMap::<NaiveDate, Vec<Segment>>::new();
        for (key, day) in document {
            let Ok(date) = parse_record_date(&key) else {
                warn!("Skipping entries under unreadable date {key:?}");
                continue;
            };
            let stored = match day {
                StoredDay::Entries(stored) => stored,
                StoredDay::Unrecognized(value) => {
                    warn!("Skipping {key}, entries expected as a list, got {value}");
                    continue;
                }
            };
            let segments = stored
                .into_iter()
                .filter_map(|entry| {
                    entry
                        .into_segment()
                        .inspect_err(|value| {
                            warn!("Skipping unrecognized entry on {key}: {value}")
                        })
                        .ok()
                })
                .collect::<Vec<_>>();
            if !segments.is_empty() {
                days.entry(date).or_default().extend(segments);
            }
        }
        Self { days }
    }

    /// Exports the ledger in the canonical positional shape.
    pub fn save(&self) -> LedgerDocument {
        self.days
            .iter()
            .map(|(date, entries)| {
                (
                    date_to_record_name(*date),
                    StoredDay::Entries(entries.iter().map(StoredEntry::from).collect()),
                )
            })
            .collect()
    }
}
