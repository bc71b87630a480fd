//! Filtering and aggregation over a ledger snapshot. Everything here is a pure function of its
//! inputs, so it can be re-run every time a filter changes.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::ledger::{Ledger, SpentTime};

/// All filters are optional and combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportQuery {
    /// Inclusive.
    pub start_date: Option<NaiveDate>,
    /// Inclusive.
    pub end_date: Option<NaiveDate>,
    /// Exact label match.
    pub label: Option<String>,
    /// Case-insensitive substring of the job.
    pub job_substring: Option<String>,
    /// Case-insensitive substring of the task.
    pub text_substring: Option<String>,
}

impl ReportQuery {
    fn matches(&self, date: NaiveDate, label: &str, task: &str, job: &str) -> bool {
        self.start_date.map_or(true, |start| date >= start)
            && self.end_date.map_or(true, |end| date <= end)
            && self.label.as_deref().map_or(true, |wanted| wanted == label)
            && self
                .job_substring
                .as_deref()
                .map_or(true, |needle| contains_ignore_case(job, needle))
            && self
                .text_substring
                .as_deref()
                .map_or(true, |needle| contains_ignore_case(task, needle))
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub label: String,
    pub duration: SpentTime,
    pub task: String,
    pub job: String,
}

/// Flattens the ledger into one row per entry, in date then insertion order, keeping the rows
/// that pass every present filter.
pub fn query(ledger: &Ledger, query: &ReportQuery) -> Vec<ReportRow> {
    ledger
        .iter()
        .filter(|(date, segment)| query.matches(*date, &segment.label, &segment.task, &segment.job))
        .map(|(date, segment)| ReportRow {
            date,
            label: segment.label.clone(),
            duration: segment.duration.clone(),
            task: segment.task.clone(),
            job: segment.job.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelHours {
    pub label: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportSummary {
    /// Sorted by hours, largest first.
    pub per_label: Vec<LabelHours>,
    pub total_hours: f64,
    /// Number of rows given, including the ones that couldn't be counted.
    pub count: usize,
    /// Rows whose duration couldn't be understood and were left out of the totals.
    pub skipped: usize,
}

impl ReportSummary {
    pub fn hours_for(&self, label: &str) -> Option<f64> {
        self.per_label
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.hours)
    }
}

/// Sums durations per label. Rows with unreadable durations are skipped, old data must not break
/// reporting.
pub fn aggregate(rows: &[ReportRow]) -> ReportSummary {
    let mut per_label = HashMap::<&str, f64>::new();
    let mut total_hours = 0.;
    let mut skipped = 0;

    for row in rows {
        let Some(hours) = row.duration.hours() else {
            skipped += 1;
            continue;
        };
        *per_label.entry(row.label.as_str()).or_default() += hours;
        total_hours += hours;
    }

    let mut per_label = per_label
        .into_iter()
        .map(|(label, hours)| LabelHours {
            label: label.to_string(),
            hours,
        })
        .collect::<Vec<_>>();
    per_label.sort_by(|a, b| b.hours.total_cmp(&a.hours).then_with(|| a.label.cmp(&b.label)));

    ReportSummary {
        per_label,
        total_hours,
        count: rows.len(),
        skipped,
    }
}
