//! Owner of everything the application keeps between runs: the label registry, the ledger and the
//! files backing them. Operations here take user input as text and validate it before touching
//! any state.

use std::path::Path;

use tracing::{info, warn};

use crate::{
    error::{Result, TrackerError},
    labels::{store::LabelStore, LabelRegistry},
    ledger::{
        store::{LedgerFile, LedgerStorage},
        AppendOutcome, Ledger, Segment, SpentTime,
    },
    orientation::Face,
    utils::time::parse_record_date,
};

/// Replacement values for an edited entry. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryEdit {
    pub date: Option<String>,
    pub label: Option<String>,
    pub duration: Option<String>,
    pub task: Option<String>,
    pub job: Option<String>,
}

pub struct AppContext {
    labels: LabelRegistry,
    label_store: LabelStore,
    ledger: Ledger,
    ledger_file: LedgerFile,
}

impl AppContext {
    /// Loads both stores from `dir`. Unreadable stores are replaced by empty ones, see
    /// [LabelStore::load_or_default] and [LedgerFile::load_or_empty].
    pub async fn open(dir: &Path) -> Self {
        let label_store = LabelStore::new(dir);
        let ledger_file = LedgerFile::new(dir);
        let labels = label_store.load_or_default().await;
        let ledger = ledger_file.load_or_empty().await;
        info!(
            "Opened {} with {} ledger entries",
            dir.display(),
            ledger.len()
        );
        Self {
            labels,
            label_store,
            ledger,
            ledger_file,
        }
    }

    pub fn labels(&self) -> &LabelRegistry {
        &self.labels
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Hands the state over to the tracker, which owns it until it stops.
    pub fn into_tracking_parts(self) -> (LabelRegistry, Ledger, LedgerFile) {
        (self.labels, self.ledger, self.ledger_file)
    }

    pub fn entries_for(&self, date: &str) -> Result<&[Segment]> {
        let date = parse_record_date(date)?;
        Ok(self.ledger.entries_for(date))
    }

    /// Adds a manual entry and saves the ledger.
    pub async fn add_entry(
        &mut self,
        date: &str,
        label: &str,
        duration: &str,
        task: &str,
        job: &str,
    ) -> Result<AppendOutcome> {
        let date = parse_record_date(date)?;
        let duration = SpentTime::parse(duration)?;
        let outcome = self
            .ledger
            .append(date, Segment::new(label, duration, task, job));
        if outcome == AppendOutcome::Stored {
            self.persist_ledger().await?;
        }
        Ok(outcome)
    }

    /// Rewrites one entry. All input is checked before the ledger is changed, so a rejected edit
    /// leaves the entry where it was.
    pub async fn edit_entry(
        &mut self,
        date: &str,
        index: usize,
        edit: EntryEdit,
    ) -> Result<AppendOutcome> {
        let date = parse_record_date(date)?;
        let new_date = edit
            .date
            .as_deref()
            .map(parse_record_date)
            .transpose()?
            .unwrap_or(date);
        let duration = edit.duration.as_deref().map(SpentTime::parse).transpose()?;

        let current = self
            .ledger
            .entries_for(date)
            .get(index)
            .cloned()
            .ok_or(TrackerError::NotFound { date, index })?;
        let segment = Segment {
            label: edit.label.unwrap_or(current.label),
            duration: duration.unwrap_or(current.duration),
            task: edit.task.unwrap_or(current.task),
            job: edit.job.unwrap_or(current.job),
        };

        let outcome = self.ledger.update(date, index, new_date, segment)?;
        self.persist_ledger().await?;
        Ok(outcome)
    }

    pub async fn delete_entry(&mut self, date: &str, index: usize) -> Result<Segment> {
        let date = parse_record_date(date)?;
        let removed = self.ledger.delete(date, index)?;
        self.persist_ledger().await?;
        Ok(removed)
    }

    /// Renames a face. Without a colour the current one is kept.
    pub async fn set_label(&mut self, code: i64, name: &str, color: Option<&str>) -> Result<()> {
        let color = match color {
            Some(color) => color.to_string(),
            None => {
                let face = Face::try_new(code)?;
                self.labels.resolve(face).color
            }
        };
        self.labels.update(code, name, color)?;
        self.persist_labels().await
    }

    pub async fn persist_ledger(&self) -> Result<()> {
        self.ledger_file
            .save(&self.ledger)
            .await
            .inspect_err(|e| warn!("Ledger was not saved: {e}"))
    }

    pub async fn persist_labels(&self) -> Result<()> {
        self.label_store
            .save(&self.labels)
            .await
            .inspect_err(|e| warn!("Labels were not saved: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        error::TrackerError,
        ledger::{
            store::{LedgerFile, LedgerStorage},
            AppendOutcome,
        },
        orientation::Face,
        utils::logging::TEST_LOGGING,
    };

    use super::{AppContext, EntryEdit};

    #[tokio::test]
    async fn test_add_and_list_entries() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let mut context = AppContext::open(dir.path()).await;

        let outcome = context
            .add_entry("2024-05-06", "Coding", "1:30:00", "parser", "ACME-1")
            .await?;
        let again = context
            .add_entry("2024-05-06", "Coding", "0:10:00", "parser", "ACME-1")
            .await?;

        assert_eq!(outcome, AppendOutcome::Stored);
        assert_eq!(again, AppendOutcome::Duplicate);
        let entries = context.entries_for("2024-05-06")?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].duration.as_str(), "1:30:00");

        let on_disk = LedgerFile::new(dir.path()).load().await?;
        assert_eq!(&on_disk, context.ledger());
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_date_leaves_ledger_unchanged() -> Result<()> {
        let dir = tempdir()?;
        let mut context = AppContext::open(dir.path()).await;
        context
            .add_entry("2024-05-06", "Coding", "1:00:00", "", "")
            .await?;
        let before = context.ledger().clone();

        let added = context
            .add_entry("06/05/2024", "Coding", "1:00:00", "other", "")
            .await;
        let edited = context
            .edit_entry(
                "2024-05-06",
                0,
                EntryEdit {
                    date: Some("2024-5-7".into()),
                    ..Default::default()
                },
            )
            .await;
        let deleted = context.delete_entry("yesterday", 0).await;

        assert!(matches!(added, Err(TrackerError::InvalidDate(_))));
        assert!(matches!(edited, Err(TrackerError::InvalidDate(_))));
        assert!(matches!(deleted, Err(TrackerError::InvalidDate(_))));
        assert!(edited.unwrap_err().is_validation());
        assert_eq!(context.ledger(), &before);
        Ok(())
    }

    #[tokio::test]
    async fn test_bad_duration_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let mut context = AppContext::open(dir.path()).await;

        let added = context
            .add_entry("2024-05-06", "Coding", "ninety minutes", "", "")
            .await;

        assert!(matches!(added, Err(TrackerError::InvalidDuration(_))));
        assert!(context.ledger().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_moves_entry_between_dates() -> Result<()> {
        let dir = tempdir()?;
        let mut context = AppContext::open(dir.path()).await;
        context
            .add_entry("2024-05-06", "Coding", "1:00:00", "parser", "")
            .await?;

        let outcome = context
            .edit_entry(
                "2024-05-06",
                0,
                EntryEdit {
                    date: Some("2024-05-07".into()),
                    duration: Some("0:45:00".into()),
                    ..Default::default()
                },
            )
            .await?;

        assert_eq!(outcome, AppendOutcome::Stored);
        assert!(context.entries_for("2024-05-06")?.is_empty());
        let moved = &context.entries_for("2024-05-07")?[0];
        assert_eq!(moved.label, "Coding");
        assert_eq!(moved.task, "parser");
        assert_eq!(moved.duration.as_str(), "0:45:00");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_entry_is_not_found() -> Result<()> {
        let dir = tempdir()?;
        let mut context = AppContext::open(dir.path()).await;

        let edited = context
            .edit_entry("2024-05-06", 3, EntryEdit::default())
            .await;
        let deleted = context.delete_entry("2024-05-06", 0).await;

        let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert!(matches!(
            edited,
            Err(TrackerError::NotFound { date: d, index: 3 }) if d == date
        ));
        assert!(matches!(deleted, Err(TrackerError::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_label_survives_reopen() -> Result<()> {
        let dir = tempdir()?;
        let mut context = AppContext::open(dir.path()).await;
        context.set_label(4, "Reading", Some("#123456")).await?;
        context.set_label(4, "Research", None).await?;

        let reopened = AppContext::open(dir.path()).await;
        let label = reopened.labels().resolve(Face::new(4).unwrap());
        assert_eq!(label.name, "Research");
        assert_eq!(label.color, "#123456");
        assert!(matches!(
            context.set_label(9, "Nope", None).await,
            Err(TrackerError::InvalidCode(9))
        ));
        Ok(())
    }
}
