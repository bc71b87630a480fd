use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced by the labels, ledger and their stores. Validation and lookup failures leave
/// the affected store untouched.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("orientation code {0} is outside 1-8")]
    InvalidCode(i64),

    #[error("invalid duration {0:?}, expected H:MM:SS or a number of hours like 2.5h")]
    InvalidDuration(String),

    #[error("no entry {index} recorded for {date}")]
    NotFound { date: NaiveDate, index: usize },

    #[error("failed to access {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed document {path:?}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl TrackerError {
    /// True for errors caused by bad caller input rather than by the ledger or the disk.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TrackerError::InvalidDate(_)
                | TrackerError::InvalidCode(_)
                | TrackerError::InvalidDuration(_)
        )
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TrackerError::Persistence {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;
