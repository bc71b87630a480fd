use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};

use crate::error::{Result, TrackerError};

const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";

/// This is the standard way of converting a date to a string in facelog.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format(RECORD_DATE_FORMAT).to_string()
}

/// Parses a strict, zero padded `YYYY-MM-DD` date.
pub fn parse_record_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    // chrono accepts unpadded fields, the ledger keys must stay fixed-width.
    if trimmed.len() != 10 {
        return Err(TrackerError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, RECORD_DATE_FORMAT)
        .map_err(|_| TrackerError::InvalidDate(value.to_string()))
}

/// Calendar day a moment belongs to, as seen by the user.
pub fn local_date<Tz: TimeZone>(moment: &DateTime<Tz>) -> NaiveDate {
    moment.with_timezone(&Local).date_naive()
}

/// Formats a duration as `H:MM:SS`. Hours are not wrapped at 24.
pub fn format_hms(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    format!(
        "{}:{:02}:{:02}",
        total / 3600,
        (total / 60) % 60,
        total % 60
    )
}

/// Parses `H:MM:SS` into a duration. Hours may have any number of digits.
pub fn parse_hms(value: &str) -> Option<Duration> {
    let mut parts = value.trim().split(':');
    let hours = parts.next()?.trim().parse::<u32>().ok()?;
    let minutes = parts.next()?.trim().parse::<u32>().ok()?;
    let seconds = parts.next()?.trim().parse::<u32>().ok()?;
    if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }
    Some(Duration::seconds(
        hours as i64 * 3600 + minutes as i64 * 60 + seconds as i64,
    ))
}
