use std::{fmt::Display, path::Path};

use ansi_term::Colour;
use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};
use now::DateTimeNow;

use crate::{
    app::AppContext,
    labels::LabelRegistry,
    report::{aggregate, query, ReportQuery, ReportRow, ReportSummary},
    utils::percentage::hours_percentage,
};

use super::Args;

/// Used for labels that no face carries any more.
const MISSING_LABEL_COLOR: &str = "#D1FFF7";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct ReportCommand {
    #[arg(
        long = "start",
        short,
        help = "First day of the report. Examples are \"yesterday\", \"monday\", \"15/03/2025\""
    )]
    start_date: Option<String>,
    #[arg(
        long = "end",
        short,
        help = "Last day of the report. Examples are \"today\", \"friday\", \"21/03/2025\""
    )]
    end_date: Option<String>,
    #[arg(
        long,
        short,
        conflicts_with_all = ["start_date", "end_date"],
        help = "Report the current week, Monday to Sunday"
    )]
    week: bool,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, short, help = "Only entries with exactly this label")]
    label: Option<String>,
    #[arg(long, short, help = "Only entries whose job contains this text")]
    job: Option<String>,
    #[arg(long, short, help = "Only entries whose task contains this text")]
    text: Option<String>,
}

/// Command to process `report` command. Prints the matching entries followed by per label totals.
pub async fn process_report_command(
    ReportCommand {
        start_date,
        end_date,
        week,
        date_style,
        label,
        job,
        text,
    }: ReportCommand,
    dir: &Path,
) -> Result<()> {
    let (start_date, end_date) = parse_range(start_date, end_date, week, date_style, Local::now())?;

    let context = AppContext::open(dir).await;
    let rows = query(
        context.ledger(),
        &ReportQuery {
            start_date,
            end_date,
            label,
            job_substring: job,
            text_substring: text,
        },
    );
    let summary = aggregate(&rows);

    print_rows(&rows, context.labels());
    print_summary(&summary, context.labels());
    Ok(())
}

/// Resolves the inclusive date range of the report. Missing bounds stay open.
fn parse_range(
    start_date: Option<String>,
    end_date: Option<String>,
    week: bool,
    date_style: DateStyle,
    now: DateTime<Local>,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
    if week {
        return Ok((
            Some(now.beginning_of_week().date_naive()),
            Some(now.end_of_week().date_naive()),
        ));
    }

    let dialect: chrono_english::Dialect = date_style.into();
    let parse = |value: Option<String>, bound: &str| -> Result<Option<NaiveDate>> {
        match value.map(|s| parse_date_string(&s, now, dialect)) {
            Some(Ok(v)) => Ok(Some(v.with_timezone(&Local).date_naive())),
            Some(Err(e)) => Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate {bound} date {e}"),
                )
                .into()),
            None => Ok(None),
        }
    };

    Ok((parse(start_date, "start")?, parse(end_date, "end")?))
}

fn print_rows(rows: &[ReportRow], labels: &LabelRegistry) {
    for row in rows {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            row.date,
            paint_label(&row.label, labels),
            row.duration,
            row.task,
            row.job
        );
    }
    if !rows.is_empty() {
        println!();
    }
}

fn print_summary(summary: &ReportSummary, labels: &LabelRegistry) {
    for entry in &summary.per_label {
        let share = hours_percentage(entry.hours, summary.total_hours)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{}\t{:.2}h\t{}",
            paint_label(&entry.label, labels),
            entry.hours,
            share
        );
    }
    println!(
        "Total\t{:.2}h\t{} entries",
        summary.total_hours, summary.count
    );
    if summary.skipped > 0 {
        println!(
            "{} entries have a duration that couldn't be read and are not in the totals",
            summary.skipped
        );
    }
}

fn paint_label(label: &str, labels: &LabelRegistry) -> String {
    let colour = labels
        .color_for_label(label)
        .and_then(parse_hex_colour)
        .or_else(|| parse_hex_colour(MISSING_LABEL_COLOR))
        .unwrap_or(Colour::White);
    colour.paint(label).to_string()
}

/// `#RRGGBB` to a truecolor [Colour].
fn parse_hex_colour(value: &str) -> Option<Colour> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |at: usize| u8::from_str_radix(hex.get(at..at + 2)?, 16).ok();
    Some(Colour::RGB(channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use ansi_term::Colour;
    use chrono::{Local, NaiveDate, TimeZone};

    use super::{parse_hex_colour, parse_range, DateStyle};

    #[test]
    fn test_parse_hex_colour() {
        assert_eq!(parse_hex_colour("#D1FFF7"), Some(Colour::RGB(0xD1, 0xFF, 0xF7)));
        assert_eq!(parse_hex_colour("#00ff00"), Some(Colour::RGB(0, 255, 0)));
        assert_eq!(parse_hex_colour("00FF00"), None);
        assert_eq!(parse_hex_colour("#FFF"), None);
        assert_eq!(parse_hex_colour("#GG0000"), None);
    }

    #[test]
    fn test_parse_range_dialects() {
        let now = Local.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();

        let uk = parse_range(Some("05/03/2025".into()), None, false, DateStyle::Uk, now).unwrap();
        let us = parse_range(Some("05/03/2025".into()), None, false, DateStyle::Us, now).unwrap();

        assert_eq!(uk, (NaiveDate::from_ymd_opt(2025, 3, 5), None));
        assert_eq!(us, (NaiveDate::from_ymd_opt(2025, 5, 3), None));
    }

    #[test]
    fn test_week_range() {
        // A Thursday.
        let now = Local.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();

        let range = parse_range(None, None, true, DateStyle::Uk, now).unwrap();

        assert_eq!(
            range,
            (
                NaiveDate::from_ymd_opt(2025, 3, 17),
                NaiveDate::from_ymd_opt(2025, 3, 23)
            )
        );
    }

    #[test]
    fn test_open_range_and_bad_dates() {
        let now = Local.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();

        assert_eq!(
            parse_range(None, None, false, DateStyle::Uk, now).unwrap(),
            (None, None)
        );
        assert!(parse_range(None, Some("not a date".into()), false, DateStyle::Uk, now).is_err());
    }
}
