use std::path::Path;

use anyhow::Result;
use chrono::Local;

use crate::{
    app::{AppContext, EntryEdit},
    ledger::{AppendOutcome, Segment},
    utils::time::date_to_record_name,
};

#[derive(Debug, clap::Args)]
pub struct AddCommand {
    #[arg(long, short, help = "Label of the activity")]
    label: String,
    #[arg(long, short, help = "Time spent as H:MM:SS or hours like 2.5h")]
    duration: String,
    #[arg(long, help = "Date as YYYY-MM-DD. Today by default")]
    date: Option<String>,
    #[arg(long, short, default_value = "")]
    task: String,
    #[arg(long, short, default_value = "")]
    job: String,
}

#[derive(Debug, clap::Args)]
pub struct EditCommand {
    #[arg(help = "Date of the entry as YYYY-MM-DD")]
    date: String,
    #[arg(help = "Position of the entry as shown by `entries`")]
    index: usize,
    #[arg(long = "date", help = "Move the entry to another date")]
    new_date: Option<String>,
    #[arg(long, short)]
    label: Option<String>,
    #[arg(long, short)]
    duration: Option<String>,
    #[arg(long, short)]
    task: Option<String>,
    #[arg(long, short)]
    job: Option<String>,
}

fn today() -> String {
    date_to_record_name(Local::now().date_naive())
}

fn print_entries(date: &str, entries: &[Segment]) {
    if entries.is_empty() {
        println!("No entries for {date}");
        return;
    }
    for (index, entry) in entries.iter().enumerate() {
        println!(
            "{index}\t{}\t{}\t{}\t{}",
            entry.label, entry.duration, entry.task, entry.job
        );
    }
}

fn report_outcome(outcome: AppendOutcome, date: &str) {
    match outcome {
        AppendOutcome::Stored => println!("Saved entry for {date}"),
        AppendOutcome::Duplicate => println!(
            "An entry with the same label, task and job already exists for {date}, nothing was added"
        ),
    }
}

pub async fn process_entries_command(date: Option<String>, dir: &Path) -> Result<()> {
    let date = date.unwrap_or_else(today);
    let context = AppContext::open(dir).await;
    print_entries(&date, context.entries_for(&date)?);
    Ok(())
}

pub async fn process_add_command(
    AddCommand {
        label,
        duration,
        date,
        task,
        job,
    }: AddCommand,
    dir: &Path,
) -> Result<()> {
    let date = date.unwrap_or_else(today);
    let mut context = AppContext::open(dir).await;
    let outcome = context
        .add_entry(&date, &label, &duration, &task, &job)
        .await?;
    report_outcome(outcome, &date);
    Ok(())
}

pub async fn process_edit_command(
    EditCommand {
        date,
        index,
        new_date,
        label,
        duration,
        task,
        job,
    }: EditCommand,
    dir: &Path,
) -> Result<()> {
    let target = new_date.clone().unwrap_or_else(|| date.clone());
    let mut context = AppContext::open(dir).await;
    let outcome = context
        .edit_entry(
            &date,
            index,
            EntryEdit {
                date: new_date,
                label,
                duration,
                task,
                job,
            },
        )
        .await?;
    report_outcome(outcome, &target);
    Ok(())
}

pub async fn process_delete_command(date: String, index: usize, dir: &Path) -> Result<()> {
    let mut context = AppContext::open(dir).await;
    let removed = context.delete_entry(&date, index).await?;
    println!(
        "Deleted {} ({}) from {date}",
        removed.label, removed.duration
    );
    Ok(())
}
