pub mod labels;
pub mod ledger;
pub mod report;
pub mod track;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use labels::{process_labels_command, LabelsCommand};
use ledger::{
    process_add_command, process_delete_command, process_edit_command, process_entries_command,
    AddCommand, EditCommand,
};
use report::{process_report_command, ReportCommand};
use track::{process_track_command, TrackCommand};

use crate::utils::logging::{CLI_PREFIX, TRACKER_PREFIX};

#[derive(Parser, Debug)]
#[command(name = "Facelog", version, long_about = None)]
#[command(about = "Time tracking with an eight-sided orientation device", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    pub dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable logging")]
    pub log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Track device orientation changes until it disconnects or Ctrl-C is pressed")]
    Track {
        #[command(flatten)]
        command: TrackCommand,
    },
    #[command(about = "Display recorded activity with per label totals")]
    Report {
        #[command(flatten)]
        command: ReportCommand,
    },
    #[command(about = "List the entries recorded for a date")]
    Entries {
        #[arg(help = "Date as YYYY-MM-DD. Today by default")]
        date: Option<String>,
    },
    #[command(about = "Add an entry by hand")]
    Add {
        #[command(flatten)]
        command: AddCommand,
    },
    #[command(about = "Change an entry")]
    Edit {
        #[command(flatten)]
        command: EditCommand,
    },
    #[command(about = "Delete an entry")]
    Delete {
        #[arg(help = "Date as YYYY-MM-DD")]
        date: String,
        #[arg(help = "Position of the entry as shown by `entries`")]
        index: usize,
    },
    #[command(about = "Show or change what each face stands for")]
    Labels {
        #[command(subcommand)]
        command: Option<LabelsCommand>,
    },
}

impl Args {
    /// Tracking sessions log into their own files.
    pub fn log_prefix(&self) -> &'static str {
        match self.commands {
            Commands::Track { .. } => TRACKER_PREFIX,
            _ => CLI_PREFIX,
        }
    }
}

pub async fn run_cli(args: Args, dir: PathBuf) -> Result<()> {
    match args.commands {
        Commands::Track { command } => process_track_command(command, &dir).await,
        Commands::Report { command } => process_report_command(command, &dir).await,
        Commands::Entries { date } => process_entries_command(date, &dir).await,
        Commands::Add { command } => process_add_command(command, &dir).await,
        Commands::Edit { command } => process_edit_command(command, &dir).await,
        Commands::Delete { date, index } => process_delete_command(date, index, &dir).await,
        Commands::Labels { command } => process_labels_command(command, &dir).await,
    }
}
