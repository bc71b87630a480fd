use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::BufReader;

use crate::{
    app::AppContext,
    tracker::{collection::line::LineTransport, start_tracker, TrackerSettings},
    utils::clock::{Clock, DefaultClock},
};

#[derive(Debug, clap::Args)]
pub struct TrackCommand {
    #[arg(
        long,
        short,
        help = "Read device notifications from a file instead of stdin. One notification per line: \"3\", \"battery 80\", \"disconnect\", \"task <text>\", \"job <text>\""
    )]
    input: Option<PathBuf>,
    #[arg(long, default_value = "", help = "Task attached to recorded activity")]
    task: String,
    #[arg(long, default_value = "", help = "Job attached to recorded activity")]
    job: String,
    #[arg(long, help = "Show the running timer on stderr")]
    live: bool,
}

/// Command to process `track` command. Tracking lasts until the input ends, a `disconnect` is
/// followed by the end of input, or Ctrl-C is pressed.
pub async fn process_track_command(command: TrackCommand, dir: &Path) -> Result<()> {
    track(command, dir, DefaultClock).await
}

async fn track(
    TrackCommand {
        input,
        task,
        job,
        live,
    }: TrackCommand,
    dir: &Path,
    clock: impl Clock + Clone,
) -> Result<()> {
    let context = AppContext::open(dir).await;
    let settings = TrackerSettings { task, job, live };

    match input {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            start_tracker(
                context,
                LineTransport::new(BufReader::new(file)),
                settings,
                clock,
            )
            .await
        }
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            start_tracker(context, LineTransport::new(stdin), settings, clock).await
        }
    }
}
