use std::{io::Write, time::Duration};

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::{sync::watch, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    timer::elapsed_between,
    utils::{clock::Clock, time::format_hms},
};

use super::events::TimerSnapshot;

pub const REFRESH_INTERVAL: Duration = Duration::from_millis(500);

/// One status line, e.g. `Coding 0:12:04 | parser [ACME-1] | battery 80%`.
pub fn render_status(snapshot: &TimerSnapshot, now: DateTime<Utc>) -> String {
    let mut status = match &snapshot.running {
        Some(running) => format!(
            "{} {}",
            running.label,
            format_hms(elapsed_between(running.started_at, now))
        ),
        None => "Idle".to_string(),
    };
    if !snapshot.task.is_empty() {
        status.push_str(&format!(" | {}", snapshot.task));
    }
    if !snapshot.job.is_empty() {
        status.push_str(&format!(" [{}]", snapshot.job));
    }
    if let Some(battery) = snapshot.battery {
        status.push_str(&format!(" | battery {battery}%"));
    }
    status
}

/// Keeps redrawing the status line until the tracker is cancelled or the dispatcher goes away.
/// Elapsed time is computed from the run start on every tick.
pub async fn run_live_display(
    mut observer: watch::Receiver<TimerSnapshot>,
    clock: Box<dyn Clock>,
    shutdown: CancellationToken,
    mut output: impl Write,
) -> Result<()> {
    let mut tick = clock.instant();
    loop {
        let status = render_status(&observer.borrow_and_update(), clock.time());
        write!(output, "\r\x1b[2K{status}")?;
        output.flush()?;

        tick = next_tick(tick, clock.instant());
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = clock.sleep_until(tick) => (),
        }
        if observer.has_changed().is_err() {
            break;
        }
    }
    writeln!(output)?;
    Ok(())
}

/// Ticks missed during a stall are dropped instead of redrawn back to back.
fn next_tick(previous: Instant, now: Instant) -> Instant {
    (previous + REFRESH_INTERVAL).max(now)
}
