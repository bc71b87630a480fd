use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{error, info};

use crate::{
    labels::LabelRegistry,
    ledger::{AppendOutcome, Ledger, Segment, SpentTime},
    orientation::Orientation,
    timer::{ClosedRun, TimerMachine, TimerState},
    tracker::events::{DeviceMessage, RunningTimer, TimerSnapshot, TrackerEvent},
    utils::{clock::Clock, time::local_date},
};

use super::{module::EventProcessor, writer::LedgerWriter};

/// Bridges device messages and the ledger. It is the only owner of the timer, the label registry
/// and the ledger while tracking, every closed run becomes a ledger entry dated by the day it
/// closed on.
pub struct ActivityRecorder {
    timer: TimerMachine,
    labels: LabelRegistry,
    ledger: Ledger,
    task: String,
    job: String,
    battery: Option<u8>,
    clock: Box<dyn Clock>,
    observers: watch::Sender<TimerSnapshot>,
    writer: Option<LedgerWriter>,
}

impl ActivityRecorder {
    pub fn new(
        labels: LabelRegistry,
        ledger: Ledger,
        writer: LedgerWriter,
        clock: Box<dyn Clock>,
        observers: watch::Sender<TimerSnapshot>,
    ) -> Self {
        Self {
            timer: TimerMachine::new(),
            labels,
            ledger,
            task: String::new(),
            job: String::new(),
            battery: None,
            clock,
            observers,
            writer: Some(writer),
        }
    }

    /// Task and job attached to segments until the device says otherwise.
    pub fn with_annotations(mut self, task: impl Into<String>, job: impl Into<String>) -> Self {
        self.task = task.into();
        self.job = job.into();
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn timer_state(&self) -> &TimerState {
        self.timer.state()
    }

    fn record(&mut self, closed: Option<ClosedRun>, at: DateTime<Utc>) {
        let Some(run) = closed else {
            return;
        };
        let date = local_date(&at);
        let segment = Segment::new(
            run.label,
            SpentTime::from_duration(run.duration),
            self.task.clone(),
            self.job.clone(),
        );

        match self.ledger.append(date, segment) {
            AppendOutcome::Stored => {
                if let Some(writer) = &self.writer {
                    writer.schedule(self.ledger.clone());
                }
            }
            AppendOutcome::Duplicate => {
                info!("Run on face {} was already recorded for {date}", run.face)
            }
        }
    }

    fn snapshot(&self) -> TimerSnapshot {
        let running = match *self.timer.state() {
            TimerState::Idle => None,
            TimerState::Running { face, started_at } => Some(RunningTimer {
                face,
                label: self.labels.resolve(face).name,
                started_at,
            }),
        };
        TimerSnapshot {
            running,
            battery: self.battery,
            task: self.task.clone(),
            job: self.job.clone(),
        }
    }

    fn publish(&self) {
        self.observers.send_replace(self.snapshot());
    }
}

impl EventProcessor for ActivityRecorder {
    async fn process_next(&mut self, message: DeviceMessage) -> Result<()> {
        let DeviceMessage { event, at } = message;
        match event {
            TrackerEvent::Orientation(code) => {
                let closed = self
                    .timer
                    .apply(Orientation::from_code(code), at, &self.labels);
                self.record(closed, at);
            }
            TrackerEvent::Battery(level) => {
                info!("Device battery at {level}%");
                self.battery = Some(level);
            }
            TrackerEvent::Disconnected => {
                info!("Device disconnected");
                let closed = self.timer.force_close(at, &self.labels);
                self.record(closed, at);
            }
            TrackerEvent::TransportFailed(reason) => {
                error!("Device transport failed: {reason}");
                let closed = self.timer.force_close(at, &self.labels);
                self.record(closed, at);
            }
            TrackerEvent::Annotate { task, job } => {
                if let Some(task) = task {
                    info!("Task set to {task:?}");
                    self.task = task;
                }
                if let Some(job) = job {
                    info!("Job set to {job:?}");
                    self.job = job;
                }
            }
        }
        self.publish();
        Ok(())
    }

    async fn finalize(&mut self) -> Result<()> {
        let now = self.clock.time();
        let closed = self.timer.force_close(now, &self.labels);
        self.record(closed, now);
        self.publish();

        match self.writer.take() {
            Some(writer) => writer.finish().await,
            None => Ok(()),
        }
    }
}
