use anyhow::Result;
use collection::{transport::DeviceTransport, worker::TransportWorker};
use display::run_live_display;
use events::{DeviceMessage, TimerSnapshot};
use processing::{recorder::ActivityRecorder, writer::LedgerWriter, ProcessingModule};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    app::AppContext,
    labels::LabelRegistry,
    ledger::{store::LedgerStorage, Ledger},
    utils::clock::Clock,
};

pub mod collection;
pub mod display;
pub mod events;
pub mod processing;
pub mod shutdown;

const EVENT_BUFFER: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct TrackerSettings {
    /// Task attached to segments until the device sends another one.
    pub task: String,
    pub job: String,
    /// Redraw a status line on stderr while tracking.
    pub live: bool,
}

/// Tracks the device until it disconnects or Ctrl-C is pressed. Every run still open at that
/// point is closed and saved before returning. A failed transport is returned as the error once
/// the ledger is saved.
pub async fn start_tracker(
    context: AppContext,
    transport: impl DeviceTransport + 'static,
    settings: TrackerSettings,
    clock: impl Clock + Clone,
) -> Result<()> {
    let (labels, ledger, ledger_file) = context.into_tracking_parts();
    let (sender, receiver) = mpsc::channel::<DeviceMessage>(EVENT_BUFFER);
    let (observers, observer) = watch::channel(TimerSnapshot::default());

    let shutdown_token = CancellationToken::new();

    let worker = create_worker(sender, transport, &shutdown_token, clock.clone());

    let processor = create_processor(
        receiver,
        labels,
        ledger,
        ledger_file,
        observers,
        &settings,
        clock.clone(),
    );

    let display = async {
        if settings.live {
            run_live_display(
                observer,
                Box::new(clock),
                shutdown_token.clone(),
                std::io::stderr(),
            )
            .await
        } else {
            Ok(())
        }
    };

    info!("Tracking started");
    let (_, worker_result, processing_result, display_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        worker.run(),
        processor.run(),
        display,
    );

    if let Err(processing_result) = processing_result {
        error!("Processing module got an error {:?}", processing_result);
    }

    if let Err(display_result) = display_result {
        error!("Live display got an error {:?}", display_result);
    }

    info!("Tracking stopped");
    worker_result
}

fn create_worker(
    sender: mpsc::Sender<DeviceMessage>,
    transport: impl DeviceTransport + 'static,
    shutdown_token: &CancellationToken,
    clock: impl Clock,
) -> TransportWorker {
    TransportWorker::new(
        sender,
        Box::new(transport),
        shutdown_token.clone(),
        Box::new(clock),
    )
}

fn create_processor(
    receiver: mpsc::Receiver<DeviceMessage>,
    labels: LabelRegistry,
    ledger: Ledger,
    storage: impl LedgerStorage + Send + Sync + 'static,
    observers: watch::Sender<TimerSnapshot>,
    settings: &TrackerSettings,
    clock: impl Clock,
) -> ProcessingModule<ActivityRecorder> {
    let recorder = ActivityRecorder::new(
        labels,
        ledger,
        LedgerWriter::spawn(storage),
        Box::new(clock),
        observers,
    )
    .with_annotations(settings.task.clone(), settings.job.clone());
    ProcessingModule::new(receiver, recorder)
}
