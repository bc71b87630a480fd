use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument};

use crate::{
    tracker::events::{DeviceMessage, TrackerEvent},
    utils::clock::Clock,
};

use super::transport::DeviceTransport;

/// Pulls notifications out of a [DeviceTransport] and hands them to the dispatcher. The worker
/// never touches timer or ledger state itself.
pub struct TransportWorker {
    next: mpsc::Sender<DeviceMessage>,
    transport: Box<dyn DeviceTransport>,
    shutdown: CancellationToken,
    time_provider: Box<dyn Clock>,
}

impl TransportWorker {
    pub fn new(
        next: mpsc::Sender<DeviceMessage>,
        transport: Box<dyn DeviceTransport>,
        shutdown: CancellationToken,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            next,
            transport,
            shutdown,
            time_provider,
        }
    }

    async fn send(&self, event: TrackerEvent) -> Result<()> {
        let message = DeviceMessage {
            event,
            at: self.time_provider.time(),
        };
        let span = info_span!("Forwarding device event");
        debug!("Sending message {:?}", message);
        self.next
            .send(message)
            .instrument(span)
            .await
            .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
        Ok(())
    }

    /// Executes the transport event loop. Every way out of the loop is reported to the dispatcher,
    /// so a running timer is closed before the pipeline is torn down. A transport failure is
    /// also returned to the caller.
    pub async fn run(mut self) -> Result<()> {
        let result = self.pump().await;
        // Once the device is gone there is nothing left to track.
        self.shutdown.cancel();
        result
    }

    async fn pump(&mut self) -> Result<()> {
        loop {
            let next = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Shutting down, disconnecting from the device");
                    return self.send(TrackerEvent::Disconnected).await;
                }
                next = self.transport.next_event() => next,
            };

            match next {
                Ok(Some(event)) => self.send(event).await?,
                Ok(None) => {
                    info!("Device connection closed");
                    return self.send(TrackerEvent::Disconnected).await;
                }
                Err(e) => {
                    error!("Device transport failed {e:?}");
                    self.send(TrackerEvent::TransportFailed(e.to_string())).await?;
                    return Err(e.context("Device transport failed"));
                }
            }
        }
    }
}
