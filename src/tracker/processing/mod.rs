use anyhow::Result;
use module::EventProcessor;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info};

use super::events::DeviceMessage;

pub mod module;
pub mod recorder;
pub mod writer;

/// Represents the dispatcher of device messages. Transport workers only enqueue messages, this
/// module applies them one by one so state is only ever mutated from here.
pub struct ProcessingModule<Processor> {
    receiver: Receiver<DeviceMessage>,
    processor: Processor,
}

impl<P: EventProcessor> ProcessingModule<P> {
    pub fn new(receiver: Receiver<DeviceMessage>, processor: P) -> Self {
        Self {
            receiver,
            processor,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        while let Some(message) = self.receiver.recv().await {
            debug!("Processing message {:?}", message);
            match self.processor.process_next(message.clone()).await {
                Ok(_) => {
                    info!("Processed message {:?}", message.event)
                }
                Err(e) => {
                    error!("Error processing message {:?}: {e:?}", message)
                }
            }
        }

        self.receiver.close();
        self.processor.finalize().await
    }
}
