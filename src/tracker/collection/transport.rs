use anyhow::Result;
use async_trait::async_trait;

use crate::tracker::events::TrackerEvent;

/// Contract a device connection must fulfil. Discovery and pairing happen before the transport
/// is handed to the tracker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceTransport: Send {
    /// Waits for the next notification. `Ok(None)` means the connection is gone for good.
    /// Must be cancel safe, the worker races it against shutdown.
    async fn next_event(&mut self) -> Result<Option<TrackerEvent>>;
}
