use anyhow::Result;

use crate::tracker::events::DeviceMessage;

/// Represents an event processor. The processor is the single owner of the state it mutates,
/// messages reach it one at a time.
pub trait EventProcessor {
    fn process_next(
        &mut self,
        message: DeviceMessage,
    ) -> impl std::future::Future<Output = Result<()>>;

    /// Called once the message channel is closed and drained.
    fn finalize(&mut self) -> impl std::future::Future<Output = Result<()>>;
}
