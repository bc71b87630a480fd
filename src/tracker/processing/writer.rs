use anyhow::Result;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, error};

use crate::ledger::{store::LedgerStorage, Ledger};

/// Writes ledger snapshots in the background so the dispatcher never waits on the disk.
/// Snapshots that pile up while a write is in progress are collapsed, only the newest one is
/// written.
pub struct LedgerWriter {
    sender: UnboundedSender<Ledger>,
    handle: JoinHandle<()>,
}

impl LedgerWriter {
    pub fn spawn<S>(storage: S) -> Self
    where
        S: LedgerStorage + Send + Sync + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(write_snapshots(storage, receiver));
        Self { sender, handle }
    }

    pub fn schedule(&self, ledger: Ledger) {
        if self.sender.send(ledger).is_err() {
            error!("Ledger writer is gone, snapshot was not saved");
        }
    }

    /// Waits until every scheduled snapshot has been dealt with.
    pub async fn finish(self) -> Result<()> {
        drop(self.sender);
        self.handle.await?;
        Ok(())
    }
}

async fn write_snapshots<S: LedgerStorage>(storage: S, mut receiver: UnboundedReceiver<Ledger>) {
    while let Some(mut latest) = receiver.recv().await {
        let mut skipped = 0;
        while let Ok(newer) = receiver.try_recv() {
            latest = newer;
            skipped += 1;
        }
        if skipped > 0 {
            debug!("Skipping {skipped} outdated ledger snapshots");
        }

        match storage.save(&latest).await {
            Ok(()) => debug!("Saved ledger with {} entries", latest.len()),
            // The dispatcher still holds the ledger, the next snapshot retries.
            Err(e) => error!("Failed to save the ledger: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;

    use crate::ledger::{store::test_storage::MemoryStorage, Ledger, Segment, SpentTime};

    use super::LedgerWriter;

    fn ledger_with(entries: usize) -> Ledger {
        let mut ledger = Ledger::new();
        let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        for i in 0..entries {
            ledger.append(
                date,
                Segment::new(format!("Face {i}"), SpentTime::from_stored("0:01:00"), "", ""),
            );
        }
        ledger
    }

    #[tokio::test]
    async fn test_finish_writes_latest_snapshot() -> Result<()> {
        let storage = MemoryStorage::default();
        let writer = LedgerWriter::spawn(storage.clone());

        writer.schedule(ledger_with(1));
        writer.schedule(ledger_with(2));
        writer.schedule(ledger_with(3));
        writer.finish().await?;

        let saved = storage.saved();
        assert!(!saved.is_empty() && saved.len() <= 3);
        assert_eq!(storage.last_saved(), Some(ledger_with(3)));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_save_is_not_fatal() -> Result<()> {
        let storage = MemoryStorage::default();
        storage.set_failing(true);
        let writer = LedgerWriter::spawn(storage.clone());

        writer.schedule(ledger_with(1));
        writer.finish().await?;

        assert!(storage.saved().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_finish_without_snapshots() -> Result<()> {
        let storage = MemoryStorage::default();
        LedgerWriter::spawn(storage.clone()).finish().await?;
        assert!(storage.saved().is_empty());
        Ok(())
    }
}
