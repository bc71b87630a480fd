use std::{
    future::Future,
    path::{Path, PathBuf},
};

use tracing::error;

use crate::{
    error::{Result, TrackerError},
    fs::document::{quarantine, read_document, write_document},
};

use super::{entities::LedgerDocument, Ledger};

pub const LEDGER_FILE: &str = "ledger.json";

/// Interface for abstracting storage of the ledger. The ledger is always transferred whole.
pub trait LedgerStorage {
    fn load(&self) -> impl Future<Output = Result<Ledger>> + Send;

    /// Replaces the stored ledger. Implementations must not leave a partially written ledger
    /// behind if the process dies midway.
    fn save(&self, ledger: &Ledger) -> impl Future<Output = Result<()>> + Send;
}

/// The main realization of [LedgerStorage], a single JSON document.
pub struct LedgerFile {
    path: PathBuf,
}

impl LedgerFile {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(LEDGER_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the ledger, falling back to an empty one so the application can still start.
    /// A document that can't be parsed is moved aside first, so the next save doesn't overwrite
    /// the only copy of it.
    pub async fn load_or_empty(&self) -> Ledger {
        match self.load().await {
            Ok(ledger) => ledger,
            Err(e @ TrackerError::Format { .. }) => {
                error!("Ledger is unreadable, starting with an empty one: {e}");
                if let Err(e) = quarantine(&self.path).await {
                    error!("Failed to move the unreadable ledger aside: {e}");
                }
                Ledger::new()
            }
            Err(e) => {
                error!("Failed to load the ledger, starting with an empty one: {e}");
                Ledger::new()
            }
        }
    }
}

impl LedgerStorage for LedgerFile {
    async fn load(&self) -> Result<Ledger> {
        let document = read_document::<LedgerDocument>(&self.path)
            .await?
            .unwrap_or_default();
        Ok(Ledger::load(document))
    }

    async fn save(&self, ledger: &Ledger) -> Result<()> {
        write_document(&self.path, &ledger.save()).await
    }
}

#[cfg(test)]
pub mod test_storage {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    };

    use crate::{
        error::{Result, TrackerError},
        ledger::Ledger,
    };

    use super::LedgerStorage;

    /// Keeps every saved snapshot in memory. Saves can be made to fail on demand.
    #[derive(Clone, Default)]
    pub struct MemoryStorage {
        saved: Arc<Mutex<Vec<Ledger>>>,
        failing: Arc<AtomicBool>,
    }

    impl MemoryStorage {
        pub fn saved(&self) -> Vec<Ledger> {
            self.saved.lock().unwrap().clone()
        }

        pub fn last_saved(&self) -> Option<Ledger> {
            self.saved.lock().unwrap().last().cloned()
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    impl LedgerStorage for MemoryStorage {
        async fn load(&self) -> Result<Ledger> {
            Ok(self.last_saved().unwrap_or_default())
        }

        async fn save(&self, ledger: &Ledger) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(TrackerError::persistence(
                    "memory",
                    std::io::Error::other("disk full"),
                ));
            }
            self.saved.lock().unwrap().push(ledger.clone());
            Ok(())
        }
    }
}
