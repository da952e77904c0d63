//! In-memory journal for tests and ephemeral sessions.

use tokio::sync::Mutex;
use valet_core::error::StoreError;
use valet_core::journal::{Journal, LogRecord};

/// Collects records in a `Vec`; inspect them with [`MemoryJournal::records`].
#[derive(Default)]
pub struct MemoryJournal {
    records: Mutex<Vec<LogRecord>>,
    fail_appends: bool,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A journal whose appends always fail, for exercising error paths.
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_appends: true,
        }
    }

    /// Snapshot of everything appended so far.
    pub async fn records(&self) -> Vec<LogRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl Journal for MemoryJournal {
    async fn append(&self, record: LogRecord) -> Result<(), StoreError> {
        if self.fail_appends {
            return Err(StoreError::Storage("journal unavailable".to_string()));
        }
        self.records.lock().await.push(record);
        Ok(())
    }
}
