//! File-backed journal — one JSON line appended per record.
//!
//! Unlike the stores, the journal never rewrites the file: records are
//! opened in append mode and written one line at a time, so an existing
//! journal from a previous session is extended, not replaced.

use std::io::Write;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use valet_core::error::StoreError;
use valet_core::journal::{Journal, LogRecord};

/// An append-only JSONL journal on disk.
pub struct FileJournal {
    path: PathBuf,
    // Serializes writers so concurrent appends can't interleave lines.
    write_lock: Mutex<()>,
}

impl FileJournal {
    /// Create a journal writing to the given path.
    ///
    /// The file is created lazily on the first append.
    pub fn new(path: PathBuf) -> Self {
        debug!(path = %path.display(), "Journal opened");
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Default path: `~/.valet/journal.jsonl`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".valet").join("journal.jsonl")
    }

    /// Read back every record in the file, skipping corrupted lines.
    pub fn records(&self) -> Result<Vec<LogRecord>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Storage(format!("Failed to read journal: {e}"))),
        };

        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<LogRecord>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted journal entry");
                    None
                }
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl Journal for FileJournal {
    async fn append(&self, record: LogRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create journal directory: {e}"))
            })?;
        }

        let line = serde_json::to_string(&record)
            .map_err(|e| StoreError::Serialization(format!("Failed to serialize record: {e}")))?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::Storage(format!("Failed to open journal: {e}")))?;

        writeln!(file, "{line}")
            .map_err(|e| StoreError::Storage(format!("Failed to write journal: {e}")))
    }
}
