//! File-based note store — persistent JSONL storage.
//!
//! Each line is a JSON-encoded `MemoryNote`. Notes are loaded into memory
//! on creation and flushed to disk on every append, which gives fast reads
//! with durable writes. Simple, portable, human-inspectable.
//!
//! Storage location: `~/.valet/memory.jsonl` by default.

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;
use valet_core::error::StoreError;
use valet_core::store::{MemoryNote, MemoryStore};

/// A file-backed note ledger using JSONL (one JSON object per line).
pub struct FileNoteStore {
    path: PathBuf,
    notes: Arc<RwLock<Vec<MemoryNote>>>,
}

impl FileNoteStore {
    /// Create a new file-backed store at the given path.
    ///
    /// If the file exists, notes are loaded from it.
    /// If the file does not exist, starts empty (file created on first write).
    pub fn new(path: PathBuf) -> Self {
        let notes = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = notes.len(), "Note store loaded");
        Self {
            path,
            notes: Arc::new(RwLock::new(notes)),
        }
    }

    /// Default path: `~/.valet/memory.jsonl`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".valet").join("memory.jsonl")
    }

    /// Load notes from a JSONL file, skipping corrupted lines.
    fn load_from_disk(path: &PathBuf) -> Vec<MemoryNote> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(), // File doesn't exist yet — start empty
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<MemoryNote>(line) {
                Ok(note) => Some(note),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted note entry");
                    None
                }
            })
            .collect()
    }

    /// Flush all notes to disk as JSONL.
    async fn flush(&self) -> Result<(), StoreError> {
        let notes = self.notes.read().await;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create store directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for note in notes.iter() {
            let line = serde_json::to_string(note)
                .map_err(|e| StoreError::Serialization(format!("Failed to serialize note: {e}")))?;
            content.push_str(&line);
            content.push('\n');
        }

        std::fs::write(&self.path, &content)
            .map_err(|e| StoreError::Storage(format!("Failed to write note file: {e}")))
    }
}

#[async_trait]
impl MemoryStore for FileNoteStore {
    async fn append(&self, content: &str) -> Result<MemoryNote, StoreError> {
        let note = MemoryNote {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.notes.write().await.push(note.clone());
        self.flush().await?;
        Ok(note)
    }

    async fn list(&self) -> Result<Vec<MemoryNote>, StoreError> {
        Ok(self.notes.read().await.clone())
    }

    async fn find(&self, needle: &str) -> Result<Vec<MemoryNote>, StoreError> {
        let needle = needle.to_lowercase();
        let notes = self.notes.read().await;
        Ok(notes
            .iter()
            .filter(|n| n.content.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}
