//! File-based reminder store — persistent JSONL storage.
//!
//! Same layout as the note store: one JSON-encoded `Reminder` per line,
//! loaded at startup, flushed on every mutation. The due-check flips the
//! `fired` flag *and persists it* before returning, so a reminder is
//! delivered at most once even across restarts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;
use valet_core::error::StoreError;
use valet_core::store::{Reminder, ReminderStore};

/// A file-backed reminder ledger using JSONL.
pub struct FileReminderStore {
    path: PathBuf,
    reminders: Arc<RwLock<Vec<Reminder>>>,
}

impl FileReminderStore {
    /// Create a new file-backed store at the given path.
    pub fn new(path: PathBuf) -> Self {
        let reminders = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = reminders.len(), "Reminder store loaded");
        Self {
            path,
            reminders: Arc::new(RwLock::new(reminders)),
        }
    }

    /// Default path: `~/.valet/reminders.jsonl`
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".valet").join("reminders.jsonl")
    }

    fn load_from_disk(path: &PathBuf) -> Vec<Reminder> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<Reminder>(line) {
                Ok(reminder) => Some(reminder),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted reminder entry");
                    None
                }
            })
            .collect()
    }

    async fn flush(&self) -> Result<(), StoreError> {
        let reminders = self.reminders.read().await;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create store directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for reminder in reminders.iter() {
            let line = serde_json::to_string(reminder).map_err(|e| {
                StoreError::Serialization(format!("Failed to serialize reminder: {e}"))
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        std::fs::write(&self.path, &content)
            .map_err(|e| StoreError::Storage(format!("Failed to write reminder file: {e}")))
    }
}

#[async_trait]
impl ReminderStore for FileReminderStore {
    async fn append(&self, text: &str, due_at: DateTime<Utc>) -> Result<Reminder, StoreError> {
        let reminder = Reminder {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            due_at,
            fired: false,
        };
        self.reminders.write().await.push(reminder.clone());
        self.flush().await?;
        Ok(reminder)
    }

    async fn list(&self) -> Result<Vec<Reminder>, StoreError> {
        Ok(self.reminders.read().await.clone())
    }

    async fn due(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>, StoreError> {
        let mut fired = Vec::new();
        {
            let mut reminders = self.reminders.write().await;
            for r in reminders.iter_mut() {
                if !r.fired && r.due_at <= now {
                    r.fired = true;
                    fired.push(r.clone());
                }
            }
        }
        if !fired.is_empty() {
            self.flush().await?;
        }
        Ok(fired)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let deleted = {
            let mut reminders = self.reminders.write().await;
            let len_before = reminders.len();
            reminders.retain(|r| r.id != id);
            reminders.len() < len_before
        };
        if deleted {
            self.flush().await?;
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::NamedTempFile;

    fn temp_path() -> PathBuf {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_path_buf();
        drop(tmp);
        path
    }

    #[tokio::test]
    async fn due_check_is_at_most_once() {
        let store = FileReminderStore::new(temp_path());
        let now = Utc::now();

        store.append("past", now - Duration::minutes(1)).await.unwrap();
        store.append("exactly now", now).await.unwrap();
        store.append("future", now + Duration::minutes(1)).await.unwrap();

        // First check: the T-1 and T reminders fire
        let fired = store.due(now).await.unwrap();
        let texts: Vec<&str> = fired.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["past", "exactly now"]);
        assert!(fired.iter().all(|r| r.fired));

        // Second check: neither comes back
        let fired_again = store.due(now).await.unwrap();
        assert!(fired_again.is_empty());
    }

    #[tokio::test]
    async fn fired_flag_survives_reload() {
        let path = temp_path();
        let now = Utc::now();

        let store = FileReminderStore::new(path.clone());
        store.append("due soon", now).await.unwrap();
        assert_eq!(store.due(now).await.unwrap().len(), 1);

        // Reload — the fired flag was persisted, so nothing is due
        let store2 = FileReminderStore::new(path);
        assert!(store2.due(now).await.unwrap().is_empty());
        assert!(store2.list().await.unwrap()[0].fired);
    }

    #[tokio::test]
    async fn future_reminder_fires_after_its_due_time() {
        let store = FileReminderStore::new(temp_path());
        let now = Utc::now();
        let r = store.append("call mom", now + Duration::minutes(10)).await.unwrap();
        assert!(!r.id.is_empty());

        assert!(store.due(now).await.unwrap().is_empty());

        // Ten minutes later it surfaces
        let fired = store.due(now + Duration::minutes(10)).await.unwrap();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].text, "call mom");
    }

    #[tokio::test]
    async fn delete_persists() {
        let path = temp_path();
        let store = FileReminderStore::new(path.clone());
        let r = store.append("to be removed", Utc::now()).await.unwrap();

        assert!(store.delete(&r.id).await.unwrap());
        assert!(!store.delete(&r.id).await.unwrap());

        let store2 = FileReminderStore::new(path);
        assert!(store2.list().await.unwrap().is_empty());
    }
}
