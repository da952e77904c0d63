//! In-memory store implementations.
//!
//! Same contracts as the file-backed stores without touching disk. Used by
//! tests and by callers that want an ephemeral session.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use valet_core::error::StoreError;
use valet_core::store::{MemoryNote, MemoryStore, Reminder, ReminderStore};

/// Ephemeral note store backed by a `Vec`.
#[derive(Default)]
pub struct InMemoryNotes {
    notes: Arc<RwLock<Vec<MemoryNote>>>,
}

impl InMemoryNotes {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryStore for InMemoryNotes {
    async fn append(&self, content: &str) -> Result<MemoryNote, StoreError> {
        let note = MemoryNote {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.notes.write().await.push(note.clone());
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

/// Ephemeral reminder store backed by a `Vec`.
#[derive(Default)]
pub struct InMemoryReminders {
    reminders: Arc<RwLock<Vec<Reminder>>>,
}

impl InMemoryReminders {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReminderStore for InMemoryReminders {
    async fn append(&self, text: &str, due_at: DateTime<Utc>) -> Result<Reminder, StoreError> {
        let reminder = Reminder {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            due_at,
            fired: false,
        };
        self.reminders.write().await.push(reminder.clone());
        Ok(reminder)
    }

    async fn list(&self) -> Result<Vec<Reminder>, StoreError> {
        Ok(self.reminders.read().await.clone())
    }

    async fn due(&self, now: DateTime<Utc>) -> Result<Vec<Reminder>, StoreError> {
        let mut fired = Vec::new();
        let mut reminders = self.reminders.write().await;
        for r in reminders.iter_mut() {
            if !r.fired && r.due_at <= now {
                r.fired = true;
                fired.push(r.clone());
            }
        }
        Ok(fired)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut reminders = self.reminders.write().await;
        let len_before = reminders.len();
        reminders.retain(|r| r.id != id);
        Ok(reminders.len() < len_before)
    }
}
