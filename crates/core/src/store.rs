//! Store traits — durable, single-writer note and reminder ledgers.
//!
//! The loop is the only mutator of either store. Implementations must
//! persist every mutation before returning, and a read immediately
//! following a write must observe that write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A single long-term memory note. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryNote {
    /// Unique ID for this note
    pub id: String,

    /// The note content
    pub content: String,

    /// When this note was created
    pub created_at: DateTime<Utc>,
}

/// A scheduled reminder.
///
/// Mutated only to flip `fired` once surfaced by a due-check, or removed
/// on explicit deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    /// Unique ID for this reminder
    pub id: String,

    /// The reminder text
    pub text: String,

    /// When this reminder becomes due
    pub due_at: DateTime<Utc>,

    /// Whether a due-check has already surfaced this reminder
    #[serde(default)]
    pub fired: bool,
}

/// The append-only note ledger.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Append a note; the note is persisted before this returns.
    async fn append(&self, content: &str) -> std::result::Result<MemoryNote, StoreError>;

    /// All notes in append order.
    async fn list(&self) -> std::result::Result<Vec<MemoryNote>, StoreError>;

    /// Notes whose content contains `needle` (case-insensitive), in append order.
    async fn find(&self, needle: &str) -> std::result::Result<Vec<MemoryNote>, StoreError>;
}

/// The reminder ledger with due-time queries.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Append a reminder; persisted before this returns.
    async fn append(
        &self,
        text: &str,
        due_at: DateTime<Utc>,
    ) -> std::result::Result<Reminder, StoreError>;

    /// All reminders in append order, fired or not.
    async fn list(&self) -> std::result::Result<Vec<Reminder>, StoreError>;

    /// All unfired reminders with `due_at <= now`, flipping their `fired`
    /// flag before returning (at-most-once delivery: a reminder surfaced
    /// here is never returned by a later due-check).
    async fn due(&self, now: DateTime<Utc>) -> std::result::Result<Vec<Reminder>, StoreError>;

    /// Delete a reminder by ID. Returns whether anything was removed.
    async fn delete(&self, id: &str) -> std::result::Result<bool, StoreError>;
}
