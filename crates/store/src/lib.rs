//! Store implementations for Valet.
//!
//! File-backed JSONL ledgers for production use, in-memory variants for
//! tests. Both honor the single-writer, read-after-write contract from
//! `valet-core`.

pub mod in_memory;
pub mod notes;
pub mod reminders;

pub use in_memory::{InMemoryNotes, InMemoryReminders};
pub use notes::FileNoteStore;
pub use reminders::FileReminderStore;
