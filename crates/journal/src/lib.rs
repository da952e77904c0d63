//! Journal implementations for Valet.
//!
//! The journal is the agent's flight recorder: every planner decision, tool
//! call, error, and final response is appended as one JSON line. Records are
//! never rewritten, so the file reads as a faithful chronology of a session.

pub mod file;
pub mod memory;

pub use file::FileJournal;
pub use memory::MemoryJournal;
