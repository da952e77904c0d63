//! # Valet Core
//!
//! Domain types, traits, and error definitions for the Valet agent loop.
//! This crate has **zero framework dependencies** — it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod action;
pub mod backend;
pub mod error;
pub mod journal;
pub mod store;
pub mod tool;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use action::Action;
pub use backend::TextBackend;
pub use error::{BackendError, Error, Result, SchemaError, StoreError, ToolError};
pub use journal::{Journal, LogKind, LogRecord};
pub use store::{MemoryNote, MemoryStore, Reminder, ReminderStore};
pub use tool::{Tool, ToolDefinition, ToolRegistry, ToolResult};
pub use turn::{ContextWindow, ConversationTurn, Role};
