//! Built-in tools for Valet.
//!
//! Six tools cover the assistant's capabilities:
//! - `web_search` — deterministic stub search results
//! - `read_file` — sandboxed file reading with size limits
//! - `remember_info` / `recall_memory` — durable notes
//! - `set_reminder` / `check_reminders` — scheduled reminders
//!
//! All tools validate their own arguments and return `ToolError` on bad
//! input; the registry normalizes faults at the dispatch boundary.

pub mod memory;
pub mod read_file;
pub mod reminders;
pub mod web_search;

pub use memory::{RecallMemoryTool, RememberInfoTool};
pub use read_file::ReadFileTool;
pub use reminders::{CheckRemindersTool, SetReminderTool};
pub use web_search::WebSearchTool;

use std::path::PathBuf;
use std::sync::Arc;
use valet_core::store::{MemoryStore, ReminderStore};
use valet_core::tool::ToolRegistry;

/// Build a registry with the full built-in tool set.
pub fn default_registry(
    notes: Arc<dyn MemoryStore>,
    reminders: Arc<dyn ReminderStore>,
    workspace_root: PathBuf,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WebSearchTool));
    registry.register(Box::new(ReadFileTool::new(workspace_root)));
    registry.register(Box::new(RememberInfoTool::new(notes.clone())));
    registry.register(Box::new(RecallMemoryTool::new(notes)));
    registry.register(Box::new(SetReminderTool::new(reminders.clone())));
    registry.register(Box::new(CheckRemindersTool::new(reminders)));
    registry
}
