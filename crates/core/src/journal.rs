//! Journal trait — the append-only structured audit log.
//!
//! Every decision, tool call, error, and final response in the loop is
//! recorded as one `LogRecord`. Records are append-only and monotonically
//! ordered by time; the file-backed implementation lives in the journal
//! crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

/// What kind of event a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    /// The planner produced an action
    Decision,
    /// A tool was dispatched
    ToolCall,
    /// Something went wrong
    Error,
    /// The final answer emitted to the user
    Response,
}

/// One structured log line: `{timestamp, kind, payload}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// When the event happened
    pub timestamp: DateTime<Utc>,

    /// Event kind
    pub kind: LogKind,

    /// Event-specific payload
    pub payload: Value,
}

impl LogRecord {
    /// Create a record stamped with the current time.
    pub fn new(kind: LogKind, payload: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            payload,
        }
    }
}

/// An append-only sink for log records.
#[async_trait]
pub trait Journal: Send + Sync {
    /// Append a record; persisted before this returns.
    async fn append(&self, record: LogRecord) -> std::result::Result<(), StoreError>;
}
