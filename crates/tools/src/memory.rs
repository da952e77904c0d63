//! Note tools — durable free-text memory.
//!
//! `remember_info` appends a note; `recall_memory` returns the most recent
//! notes (capped at 20 so the planner prompt stays bounded).

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use valet_core::error::ToolError;
use valet_core::store::MemoryStore;
use valet_core::tool::Tool;

/// Most recent notes returned by a recall.
const RECALL_LIMIT: usize = 20;

pub struct RememberInfoTool {
    store: Arc<dyn MemoryStore>,
}

impl RememberInfoTool {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for RememberInfoTool {
    fn name(&self) -> &str {
        "remember_info"
    }

    fn description(&self) -> &str {
        "Save a piece of information to long-term memory so it can be recalled later."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "note": {
                    "type": "string",
                    "description": "The information to remember"
                }
            },
            "required": ["note"]
        })
    }

    async fn execute(
        &self,
        args: &serde_json::Map<String, Value>,
    ) -> std::result::Result<Value, ToolError> {
        let note = args
            .get("note")
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'note' argument".into()))?;

        let saved = self
            .store
            .append(note)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "remember_info".into(),
                reason: e.to_string(),
            })?;

        Ok(serde_json::json!({
            "id": saved.id,
            "created_at": saved.created_at,
        }))
    }
}

pub struct RecallMemoryTool {
    store: Arc<dyn MemoryStore>,
}

impl RecallMemoryTool {
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for RecallMemoryTool {
    fn name(&self) -> &str {
        "recall_memory"
    }

    fn description(&self) -> &str {
        "Retrieve previously saved notes from long-term memory (most recent first, up to 20)."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(
        &self,
        _args: &serde_json::Map<String, Value>,
    ) -> std::result::Result<Value, ToolError> {
        let notes = self
            .store
            .list()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "recall_memory".into(),
                reason: e.to_string(),
            })?;

        // Most recent first, capped so the observation stays small.
        let recent: Vec<Value> = notes
            .iter()
            .rev()
            .take(RECALL_LIMIT)
            .map(|n| {
                serde_json::json!({
                    "id": n.id,
                    "content": n.content,
                    "created_at": n.created_at,
                })
            })
            .collect();

        Ok(Value::Array(recent))
    }
}
