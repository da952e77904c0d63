//! File read tool — sandboxed to a root directory, with size limits.
//!
//! Paths are resolved relative to the configured root and must stay inside
//! it after canonicalization. Files over 200 KiB are refused outright;
//! content over 4000 characters is truncated with a marker.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;
use valet_core::error::ToolError;
use valet_core::tool::Tool;

/// Largest file the tool will open at all.
const MAX_FILE_BYTES: u64 = 200 * 1024;

/// Longest content returned to the planner.
const MAX_CONTENT_CHARS: usize = 4000;

pub struct ReadFileTool {
    root: PathBuf,
}

impl ReadFileTool {
    /// Create a read tool sandboxed to `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve `path` against the root and verify it stays inside.
    fn resolve(&self, path: &str) -> Result<PathBuf, ToolError> {
        let requested = Path::new(path);
        let joined = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.root.join(requested)
        };

        let root = self.root.canonicalize().map_err(|e| {
            ToolError::ExecutionFailed {
                tool_name: "read_file".into(),
                reason: format!("workspace root unavailable: {e}"),
            }
        })?;

        // Canonicalize to defeat `..` traversal and symlink escapes.
        let resolved = joined.canonicalize().map_err(|_| {
            ToolError::InvalidArguments(format!("path not found: {path}"))
        })?;

        if !resolved.starts_with(&root) {
            return Err(ToolError::InvalidArguments(format!(
                "path escapes the workspace root: {path}"
            )));
        }

        Ok(resolved)
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a text file inside the workspace. Large files are truncated."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to read, relative to the workspace root"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(
        &self,
        args: &serde_json::Map<String, Value>,
    ) -> std::result::Result<Value, ToolError> {
        let path = args
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'path' argument".into()))?;

        let resolved = self.resolve(path)?;
        debug!(path = %resolved.display(), "Reading file");

        let meta = tokio::fs::metadata(&resolved)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "read_file".into(),
                reason: format!("cannot stat file: {e}"),
            })?;

        if !meta.is_file() {
            return Err(ToolError::InvalidArguments(format!(
                "not a regular file: {path}"
            )));
        }

        if meta.len() > MAX_FILE_BYTES {
            return Err(ToolError::InvalidArguments(format!(
                "file too large: {} bytes (limit {MAX_FILE_BYTES})",
                meta.len()
            )));
        }

        let content = tokio::fs::read_to_string(&resolved)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "read_file".into(),
                reason: format!("failed to read file: {e}"),
            })?;

        let (content, truncated) = if content.chars().count() > MAX_CONTENT_CHARS {
            let cut: String = content.chars().take(MAX_CONTENT_CHARS).collect();
            (cut, true)
        } else {
            (content, false)
        };

        Ok(serde_json::json!({
            "path": path,
            "content": content,
            "truncated": truncated,
        }))
    }
}
