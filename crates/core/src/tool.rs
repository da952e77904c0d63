//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in the world:
//! search the web, read files, save notes, schedule reminders.
//! The registry doubles as the executor: [`ToolRegistry::dispatch`] is the
//! boundary where every tool fault becomes a normalized [`ToolResult`],
//! so a single misbehaving tool can never crash the loop.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use crate::error::ToolError;

/// A tool definition handed to the planner so it knows what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: Value,
}

/// The normalized result of a tool dispatch.
///
/// Invariant: `error` is set iff `ok` is false. The constructors are the
/// only way the invariant holds — build results through them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool executed successfully
    pub ok: bool,

    /// Tool-specific payload on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Machine-readable failure reason on error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// A successful result carrying the tool's payload.
    pub fn success(value: Value) -> Self {
        Self {
            ok: true,
            value: Some(value),
            error: None,
        }
    }

    /// A failed result carrying a machine-readable reason.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            value: None,
            error: Some(error.into()),
        }
    }
}

impl From<ToolError> for ToolResult {
    /// Collapse the tool error taxonomy onto the wire-level error strings.
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::NotFound(_) => Self::failure("unknown_tool"),
            ToolError::InvalidArguments(detail) => Self::failure(format!("invalid_args:{detail}")),
            ToolError::ExecutionFailed { reason, .. } => {
                Self::failure(format!("execution_failed:{reason}"))
            }
            ToolError::Timeout { .. } => Self::failure("timeout"),
        }
    }
}

/// The core Tool trait.
///
/// Each tool (web_search, read_file, remember_info, ...) implements this
/// trait. Tools are registered in the ToolRegistry and made available to
/// the planner via their definitions.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "web_search", "read_file").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the planner).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given arguments.
    ///
    /// Implementations validate their own arguments and return
    /// `ToolError::InvalidArguments` on bad input; any internal failure
    /// is `ToolError::ExecutionFailed`. The registry converts both into
    /// a `ToolResult` — implementations never panic on bad input.
    async fn execute(
        &self,
        args: &serde_json::Map<String, Value>,
    ) -> std::result::Result<Value, ToolError>;

    /// Convert this tool into a ToolDefinition for the planner catalog.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// The dispatcher uses this to:
/// 1. Get tool definitions for the planner catalog
/// 2. Look up and execute tools when the planner requests them
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions (for the planner catalog), sorted by name
    /// so the rendered catalog is deterministic.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Execute a tool by name, normalizing every fault into a `ToolResult`.
    ///
    /// This is the executor boundary: unknown tools, argument validation
    /// failures and tool-internal errors all come back as `ok: false`
    /// results rather than propagating upward.
    pub async fn dispatch(&self, name: &str, args: &serde_json::Map<String, Value>) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = %name, "Dispatch of unknown tool");
            return ToolError::NotFound(name.to_string()).into();
        };

        match tool.execute(args).await {
            Ok(value) => ToolResult::success(value),
            Err(err) => {
                warn!(tool = %name, error = %err, "Tool execution failed");
                err.into()
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(
            &self,
            args: &serde_json::Map<String, Value>,
        ) -> std::result::Result<Value, ToolError> {
            let text = args
                .get("text")
                .and_then(Value::as_str)
                .ok_or_else(|| ToolError::InvalidArguments("missing 'text'".into()))?;
            Ok(json!({"echo": text}))
        }
    }

    /// A tool that always fails, for exercising the executor boundary.
    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn name(&self) -> &str {
            "broken"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn execute(
            &self,
            _args: &serde_json::Map<String, Value>,
        ) -> std::result::Result<Value, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "broken".into(),
                reason: "boom".into(),
            })
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn registry_definitions_sorted() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        registry.register(Box::new(BrokenTool));
        let defs = registry.definitions();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "broken");
        assert_eq!(defs[1].name, "echo");
    }

    #[tokio::test]
    async fn dispatch_success() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let args = json!({"text": "hello world"});
        let result = registry.dispatch("echo", args.as_object().unwrap()).await;
        assert!(result.ok);
        assert!(result.error.is_none());
        assert_eq!(result.value.unwrap()["echo"], "hello world");
    }

    #[tokio::test]
    async fn dispatch_unknown_tool() {
        let registry = ToolRegistry::new();
        let result = registry.dispatch("nonexistent", &serde_json::Map::new()).await;
        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("unknown_tool"));
        assert!(result.value.is_none());
    }

    #[tokio::test]
    async fn dispatch_invalid_args() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let result = registry.dispatch("echo", &serde_json::Map::new()).await;
        assert!(!result.ok);
        assert!(result.error.unwrap().starts_with("invalid_args:"));
    }

    #[tokio::test]
    async fn dispatch_execution_failure_does_not_propagate() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(BrokenTool));

        let result = registry.dispatch("broken", &serde_json::Map::new()).await;
        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("execution_failed:boom"));
    }

    #[test]
    fn timeout_maps_to_timeout_string() {
        let result: ToolResult = ToolError::Timeout {
            tool_name: "web_search".into(),
            timeout_secs: 10,
        }
        .into();
        assert_eq!(result.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn result_serialization_omits_empty_fields() {
        let wire = serde_json::to_value(ToolResult::failure("unknown_tool")).unwrap();
        assert_eq!(wire, json!({"ok": false, "error": "unknown_tool"}));

        let wire = serde_json::to_value(ToolResult::success(json!(1))).unwrap();
        assert_eq!(wire, json!({"ok": true, "value": 1}));
    }
}
