//! Action — the structured decision output of the planner.
//!
//! Every planning cycle produces exactly one `Action`: either a direct
//! textual answer or a request to invoke one named tool. The wire form is
//! a tagged JSON object:
//!
//! ```json
//! {"action": "respond", "text": "..."}
//! {"action": "tool", "name": "web_search", "args": {"query": "..."}}
//! ```
//!
//! Untyped payloads from a generation backend never flow past this module:
//! [`Action::parse`] validates them at the boundary and fails with a
//! [`SchemaError`] that carries the offending payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// A validated planner decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    /// Answer the user directly with `text`.
    Respond { text: String },

    /// Invoke the tool `name` with `args`.
    #[serde(rename = "tool")]
    ToolCall {
        name: String,
        #[serde(default)]
        args: serde_json::Map<String, Value>,
    },
}

impl Action {
    /// Create a respond action.
    pub fn respond(text: impl Into<String>) -> Self {
        Self::Respond { text: text.into() }
    }

    /// Validate a candidate payload against the action schema.
    ///
    /// Rules:
    /// - `action` is required and must be `"respond"` or `"tool"`
    /// - `respond` requires a string `text`
    /// - `tool` requires a non-empty string `name`; `args` defaults to an
    ///   empty map and must be an object when present
    ///
    /// Never panics. Callers (the planner) convert failures into a
    /// fallback respond action rather than surfacing them.
    pub fn parse(payload: &Value) -> std::result::Result<Action, SchemaError> {
        let obj = payload.as_object().ok_or_else(|| SchemaError::WrongType {
            field: "action",
            expected: "part of a JSON object",
            payload: payload.clone(),
        })?;

        let kind = obj.get("action").ok_or_else(|| SchemaError::MissingField {
            field: "action",
            payload: payload.clone(),
        })?;

        match kind.as_str() {
            Some("respond") => {
                let text = obj.get("text").ok_or_else(|| SchemaError::MissingField {
                    field: "text",
                    payload: payload.clone(),
                })?;
                let text = text.as_str().ok_or_else(|| SchemaError::WrongType {
                    field: "text",
                    expected: "a string",
                    payload: payload.clone(),
                })?;
                Ok(Action::Respond { text: text.into() })
            }
            Some("tool") => {
                let name = obj.get("name").ok_or_else(|| SchemaError::MissingField {
                    field: "name",
                    payload: payload.clone(),
                })?;
                let name = name.as_str().ok_or_else(|| SchemaError::WrongType {
                    field: "name",
                    expected: "a string",
                    payload: payload.clone(),
                })?;
                if name.is_empty() {
                    return Err(SchemaError::WrongType {
                        field: "name",
                        expected: "a non-empty string",
                        payload: payload.clone(),
                    });
                }

                let args = match obj.get("args") {
                    None | Some(Value::Null) => serde_json::Map::new(),
                    Some(Value::Object(map)) => map.clone(),
                    Some(_) => {
                        return Err(SchemaError::WrongType {
                            field: "args",
                            expected: "an object",
                            payload: payload.clone(),
                        });
                    }
                };

                Ok(Action::ToolCall {
                    name: name.into(),
                    args,
                })
            }
            _ => Err(SchemaError::UnknownAction {
                value: kind.clone(),
                payload: payload.clone(),
            }),
        }
    }
}
