//! Planners — the action selection step of the loop.
//!
//! A planner looks at the conversation window and the tool catalog and
//! decides what happens next: answer the user directly, or call a tool.
//! `decide` is infallible by contract; a planner absorbs its own faults
//! and falls back to a plain response rather than wedging the loop.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use valet_core::action::Action;
use valet_core::backend::TextBackend;
use valet_core::tool::{ToolDefinition, ToolResult};
use valet_core::turn::{ContextWindow, Role};

/// Reply used when nothing better can be said.
const FALLBACK_REPLY: &str = "Sorry, I couldn't work out a response to that. Could you rephrase?";

/// Decides the next action for a turn.
#[async_trait]
pub trait Planner: Send + Sync {
    fn name(&self) -> &str;

    /// Choose the next action. Never fails: planner-internal problems
    /// degrade to a fallback `Respond`.
    async fn decide(&self, window: &ContextWindow, catalog: &[ToolDefinition]) -> Action;
}

// --- Backend planner ---

/// A planner that asks a text backend for a JSON action.
///
/// The prompt carries the tool catalog and the transcript; the backend is
/// asked to reply with exactly one action object. Anything unparseable is
/// treated as prose and returned as a direct response.
pub struct BackendPlanner {
    backend: Arc<dyn TextBackend>,
}

impl BackendPlanner {
    pub fn new(backend: Arc<dyn TextBackend>) -> Self {
        Self { backend }
    }

    /// Render the planning prompt: instructions, catalog, transcript.
    fn render_prompt(window: &ContextWindow, catalog: &[ToolDefinition]) -> String {
        let mut prompt = String::from(
            "You are Valet, a personal assistant. Decide your next step and reply \
             with exactly one JSON object, nothing else.\n\
             To answer the user directly: {\"action\":\"respond\",\"text\":\"...\"}\n\
             To call a tool: {\"action\":\"tool\",\"name\":\"...\",\"args\":{...}}\n\n\
             Available tools:\n",
        );

        for def in catalog {
            prompt.push_str(&format!(
                "- {}: {} (parameters: {})\n",
                def.name, def.description, def.parameters
            ));
        }

        prompt.push_str(
            "\nOlder parts of the conversation may have been compacted into a short \
             summary turn; treat that summary as sufficient prior context.\n",
        );

        prompt.push_str("\nConversation so far:\n");
        for turn in window.iter() {
            let role = match turn.role {
                Role::User => "user",
                Role::Agent => "agent",
                Role::Tool => "tool",
            };
            prompt.push_str(&format!("{role}: {}\n", turn.content));
        }

        prompt.push_str("\nYour JSON action:");
        prompt
    }

    /// Interpret the backend's raw reply as an action.
    ///
    /// A well-formed action object is taken as-is. Non-JSON prose becomes
    /// a direct response. An empty reply falls back to an apology.
    fn interpret(raw: &str) -> Action {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Action::respond(FALLBACK_REPLY);
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(payload) => match Action::parse(&payload) {
                Ok(action) => action,
                Err(e) => {
                    warn!(error = %e, "Backend produced an invalid action, responding with fallback");
                    Action::respond(FALLBACK_REPLY)
                }
            },
            // Not JSON at all: treat the reply as prose.
            Err(_) => Action::respond(trimmed),
        }
    }
}

#[async_trait]
impl Planner for BackendPlanner {
    fn name(&self) -> &str {
        "backend"
    }

    async fn decide(&self, window: &ContextWindow, catalog: &[ToolDefinition]) -> Action {
        let prompt = Self::render_prompt(window, catalog);

        match self.backend.generate(&prompt).await {
            Ok(raw) => Self::interpret(&raw),
            Err(e) => {
                warn!(backend = %self.backend.name(), error = %e, "Backend call failed");
                Action::respond(FALLBACK_REPLY)
            }
        }
    }
}

// --- Rule planner ---

/// A deterministic keyword planner that needs no backend.
///
/// Useful offline and as the reference behavior in tests: the same window
/// always yields the same action. Rules are checked in a fixed order, so
/// "check my reminders" hits the reminder check before the generic
/// "remind" rule can schedule anything.
pub struct RulePlanner;

impl RulePlanner {
    /// Turn the latest tool observation into a user-facing reply.
    fn fold_observation(content: &str) -> Action {
        let result: ToolResult = match serde_json::from_str(content) {
            Ok(r) => r,
            Err(_) => return Action::respond("The tool returned something I couldn't read."),
        };

        if result.ok {
            let value = result.value.unwrap_or(Value::Null);
            Action::respond(format!("Here's what I found: {value}"))
        } else {
            let reason = result.error.unwrap_or_else(|| "unknown error".into());
            Action::respond(format!("The tool ran into a problem ({reason})."))
        }
    }
}

#[async_trait]
impl Planner for RulePlanner {
    fn name(&self) -> &str {
        "rules"
    }

    async fn decide(&self, window: &ContextWindow, _catalog: &[ToolDefinition]) -> Action {
        // After a tool ran, the follow-up decision folds its observation
        // into a reply instead of chaining another call.
        if let Some(latest) = window.latest()
            && latest.role == Role::Tool
        {
            return Self::fold_observation(&latest.content);
        }

        let Some(user_turn) = window.latest_user() else {
            return Action::respond(FALLBACK_REPLY);
        };
        let text = user_turn.content.trim();
        let lower = text.to_lowercase();

        debug!(input = %text, "Rule planner matching");

        // Read intents on reminders must win before the scheduling rule.
        if (lower.contains("check") && lower.contains("reminder"))
            || lower.contains("any reminders")
            || lower.contains("show my reminders")
        {
            return Action::ToolCall {
                name: "check_reminders".into(),
                args: serde_json::Map::new(),
            };
        }

        if let Some(i) = lower.find("remember") {
            let rest = text.get(i + "remember".len()..).map(str::trim).unwrap_or("");
            let note = if rest.is_empty() { text } else { rest };
            let mut args = serde_json::Map::new();
            args.insert("note".into(), Value::String(note.to_string()));
            return Action::ToolCall {
                name: "remember_info".into(),
                args,
            };
        }

        if lower.contains("recall") || lower.contains("memory") {
            return Action::ToolCall {
                name: "recall_memory".into(),
                args: serde_json::Map::new(),
            };
        }

        if lower.contains("search") || lower.contains("news") {
            let mut args = serde_json::Map::new();
            args.insert("query".into(), Value::String(text.to_string()));
            return Action::ToolCall {
                name: "web_search".into(),
                args,
            };
        }

        if lower.contains("remind") {
            let mut args = serde_json::Map::new();
            args.insert("text".into(), Value::String(text.to_string()));
            args.insert("due_at".into(), Value::String("+5m".into()));
            return Action::ToolCall {
                name: "set_reminder".into(),
                args,
            };
        }

        Action::respond(format!("You said: {text}"))
    }
}
