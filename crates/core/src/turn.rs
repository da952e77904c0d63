//! Conversation turn and context window domain types.
//!
//! These are the value objects the control loop revolves around:
//! the user speaks → the planner decides → tools observe → the agent
//! answers. Each step is one `ConversationTurn`; the ordered set handed
//! to the planner is a `ContextWindow`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of a turn in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The agent's answer (also used for the compaction summary turn)
    Agent,
    /// A tool observation
    Tool,
}

/// A single turn in the conversation. Insertion order is chronological.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who produced this turn
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Create a new user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new agent turn.
    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new tool observation turn.
    pub fn tool(content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The ordered conversation history handed to the planner.
///
/// When compaction has occurred, a single summary turn representing the
/// discarded prefix is prepended ahead of the retained recent turns.
/// The compaction policy itself lives in the agent crate; this type only
/// guarantees the ordering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextWindow {
    /// Summary of compacted-away turns, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ConversationTurn>,

    /// Recent turns, oldest first.
    pub turns: Vec<ConversationTurn>,
}

impl ContextWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total turn count, counting the summary turn when present.
    pub fn len(&self) -> usize {
        self.turns.len() + usize::from(self.summary.is_some())
    }

    /// True when the window holds no turns at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate turns in chronological order, summary first.
    pub fn iter(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.summary.iter().chain(self.turns.iter())
    }

    /// The most recent turn, if any.
    pub fn latest(&self) -> Option<&ConversationTurn> {
        self.turns.last().or(self.summary.as_ref())
    }

    /// The most recent user turn, if any.
    pub fn latest_user(&self) -> Option<&ConversationTurn> {
        self.turns.iter().rev().find(|t| t.role == Role::User)
    }
}
