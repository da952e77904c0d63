//! The dispatcher — one conversation turn from input to reply.
//!
//! Each call to [`Dispatcher::handle`] runs the turn state machine:
//! plan, maybe execute one tool, plan again, reply. Every step is
//! journaled; a journal failure aborts the turn rather than losing the
//! audit trail.

use std::sync::Arc;
use tracing::{debug, error, info, warn};
use valet_core::action::Action;
use valet_core::journal::{Journal, LogKind, LogRecord};
use valet_core::tool::ToolRegistry;
use valet_core::turn::ConversationTurn;

use crate::context::ContextManager;
use crate::planner::Planner;

/// Reply used when the journal cannot persist the turn.
const JOURNAL_FAILURE_REPLY: &str =
    "Something went wrong while recording this conversation. Please try again.";

/// Drives the per-turn loop: planner, tools, journal, context.
pub struct Dispatcher {
    planner: Arc<dyn Planner>,
    tools: Arc<ToolRegistry>,
    journal: Arc<dyn Journal>,
    context: ContextManager,
}

impl Dispatcher {
    pub fn new(
        planner: Arc<dyn Planner>,
        tools: Arc<ToolRegistry>,
        journal: Arc<dyn Journal>,
        context: ContextManager,
    ) -> Self {
        Self {
            planner,
            tools,
            journal,
            context,
        }
    }

    /// The conversation window, for inspection.
    pub fn context(&self) -> &ContextManager {
        &self.context
    }

    /// Handle one user input and produce the reply.
    ///
    /// At most one tool executes per turn, and at most two planner calls
    /// are made. A follow-up decision that asks for another tool is
    /// degraded to a direct reply so a turn can never loop.
    pub async fn handle(&mut self, input: &str) -> String {
        info!(planner = %self.planner.name(), "Handling turn");

        self.context.append(ConversationTurn::user(input));
        let catalog = self.tools.definitions();

        let decision = self.planner.decide(self.context.window(), &catalog).await;
        if self.journal_decision(&decision).await.is_err() {
            return JOURNAL_FAILURE_REPLY.to_string();
        }

        let reply = match decision {
            Action::Respond { text } => text,
            Action::ToolCall { name, args } => {
                let result = self.tools.dispatch(&name, &args).await;
                debug!(tool = %name, ok = result.ok, "Tool dispatched");

                let journaled = self
                    .journal
                    .append(LogRecord::new(
                        LogKind::ToolCall,
                        serde_json::json!({
                            "name": &name,
                            "args": &args,
                            "result": &result,
                        }),
                    ))
                    .await;
                if self.check(journaled).is_err() {
                    return JOURNAL_FAILURE_REPLY.to_string();
                }

                if !result.ok {
                    let journaled = self
                        .journal
                        .append(LogRecord::new(
                            LogKind::Error,
                            serde_json::json!({
                                "tool": &name,
                                "error": &result.error,
                            }),
                        ))
                        .await;
                    if self.check(journaled).is_err() {
                        return JOURNAL_FAILURE_REPLY.to_string();
                    }
                }

                let observation =
                    serde_json::to_string(&result).unwrap_or_else(|_| "{\"ok\":false}".into());
                self.context.append(ConversationTurn::tool(observation));

                // Second planning pass over the observation.
                let followup = self.planner.decide(self.context.window(), &catalog).await;
                if self.journal_decision(&followup).await.is_err() {
                    return JOURNAL_FAILURE_REPLY.to_string();
                }

                match followup {
                    Action::Respond { text } => text,
                    Action::ToolCall { name: second, .. } => {
                        // One tool per turn: degrade the second request.
                        warn!(requested = %second, "Second tool call in one turn, degrading to a reply");
                        format!(
                            "I ran {name} for you, but I'll stop there for this turn. \
                             Ask again if you'd like me to go further."
                        )
                    }
                }
            }
        };

        // Journal before committing the reply to the window: an agent
        // turn the user never received must not survive in context.
        let journaled = self
            .journal
            .append(LogRecord::new(
                LogKind::Response,
                serde_json::json!({"text": reply}),
            ))
            .await;
        if self.check(journaled).is_err() {
            return JOURNAL_FAILURE_REPLY.to_string();
        }

        self.context.append(ConversationTurn::agent(&reply));
        self.context.compact();
        reply
    }

    async fn journal_decision(
        &self,
        action: &Action,
    ) -> Result<(), valet_core::error::StoreError> {
        let payload = serde_json::to_value(action).unwrap_or_default();
        let outcome = self
            .journal
            .append(LogRecord::new(LogKind::Decision, payload))
            .await;
        self.check(outcome)
    }

    /// Journal failures abort the turn; context history is kept so the
    /// next turn still sees what happened.
    fn check(
        &self,
        outcome: Result<(), valet_core::error::StoreError>,
    ) -> Result<(), valet_core::error::StoreError> {
        if let Err(e) = &outcome {
            error!(error = %e, "Journal append failed, aborting turn");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use valet_core::journal::LogKind;
    use valet_core::tool::ToolDefinition;
    use valet_core::turn::{ContextWindow, Role};
    use valet_journal::MemoryJournal;
    use valet_store::{InMemoryNotes, InMemoryReminders};

    use crate::planner::RulePlanner;

    fn registry() -> Arc<ToolRegistry> {
        Arc::new(valet_tools::default_registry(
            Arc::new(InMemoryNotes::new()),
            Arc::new(InMemoryReminders::new()),
            PathBuf::from("/tmp"),
        ))
    }

    fn dispatcher(journal: Arc<MemoryJournal>) -> Dispatcher {
        Dispatcher::new(
            Arc::new(RulePlanner),
            registry(),
            journal,
            ContextManager::new(20, 10),
        )
    }

    #[tokio::test]
    async fn direct_answer_turn() {
        let journal = Arc::new(MemoryJournal::new());
        let mut dispatcher = dispatcher(journal.clone());

        let reply = dispatcher.handle("hello").await;
        assert_eq!(reply, "You said: hello");

        // user + agent turns in the window
        let window = dispatcher.context().window();
        assert_eq!(window.turns.len(), 2);
        assert_eq!(window.turns[0].role, Role::User);
        assert_eq!(window.turns[1].role, Role::Agent);

        // decision + response journaled
        let kinds: Vec<LogKind> = journal.records().await.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![LogKind::Decision, LogKind::Response]);
    }

    #[tokio::test]
    async fn tool_turn_runs_one_tool_and_replies() {
        let journal = Arc::new(MemoryJournal::new());
        let mut dispatcher = dispatcher(journal.clone());

        let reply = dispatcher.handle("search for rust news").await;
        assert!(reply.contains("Here's what I found"));

        // user + tool + agent turns
        let window = dispatcher.context().window();
        assert_eq!(window.turns.len(), 3);
        assert_eq!(window.turns[1].role, Role::Tool);

        let kinds: Vec<LogKind> = journal.records().await.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LogKind::Decision,
                LogKind::ToolCall,
                LogKind::Decision,
                LogKind::Response,
            ]
        );
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_not_fatal() {
        struct BadToolPlanner;

        #[async_trait]
        impl Planner for BadToolPlanner {
            fn name(&self) -> &str {
                "bad"
            }
            async fn decide(&self, window: &ContextWindow, _: &[ToolDefinition]) -> Action {
                if window.latest().map(|t| t.role) == Some(Role::Tool) {
                    return RulePlanner.decide(window, &[]).await;
                }
                Action::ToolCall {
                    name: "no_such_tool".into(),
                    args: serde_json::Map::new(),
                }
            }
        }

        let journal = Arc::new(MemoryJournal::new());
        let mut dispatcher = Dispatcher::new(
            Arc::new(BadToolPlanner),
            registry(),
            journal.clone(),
            ContextManager::new(20, 10),
        );

        let reply = dispatcher.handle("do the thing").await;
        assert!(reply.contains("unknown_tool"));

        // The failed dispatch is journaled as an error too
        let kinds: Vec<LogKind> = journal.records().await.iter().map(|r| r.kind).collect();
        assert!(kinds.contains(&LogKind::Error));
    }

    #[tokio::test]
    async fn second_tool_call_is_degraded() {
        struct GreedyPlanner;

        #[async_trait]
        impl Planner for GreedyPlanner {
            fn name(&self) -> &str {
                "greedy"
            }
            async fn decide(&self, _: &ContextWindow, _: &[ToolDefinition]) -> Action {
                let mut args = serde_json::Map::new();
                args.insert("query".into(), serde_json::Value::String("rust".into()));
                Action::ToolCall {
                    name: "web_search".into(),
                    args,
                }
            }
        }

        let journal = Arc::new(MemoryJournal::new());
        let mut dispatcher = Dispatcher::new(
            Arc::new(GreedyPlanner),
            registry(),
            journal.clone(),
            ContextManager::new(20, 10),
        );

        let reply = dispatcher.handle("search everything").await;
        assert!(reply.contains("web_search"));
        assert!(reply.contains("stop there"));

        // Exactly one tool call journaled despite two tool decisions
        let records = journal.records().await;
        let tool_calls = records
            .iter()
            .filter(|r| r.kind == LogKind::ToolCall)
            .count();
        assert_eq!(tool_calls, 1);
    }

    #[tokio::test]
    async fn journal_failure_aborts_turn_but_keeps_history() {
        let journal = Arc::new(MemoryJournal::failing());
        let mut dispatcher = dispatcher(journal);

        let reply = dispatcher.handle("hello").await;
        assert_eq!(reply, JOURNAL_FAILURE_REPLY);

        // The user turn stays so the next turn has context
        let window = dispatcher.context().window();
        assert_eq!(window.turns.len(), 1);
        assert_eq!(window.turns[0].role, Role::User);
    }

    #[tokio::test]
    async fn undelivered_reply_is_not_kept_in_context() {
        struct ResponseRejectingJournal;

        #[async_trait]
        impl Journal for ResponseRejectingJournal {
            async fn append(
                &self,
                record: LogRecord,
            ) -> Result<(), valet_core::error::StoreError> {
                if record.kind == LogKind::Response {
                    return Err(valet_core::error::StoreError::Storage("disk full".into()));
                }
                Ok(())
            }
        }

        let mut dispatcher = Dispatcher::new(
            Arc::new(RulePlanner),
            registry(),
            Arc::new(ResponseRejectingJournal),
            ContextManager::new(20, 10),
        );

        let reply = dispatcher.handle("hello").await;
        assert_eq!(reply, JOURNAL_FAILURE_REPLY);

        // The drafted reply was never delivered, so only the user turn stays
        let window = dispatcher.context().window();
        assert_eq!(window.turns.len(), 1);
        assert_eq!(window.turns[0].role, Role::User);
    }

    #[tokio::test]
    async fn long_session_compacts_the_window() {
        let journal = Arc::new(MemoryJournal::new());
        let mut dispatcher = dispatcher(journal);

        for i in 0..30 {
            dispatcher.handle(&format!("hello number {i}")).await;
        }

        let window = dispatcher.context().window();
        assert!(window.len() <= 20);
        assert!(window.summary.is_some());
        // The latest exchange is intact
        assert!(
            window
                .turns
                .iter()
                .any(|t| t.content.contains("hello number 29"))
        );
    }
}
