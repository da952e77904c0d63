//! Context window management — bounded history with deterministic compaction.
//!
//! The window grows as turns are appended. Once it exceeds `max_turns`,
//! [`ContextManager::compact`] folds everything but the most recent
//! `recent_turns` turns into a single summary turn. The summary itself
//! folds any previous summary, so a long session carries exactly one.

use tracing::debug;
use valet_core::turn::{ContextWindow, ConversationTurn, Role};
use valet_config::ContextConfig;

/// Owns the conversation window and its compaction policy.
pub struct ContextManager {
    window: ContextWindow,
    max_turns: usize,
    recent_turns: usize,
}

impl ContextManager {
    /// Create a manager with an empty window.
    ///
    /// `max_turns` is the compaction trigger (window length including the
    /// summary); `recent_turns` is how many recent turns survive verbatim.
    pub fn new(max_turns: usize, recent_turns: usize) -> Self {
        debug_assert!(recent_turns >= 1 && max_turns > recent_turns);
        Self {
            window: ContextWindow::default(),
            max_turns,
            recent_turns,
        }
    }

    /// Create a manager from validated configuration.
    pub fn from_config(config: &ContextConfig) -> Self {
        Self::new(config.max_turns, config.recent_turns)
    }

    /// The current window.
    pub fn window(&self) -> &ContextWindow {
        &self.window
    }

    /// Append a turn without compacting. Callers compact once per cycle,
    /// after all of a turn's appends.
    pub fn append(&mut self, turn: ConversationTurn) {
        self.window.turns.push(turn);
    }

    /// Fold old turns into the summary if the window is over the threshold.
    ///
    /// Idempotent: a window already under the threshold is left untouched,
    /// so compacting twice equals compacting once. The most recent user
    /// turn always survives verbatim, even if it falls outside the recency
    /// window.
    pub fn compact(&mut self) {
        if self.window.len() <= self.max_turns {
            return;
        }

        let mut cut = self.window.turns.len().saturating_sub(self.recent_turns);

        // The latest user turn is never summarized away.
        if let Some(idx) = self
            .window
            .turns
            .iter()
            .rposition(|t| t.role == Role::User)
            && idx < cut
        {
            cut = idx;
        }

        if cut == 0 {
            return;
        }

        let discarded: Vec<ConversationTurn> = self.window.turns.drain(..cut).collect();
        let previous = self.window.summary.as_ref().map(|t| t.content.as_str());
        let summary = summarize(previous, &discarded);

        debug!(
            folded = discarded.len(),
            retained = self.window.turns.len(),
            "Compacted context window"
        );

        self.window.summary = Some(ConversationTurn::agent(summary));
    }
}

/// Build a deterministic one-turn summary of discarded turns, folding any
/// previous summary. Purely a function of its inputs.
fn summarize(previous: Option<&str>, discarded: &[ConversationTurn]) -> String {
    let users = discarded.iter().filter(|t| t.role == Role::User).count();
    let agents = discarded.iter().filter(|t| t.role == Role::Agent).count();
    let tools = discarded.iter().filter(|t| t.role == Role::Tool).count();

    let topic = discarded
        .iter()
        .rev()
        .find(|t| t.role == Role::User)
        .map(|t| snippet(&t.content))
        .unwrap_or_default();

    let mut summary = match previous {
        Some(prev) => format!("{prev} Then {} more turns followed", discarded.len()),
        None => format!(
            "Earlier conversation condensed: {} turns",
            discarded.len()
        ),
    };
    summary.push_str(&format!(" ({users} user, {agents} agent, {tools} tool)"));
    if !topic.is_empty() {
        summary.push_str(&format!(", most recently about: {topic}"));
    }
    summary.push('.');
    summary
}

/// First 80 characters of a turn, on one line.
fn snippet(content: &str) -> String {
    let one_line = content.replace('\n', " ");
    one_line.chars().take(80).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with_turns(count: usize, max_turns: usize, recent_turns: usize) -> ContextManager {
        let mut manager = ContextManager::new(max_turns, recent_turns);
        for i in 0..count {
            if i % 2 == 0 {
                manager.append(ConversationTurn::user(format!("question {i}")));
            } else {
                manager.append(ConversationTurn::agent(format!("answer {i}")));
            }
        }
        manager
    }

    #[test]
    fn under_threshold_is_untouched() {
        let mut manager = manager_with_turns(10, 20, 10);
        manager.compact();
        assert_eq!(manager.window().len(), 10);
        assert!(manager.window().summary.is_none());
    }

    #[test]
    fn fifty_turns_compact_to_eleven() {
        let mut manager = manager_with_turns(50, 20, 10);
        manager.compact();

        // 1 summary + 10 recent turns
        assert_eq!(manager.window().len(), 11);
        assert_eq!(manager.window().turns.len(), 10);
        let summary = manager.window().summary.as_ref().unwrap();
        assert!(summary.content.contains("40 turns"));

        // The 10 most recent turns survive verbatim
        assert_eq!(manager.window().turns[0].content, "question 40");
        assert_eq!(manager.window().turns[9].content, "answer 49");
    }

    #[test]
    fn compaction_is_idempotent() {
        let mut manager = manager_with_turns(50, 20, 10);
        manager.compact();
        let first = manager.window().summary.clone().unwrap().content;
        let len = manager.window().len();

        manager.compact();
        assert_eq!(manager.window().len(), len);
        assert_eq!(manager.window().summary.as_ref().unwrap().content, first);
    }

    #[test]
    fn summary_folds_previous_summary() {
        let mut manager = manager_with_turns(30, 20, 10);
        manager.compact();
        let first = manager.window().summary.clone().unwrap().content;

        for i in 30..50 {
            manager.append(ConversationTurn::user(format!("later question {i}")));
        }
        manager.compact();

        // Still exactly one summary, containing the first one
        assert_eq!(manager.window().turns.len(), 10);
        let second = &manager.window().summary.as_ref().unwrap().content;
        assert!(second.starts_with(first.trim_end_matches('.')));
    }

    #[test]
    fn summary_is_deterministic() {
        let mut a = ContextManager::new(4, 2);
        let mut b = ContextManager::new(4, 2);
        for m in [&mut a, &mut b] {
            m.append(ConversationTurn::user("hello"));
            m.append(ConversationTurn::agent("hi"));
            m.append(ConversationTurn::user("what's new"));
            m.append(ConversationTurn::agent("not much"));
            m.append(ConversationTurn::user("ok"));
            m.compact();
        }
        assert_eq!(
            a.window().summary.as_ref().unwrap().content,
            b.window().summary.as_ref().unwrap().content
        );
    }

    #[test]
    fn latest_user_turn_survives_tool_burst() {
        // One user turn followed by many tool/agent turns: the user turn is
        // outside the recency window but must survive compaction.
        let mut manager = ContextManager::new(6, 2);
        manager.append(ConversationTurn::user("the only question"));
        for i in 0..10 {
            manager.append(ConversationTurn::tool(format!("observation {i}")));
        }
        manager.compact();

        assert!(
            manager
                .window()
                .turns
                .iter()
                .any(|t| t.content == "the only question")
        );
    }

    #[test]
    fn incremental_appends_stay_bounded() {
        let mut manager = ContextManager::new(20, 10);
        for i in 0..200 {
            manager.append(ConversationTurn::user(format!("turn {i}")));
            manager.compact();
        }
        assert!(manager.window().len() <= 20);
    }
}
