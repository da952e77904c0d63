//! Reminder tools — schedule and deliver time-based reminders.
//!
//! `set_reminder` accepts a due-time expression: relative (`+5m`, `+2h`,
//! `+30s`, `+1d`) or an absolute RFC 3339 timestamp. `check_reminders`
//! returns everything due now and marks it fired, so each reminder is
//! delivered at most once.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::sync::Arc;
use valet_core::error::ToolError;
use valet_core::store::ReminderStore;
use valet_core::tool::Tool;

/// Parse a due-time expression relative to `now`.
///
/// Accepts `+<n><unit>` where unit is `s`, `m`, `h`, or `d`, or an
/// absolute RFC 3339 timestamp.
fn parse_due_expr(expr: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ToolError> {
    let expr = expr.trim();

    if let Some(rel) = expr.strip_prefix('+') {
        let unit = rel.chars().next_back().ok_or_else(|| {
            ToolError::InvalidArguments(format!("bad relative due time: {expr}"))
        })?;
        let digits = &rel[..rel.len() - unit.len_utf8()];
        let n: i64 = digits.parse().map_err(|_| {
            ToolError::InvalidArguments(format!("bad relative due time: {expr}"))
        })?;
        if n < 0 {
            return Err(ToolError::InvalidArguments(format!(
                "due time must not be negative: {expr}"
            )));
        }
        let delta = match unit {
            's' => Duration::seconds(n),
            'm' => Duration::minutes(n),
            'h' => Duration::hours(n),
            'd' => Duration::days(n),
            _ => {
                return Err(ToolError::InvalidArguments(format!(
                    "unknown due time unit in: {expr} (use s, m, h or d)"
                )));
            }
        };
        return Ok(now + delta);
    }

    DateTime::parse_from_rfc3339(expr)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            ToolError::InvalidArguments(format!(
                "due time must be '+<n>s|m|h|d' or RFC 3339: {expr}"
            ))
        })
}

pub struct SetReminderTool {
    store: Arc<dyn ReminderStore>,
}

impl SetReminderTool {
    pub fn new(store: Arc<dyn ReminderStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for SetReminderTool {
    fn name(&self) -> &str {
        "set_reminder"
    }

    fn description(&self) -> &str {
        "Schedule a reminder. due_at is relative ('+5m', '+2h', '+1d') or an RFC 3339 timestamp."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "What to be reminded about"
                },
                "due_at": {
                    "type": "string",
                    "description": "When the reminder is due: '+<n>s|m|h|d' or RFC 3339"
                }
            },
            "required": ["text", "due_at"]
        })
    }

    async fn execute(
        &self,
        args: &serde_json::Map<String, Value>,
    ) -> std::result::Result<Value, ToolError> {
        let text = args
            .get("text")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'text' argument".into()))?;

        let due_expr = args
            .get("due_at")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'due_at' argument".into()))?;

        let due_at = parse_due_expr(due_expr, Utc::now())?;

        let reminder = self
            .store
            .append(text, due_at)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "set_reminder".into(),
                reason: e.to_string(),
            })?;

        Ok(serde_json::json!({
            "id": reminder.id,
            "due_at": reminder.due_at,
        }))
    }
}

pub struct CheckRemindersTool {
    store: Arc<dyn ReminderStore>,
}

impl CheckRemindersTool {
    pub fn new(store: Arc<dyn ReminderStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CheckRemindersTool {
    fn name(&self) -> &str {
        "check_reminders"
    }

    fn description(&self) -> &str {
        "Check for due reminders. Each reminder is delivered exactly once."
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
        let fired = self
            .store
            .due(Utc::now())
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "check_reminders".into(),
                reason: e.to_string(),
            })?;

        let items: Vec<Value> = fired
            .iter()
            .map(|r| {
                serde_json::json!({
                    "id": r.id,
                    "text": r.text,
                    "due_at": r.due_at,
                })
            })
            .collect();

        Ok(Value::Array(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valet_store::InMemoryReminders;

    #[test]
    fn parses_relative_expressions() {
        let now = Utc::now();
        assert_eq!(parse_due_expr("+30s", now).unwrap(), now + Duration::seconds(30));
        assert_eq!(parse_due_expr("+5m", now).unwrap(), now + Duration::minutes(5));
        assert_eq!(parse_due_expr("+2h", now).unwrap(), now + Duration::hours(2));
        assert_eq!(parse_due_expr("+1d", now).unwrap(), now + Duration::days(1));
    }

    #[test]
    fn parses_rfc3339() {
        let now = Utc::now();
        let due = parse_due_expr("2026-09-01T12:00:00Z", now).unwrap();
        assert_eq!(due.to_rfc3339(), "2026-09-01T12:00:00+00:00");
    }

    #[test]
    fn rejects_malformed_expressions() {
        let now = Utc::now();
        assert!(parse_due_expr("+5x", now).is_err());
        assert!(parse_due_expr("+m", now).is_err());
        assert!(parse_due_expr("tomorrow", now).is_err());
        assert!(parse_due_expr("", now).is_err());
    }

    #[tokio::test]
    async fn set_then_check_after_due() {
        let store: Arc<dyn ReminderStore> = Arc::new(InMemoryReminders::new());
        let set = SetReminderTool::new(store.clone());
        let check = CheckRemindersTool::new(store);

        let args = serde_json::json!({"text": "stand up", "due_at": "+0s"});
        let value = set.execute(args.as_object().unwrap()).await.unwrap();
        assert!(value["id"].is_string());

        let fired = check.execute(&serde_json::Map::new()).await.unwrap();
        let items = fired.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["text"], "stand up");

        // At most once: a second check returns nothing
        let fired_again = check.execute(&serde_json::Map::new()).await.unwrap();
        assert!(fired_again.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn future_reminder_is_not_delivered_early() {
        let store: Arc<dyn ReminderStore> = Arc::new(InMemoryReminders::new());
        let set = SetReminderTool::new(store.clone());
        let check = CheckRemindersTool::new(store);

        let args = serde_json::json!({"text": "later", "due_at": "+1h"});
        set.execute(args.as_object().unwrap()).await.unwrap();

        let fired = check.execute(&serde_json::Map::new()).await.unwrap();
        assert!(fired.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_arguments_are_invalid() {
        let store: Arc<dyn ReminderStore> = Arc::new(InMemoryReminders::new());
        let set = SetReminderTool::new(store);

        let args = serde_json::json!({"text": "no due"});
        let result = set.execute(args.as_object().unwrap()).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
