//! Error types for the Valet domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Valet operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Planner output errors ---
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Persistence errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Generation backend errors ---
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A planner decision payload that does not satisfy the action schema.
///
/// Carries the offending payload so callers can log exactly what the
/// backend produced. Never propagated past the planner — the planner
/// converts it into a fallback respond action.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    #[error("missing required field '{field}' in payload {payload}")]
    MissingField {
        field: &'static str,
        payload: serde_json::Value,
    },

    #[error("field '{field}' must be {expected} in payload {payload}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        payload: serde_json::Value,
    },

    #[error("'action' must be \"respond\" or \"tool\", got {value} in payload {payload}")]
    UnknownAction {
        value: serde_json::Value,
        payload: serde_json::Value,
    },
}

impl SchemaError {
    /// The payload that failed validation.
    pub fn payload(&self) -> &serde_json::Value {
        match self {
            Self::MissingField { payload, .. }
            | Self::WrongType { payload, .. }
            | Self::UnknownAction { payload, .. } => payload,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}
