//! The Valet agent loop.
//!
//! One turn of conversation flows through three pieces:
//! - a [`Planner`] decides whether to answer directly or call a tool,
//! - the [`Dispatcher`] drives the turn state machine and journals every step,
//! - the [`ContextManager`] keeps the conversation window bounded by
//!   folding old turns into a summary.

pub mod context;
pub mod dispatcher;
pub mod planner;

pub use context::ContextManager;
pub use dispatcher::Dispatcher;
pub use planner::{BackendPlanner, Planner, RulePlanner};
