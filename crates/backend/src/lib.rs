//! Text generation backends for Valet.
//!
//! The planner only needs one capability from a model: prompt in, text out.
//! `HttpTextBackend` speaks the OpenAI-compatible chat completions wire
//! format, which covers OpenAI, OpenRouter, Ollama, vLLM, and friends.
//! `ScriptedBackend` replays canned replies for deterministic tests.

pub mod http;
pub mod scripted;

pub use http::HttpTextBackend;
pub use scripted::ScriptedBackend;
