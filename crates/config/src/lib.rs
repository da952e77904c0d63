//! Configuration loading, validation, and management for Valet.
//!
//! Loads configuration from `~/.valet/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.valet/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Context window settings
    #[serde(default)]
    pub context: ContextConfig,

    /// Storage locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Tool settings
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("backend", &self.backend)
            .field("context", &self.context)
            .field("storage", &self.storage)
            .field("tools", &self.tools)
            .finish()
    }
}

/// Settings for the text generation backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend kind: "http" for an OpenAI-compatible endpoint, "rules"
    /// for the offline deterministic planner.
    #[serde(default = "default_backend_kind")]
    pub kind: String,

    /// API base URL for the http backend
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key (also settable via VALET_API_KEY / OPENAI_API_KEY)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name for the http backend
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_backend_kind() -> String {
    "rules".into()
}
fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: default_backend_kind(),
            api_url: default_api_url(),
            api_key: None,
            model: default_model(),
        }
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("kind", &self.kind)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .finish()
    }
}

/// Context window compaction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Compaction triggers once the window exceeds this many turns
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// How many recent turns survive compaction verbatim
    #[serde(default = "default_recent_turns")]
    pub recent_turns: usize,
}

fn default_max_turns() -> usize {
    20
}
fn default_recent_turns() -> usize {
    10
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            recent_turns: default_recent_turns(),
        }
    }
}

/// Where persistent state lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding memory.jsonl, reminders.jsonl, journal.jsonl
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    dirs_home().join(".valet")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Tool-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Sandbox root for the read_file tool
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,
}

fn default_workspace_root() -> PathBuf {
    dirs_home().join(".valet").join("workspace")
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            workspace_root: default_workspace_root(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.valet/config.toml).
    ///
    /// Also checks environment variables for the API key:
    /// - `VALET_API_KEY` (highest priority)
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.backend.api_key.is_none() {
            config.backend.api_key = std::env::var("VALET_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("VALET_MODEL") {
            config.backend.model = model;
        }

        if let Ok(kind) = std::env::var("VALET_BACKEND") {
            config.backend.kind = kind;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".valet")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.context.recent_turns == 0 {
            return Err(ConfigError::ValidationError(
                "context.recent_turns must be at least 1".into(),
            ));
        }

        if self.context.max_turns <= self.context.recent_turns {
            return Err(ConfigError::ValidationError(
                "context.max_turns must be greater than context.recent_turns".into(),
            ));
        }

        match self.backend.kind.as_str() {
            "http" | "rules" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "backend.kind must be 'http' or 'rules', got '{other}'"
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.backend.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            context: ContextConfig::default(),
            storage: StorageConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.backend.kind, "rules");
        assert_eq!(config.context.max_turns, 20);
        assert_eq!(config.context.recent_turns, 10);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.backend.kind, config.backend.kind);
        assert_eq!(parsed.context.max_turns, config.context.max_turns);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().backend.kind, "rules");
    }

    #[test]
    fn partial_config_file_fills_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            r#"
[backend]
kind = "http"
model = "llama3"

[context]
max_turns = 30
"#
        )
        .unwrap();

        let config = AppConfig::load_from(tmp.path()).unwrap();
        assert_eq!(config.backend.kind, "http");
        assert_eq!(config.backend.model, "llama3");
        assert_eq!(config.context.max_turns, 30);
        // Unspecified fields fall back to defaults
        assert_eq!(config.context.recent_turns, 10);
    }

    #[test]
    fn window_smaller_than_recency_rejected() {
        let config = AppConfig {
            context: ContextConfig {
                max_turns: 5,
                recent_turns: 10,
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_recent_turns_rejected() {
        let config = AppConfig {
            context: ContextConfig {
                max_turns: 20,
                recent_turns: 0,
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_backend_kind_rejected() {
        let mut config = AppConfig::default();
        config.backend.kind = "carrier_pigeon".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let mut config = AppConfig::default();
        config.backend.api_key = Some("sk-secret-value".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret-value"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("rules"));
        assert!(toml_str.contains("max_turns"));
    }
}
