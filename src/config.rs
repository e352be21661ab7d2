//! Configuration management for CareGate.
//!
//! Loads settings from `~/.config/caregate/config.toml` with environment
//! overrides. The orchestrator receives its `AiConfig` by value at
//! construction time; nothing reads ambient process state per request.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::prioritizer::DEFAULT_PREFERRED_MODEL;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Remote inference settings consumed by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiConfig {
    /// Remote inference only runs when this is set.
    #[serde(default)]
    pub enabled: bool,
    /// Credential for the generative API; absence behaves like `enabled = false`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model tried first by the candidate prioritizer.
    #[serde(default = "default_preferred_model")]
    pub preferred_model: String,
}

fn default_port() -> u16 {
    8085
}
fn default_preferred_model() -> String {
    DEFAULT_PREFERRED_MODEL.to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            preferred_model: default_preferred_model(),
        }
    }
}

/// Enablement-flag semantics: any non-empty value other than "0"/"false"
/// (case-insensitive) enables remote inference.
pub fn parse_enabled_flag(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("caregate")
            .join("config.toml")
    }

    /// Load config from file, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::default_path())
    }

    /// Load config from a specific path.
    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                self.ai.api_key = Some(key);
            }
        }
        if let Ok(flag) = std::env::var("CAREGATE_AI_ENABLED") {
            self.ai.enabled = parse_enabled_flag(&flag);
        }
        if let Ok(model) = std::env::var("CAREGATE_MODEL") {
            if !model.is_empty() {
                self.ai.preferred_model = model;
            }
        }
        self
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(&path, content).map_err(ConfigError::Io)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
