//! Configuration loading from council.toml and the environment.

use council::{DEFAULT_API_URL, OpenAiBackend};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// File read from the working directory when no `--config` is given.
pub const CONFIG_FILE: &str = "council.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 120;

const DEFAULT_MODELS: &[&str] = &[
    "gpt-4.1",
    "gpt-4o",
    "gpt-4.1-mini",
    "gpt-4o-mini",
    "gpt-4o-realtime-preview",
    "gpt-5-mini",
];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Provider endpoint and credentials.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Which models make up the council.
    #[serde(default)]
    pub council: CouncilConfig,
}

/// Backend provider configuration.
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Bearer token. Left unset, every query fails with a missing-key error.
    pub api_key: Option<String>,

    /// Responses endpoint URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-model deadline in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CouncilConfig {
    #[serde(default = "default_models")]
    pub models: Vec<String>,
}

impl Default for CouncilConfig {
    fn default() -> Self {
        Self {
            models: default_models(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_models() -> Vec<String> {
    DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load an explicit file, or `council.toml` if present, or the defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).exists() => Self::load(CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "backend.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn with_env(mut self) -> Self {
        self.apply_env(|key| std::env::var(key).ok());
        self
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// `OPENAI_API_KEY` (else `OPENROUTER_API_KEY`) sets the key,
    /// `OPENAI_API_URL` the endpoint, and `COUNCIL_MODELS` a comma-separated
    /// council. Empty variables are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(key) = var("OPENAI_API_KEY").or_else(|| var("OPENROUTER_API_KEY")) {
            self.backend.api_key = Some(key);
        }
        if let Some(url) = var("OPENAI_API_URL") {
            self.backend.api_url = url;
        }
        if let Some(models) = var("COUNCIL_MODELS") {
            self.council.models = parse_model_list(&models);
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    /// Build the backend described by this configuration.
    pub fn backend(&self) -> OpenAiBackend {
        OpenAiBackend::builder(self.backend.api_key.clone())
            .api_url(&self.backend.api_url)
            .timeout(self.timeout())
            .build()
    }
}

/// Split a comma-separated model list, trimming entries and dropping blanks.
pub fn parse_model_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
