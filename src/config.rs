//! Configuration loading and management for ideaforge.
//!
//! Loads settings from `ideaforge.toml` with `.env` and environment variable
//! overrides for the credential.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::retry::CallPolicy;
use crate::scorer::ScoringOptions;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("missing required API key for provider: {0}")]
    MissingApiKey(String),
    #[error("unsupported LLM provider: {0}")]
    UnsupportedProvider(String),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// LLM provider, currently only "gemini"
    pub provider: String,
    /// Model identifier (e.g., "gemini-2.5-flash")
    pub model: String,
    /// System persona placed ahead of every stage prompt
    pub persona: String,
}

/// API keys configuration (loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub gemini_key: Option<String>,
}

/// Artifact location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

/// Stage tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Characters of dossier text passed to ideation
    pub dossier_excerpt_chars: usize,
    /// Scoring calls allowed in flight at once
    pub score_concurrency: usize,
    /// Continue scoring past per-idea failures
    pub keep_going: bool,
    pub call_timeout_secs: u64,
    /// Wall-clock limit for a whole stage, unset for none
    pub stage_deadline_secs: Option<u64>,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from the default location (ideaforge.toml in cwd or home).
    ///
    /// Falls back to defaults when no config file exists.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let mut config = match Self::find_config_file() {
            Some(path) => Self::from_file(&path)?,
            None => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.check()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.check()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Override API keys using the provided env-var lookup
    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.api.gemini_key = Some(key);
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from("ideaforge.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        let home_config = dirs::home_dir()?
            .join(".config")
            .join("ideaforge")
            .join("ideaforge.toml");
        home_config.exists().then_some(home_config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.pipeline.score_concurrency == 0 {
            return Err(ConfigError::Invalid {
                field: "pipeline.score_concurrency".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.pipeline.call_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "pipeline.call_timeout_secs".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// Get the API key for the configured provider
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        match self.agent.provider.as_str() {
            "gemini" => self
                .api
                .gemini_key
                .as_deref()
                .ok_or_else(|| ConfigError::MissingApiKey("gemini".to_string())),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }

    pub fn call_policy(&self) -> CallPolicy {
        CallPolicy {
            timeout: Duration::from_secs(self.pipeline.call_timeout_secs),
            max_retries: self.pipeline.max_retries,
            backoff_base_ms: self.pipeline.backoff_base_ms,
        }
    }

    pub fn scoring_options(&self) -> ScoringOptions {
        ScoringOptions {
            concurrency: self.pipeline.score_concurrency,
            keep_going: self.pipeline.keep_going,
            policy: self.call_policy(),
        }
    }

    pub fn stage_deadline(&self) -> Option<Duration> {
        self.pipeline.stage_deadline_secs.map(Duration::from_secs)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            persona: "You are a senior brand strategist. You answer precisely and never invent facts."
                .to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("outputs"),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dossier_excerpt_chars: 4000,
            score_concurrency: 1,
            keep_going: false,
            call_timeout_secs: 180,
            stage_deadline_secs: None,
            max_retries: 2,
            backoff_base_ms: 1_000,
        }
    }
}
