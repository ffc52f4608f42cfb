//! Configuration management for Feedloop
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{FeedloopError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Feedloop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Completion provider configuration
    pub provider: ProviderConfig,
    /// Session behavior
    #[serde(default)]
    pub session: SessionConfig,
    /// Feedback prompt and post-processing
    #[serde(default)]
    pub feedback: FeedbackConfig,
    /// Transcript export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Provider configuration
///
/// Specifies which completion provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type")]
    pub provider_type: String,

    /// OpenRouter (OpenAI-compatible) configuration
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
}

/// OpenRouter provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Base URL of the chat-completions API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Resolved API key
    ///
    /// Never read from or written to the config file; filled from
    /// `api_key_env` when the configuration is loaded.
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Optional `HTTP-Referer` attribution header
    #[serde(default)]
    pub referer: Option<String>,

    /// Optional `X-Title` attribution header
    #[serde(default = "default_title")]
    pub title: Option<String>,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "deepseek/deepseek-r1:free".to_string()
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_title() -> Option<String> {
    Some("feedloop".to_string())
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            api_key: None,
            referer: None,
            title: default_title(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Session behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Follow-up exchanges required before export is offered
    #[serde(default = "default_export_threshold")]
    pub export_threshold: usize,

    /// Assistant turn seeded into every new conversation (`null` disables it)
    #[serde(default = "default_greeting")]
    pub greeting: Option<String>,
}

fn default_export_threshold() -> usize {
    3
}

fn default_greeting() -> Option<String> {
    Some("How can I help you?".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            export_threshold: default_export_threshold(),
            greeting: default_greeting(),
        }
    }
}

/// Feedback prompt configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// System instruction override; the built-in mentor prompt when unset
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Disclaimer override for replies with citation markers
    #[serde(default)]
    pub citation_disclaimer: Option<String>,
}

/// Transcript export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// File name offered for the downloaded report
    #[serde(default = "default_export_file")]
    pub file_name: String,

    /// Title printed on the first page
    #[serde(default = "default_export_title")]
    pub title: String,
}

fn default_export_file() -> String {
    "feedback_report.pdf".to_string()
}

fn default_export_title() -> String {
    "Project Feedback Report".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_export_file(),
            title: default_export_title(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);
        config.resolve_credentials();

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            provider: ProviderConfig {
                provider_type: "openrouter".to_string(),
                openrouter: OpenRouterConfig::default(),
            },
            session: SessionConfig::default(),
            feedback: FeedbackConfig::default(),
            export: ExportConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FeedloopError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| FeedloopError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("FEEDLOOP_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("FEEDLOOP_MODEL") {
            self.provider.openrouter.model = model;
        }

        if let Ok(api_base) = std::env::var("FEEDLOOP_API_BASE") {
            self.provider.openrouter.api_base = api_base;
        }

        if let Ok(threshold) = std::env::var("FEEDLOOP_EXPORT_THRESHOLD") {
            if let Ok(value) = threshold.parse() {
                self.session.export_threshold = value;
            } else {
                tracing::warn!("Invalid FEEDLOOP_EXPORT_THRESHOLD: {}", threshold);
            }
        }

        if let Ok(file_name) = std::env::var("FEEDLOOP_EXPORT_FILE") {
            self.export.file_name = file_name;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        if let Some(model) = &cli.model {
            tracing::debug!("Model override from CLI: {}", model);
            self.provider.openrouter.model = model.clone();
        }
    }

    /// Reads the API key from the configured environment variable
    ///
    /// An unset or blank variable leaves the key empty; the provider reports
    /// that when a completion is requested.
    fn resolve_credentials(&mut self) {
        let env_var = &self.provider.openrouter.api_key_env;
        self.provider.openrouter.api_key = std::env::var(env_var)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        if self.provider.openrouter.api_key.is_none() {
            tracing::warn!("No API key found in {}", env_var);
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(FeedloopError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["openrouter"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(FeedloopError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        let openrouter = &self.provider.openrouter;
        if openrouter.model.trim().is_empty() {
            return Err(FeedloopError::Config(
                "provider.openrouter.model cannot be empty".to_string(),
            )
            .into());
        }

        match url::Url::parse(&openrouter.api_base) {
            Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
            Ok(parsed) => {
                return Err(FeedloopError::Config(format!(
                    "provider.openrouter.api_base must use http or https, got {}",
                    parsed.scheme()
                ))
                .into());
            }
            Err(e) => {
                return Err(FeedloopError::Config(format!(
                    "provider.openrouter.api_base is not a valid URL: {}",
                    e
                ))
                .into());
            }
        }

        if openrouter.timeout_seconds == 0 {
            return Err(FeedloopError::Config(
                "provider.openrouter.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.session.export_threshold == 0 {
            return Err(FeedloopError::Config(
                "session.export_threshold must be greater than 0".to_string(),
            )
            .into());
        }

        if self.export.file_name.trim().is_empty() {
            return Err(
                FeedloopError::Config("export.file_name cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
