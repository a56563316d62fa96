//! Configuration System
//!
//! Layered run configuration: built-in defaults, the global config file, a
//! `crescendo.toml` in the working directory, then `CRESCENDO__*` environment
//! variables. Command-line flags are applied on top by the front end.

use crate::error::ReviewError;
use crate::logging::LoggingConfig;
use crate::pacing::PacingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Default chat-completion endpoint (NVIDIA-hosted DeepSeek R1).
pub const DEFAULT_ENDPOINT: &str = "https://integrate.api.nvidia.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-ai/deepseek-r1";
pub const DEFAULT_API_KEY_ENV: &str = "NVIDIA_API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion service settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Request spacing and retry policy
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Input, output and per-run switches
    #[serde(default)]
    pub batch: BatchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature; DeepSeek R1 does best between 0.5 and 0.7
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Explicit API key; takes precedence over `api_key_env`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Keep the model's thinking trace in the saved review
    #[serde(default)]
    pub keep_thinking: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.6
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
            api_key_env: default_api_key_env(),
            keep_thinking: false,
        }
    }
}

impl ApiConfig {
    /// Explicit key first, then the configured environment variable.
    pub fn resolve_api_key(&self) -> Result<String, ReviewError> {
        if let Some(key) = self.api_key.as_deref().map(str::trim) {
            if !key.is_empty() {
                return Ok(key.to_string());
            }
        }
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ReviewError::MissingCredential {
                env_var: self.api_key_env.clone(),
            })
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model cannot be empty".to_string());
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(format!(
                "Endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Batch run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Markdown table to read
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Directory receiving one markdown file per review
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Leave existing review files alone instead of regenerating them
    #[serde(default = "default_true")]
    pub skip_existing: bool,

    /// Fabricate placeholder reviews without calling the service
    #[serde(default)]
    pub simulate: bool,
}

fn default_input() -> PathBuf {
    PathBuf::from("top25Music_douban.md")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("musicComments")
}

fn default_true() -> bool {
    true
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output_dir: default_output_dir(),
            skip_existing: default_true(),
            simulate: false,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.input.as_os_str().is_empty() {
            return Err("Input path cannot be empty".to_string());
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err("Output directory cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Api(String),
    Pacing(String),
    Batch(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Api(msg) => write!(f, "api: {}", msg),
            ValidationError::Pacing(msg) => write!(f, "pacing: {}", msg),
            ValidationError::Batch(msg) => write!(f, "batch: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.api.validate() {
            errors.push(ValidationError::Api(e));
        }
        if let Err(e) = self.pacing.validate() {
            errors.push(ValidationError::Pacing(e));
        }
        if let Err(e) = self.batch.validate() {
            errors.push(ValidationError::Batch(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold every problem into one configuration error.
    pub fn ensure_valid(&self) -> Result<(), ReviewError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ReviewError::Config(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}
