//! Configuration loading, validation, and management for Aula.
//!
//! Loads configuration from `aula.toml` (or a path given on the command
//! line) with environment variable overrides for API keys. Validates all
//! settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `aula.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Institute identity (name, website)
    #[serde(default)]
    pub institute: InstituteConfig,

    /// Fast/cheap provider chain (tried first, bounded context)
    #[serde(default = "openrouter_defaults")]
    pub openrouter: ProviderChainConfig,

    /// Massive-context provider chain (fallback, full context)
    #[serde(default = "gemini_defaults")]
    pub gemini: ProviderChainConfig,

    /// Generation parameters shared by both providers
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Context budgets and history window
    #[serde(default)]
    pub context: ContextConfig,

    /// Cooldown backoff after throttling errors
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Knowledge cache directories
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstituteConfig {
    /// Official institute name, embedded in the prompt preamble
    #[serde(default = "default_institute_name")]
    pub name: String,

    /// Public website, sent as the HTTP referer to OpenRouter
    #[serde(default = "default_institute_website")]
    pub website: String,
}

fn default_institute_name() -> String {
    "IESTP Juan Velasco Alvarado".into()
}
fn default_institute_website() -> String {
    "https://iestpjva.edu.pe".into()
}

impl Default for InstituteConfig {
    fn default() -> Self {
        Self {
            name: default_institute_name(),
            website: default_institute_website(),
        }
    }
}

/// One provider's credential and ordered model list.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderChainConfig {
    /// API key; empty means the provider is unavailable
    #[serde(default)]
    pub api_key: String,

    /// Models in priority order (first = most preferred). An empty list
    /// is filled with the provider's stock chain at load time, so a config
    /// file that only sets an API key keeps the curated defaults.
    #[serde(default)]
    pub models: Vec<String>,
}

fn default_openrouter_models() -> Vec<String> {
    vec![
        "meta-llama/llama-3.3-70b-instruct:free".into(),
        "google/gemma-2-9b-it:free".into(),
        "mistralai/mistral-7b-instruct:free".into(),
    ]
}

fn default_gemini_models() -> Vec<String> {
    vec![
        "gemini-2.0-flash".into(),
        "gemini-1.5-flash".into(),
        "gemini-1.5-pro".into(),
    ]
}

fn openrouter_defaults() -> ProviderChainConfig {
    ProviderChainConfig {
        api_key: String::new(),
        models: default_openrouter_models(),
    }
}

fn gemini_defaults() -> ProviderChainConfig {
    ProviderChainConfig {
        api_key: String::new(),
        models: default_gemini_models(),
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &str) -> &'static str {
    if s.is_empty() { "None" } else { "[REDACTED]" }
}

impl std::fmt::Debug for ProviderChainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderChainConfig")
            .field("api_key", &redact(&self.api_key))
            .field("models", &self.models)
            .finish()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("institute", &self.institute)
            .field("openrouter", &self.openrouter)
            .field("gemini", &self.gemini)
            .field("generation", &self.generation)
            .field("context", &self.context)
            .field("backoff", &self.backoff)
            .field("knowledge", &self.knowledge)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature for both providers
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Response token ceiling
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-call HTTP timeout for the fast provider
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.5
}
fn default_max_tokens() -> u32 {
    2000
}
fn default_request_timeout_secs() -> u64 {
    45
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Document-context character budget for the fast provider.
    /// The fallback provider always receives the full, untruncated text.
    #[serde(default = "default_primary_document_budget")]
    pub primary_document_budget: usize,

    /// Website-context character budget (applies to both providers)
    #[serde(default = "default_web_budget")]
    pub web_budget: usize,

    /// How many trailing history turns reach the prompt
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

fn default_primary_document_budget() -> usize {
    200_000
}
fn default_web_budget() -> usize {
    20_000
}
fn default_history_turns() -> usize {
    2
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            primary_document_budget: default_primary_document_budget(),
            web_budget: default_web_budget(),
            history_turns: default_history_turns(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Cooldown after the first throttling error
    #[serde(default = "default_backoff_base_secs")]
    pub base_secs: u64,

    /// Cooldown ceiling regardless of consecutive throttles
    #[serde(default = "default_backoff_max_secs")]
    pub max_secs: u64,

    /// Reset the consecutive-throttle counter once the provider answers
    /// successfully again. Off by default: the counter then only grows,
    /// matching the long-observed production behavior.
    #[serde(default)]
    pub reset_on_success: bool,
}

fn default_backoff_base_secs() -> u64 {
    60
}
fn default_backoff_max_secs() -> u64 {
    600
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_secs: default_backoff_base_secs(),
            max_secs: default_backoff_max_secs(),
            reset_on_success: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Directory of pre-extracted document text files (*.txt)
    #[serde(default = "default_documents_dir")]
    pub documents_dir: PathBuf,

    /// Directory of pre-extracted website page text files (*.txt)
    #[serde(default = "default_website_dir")]
    pub website_dir: PathBuf,

    /// Cache age before a snapshot is rebuilt from disk
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

fn default_documents_dir() -> PathBuf {
    PathBuf::from("cache/documents")
}
fn default_website_dir() -> PathBuf {
    PathBuf::from("cache/website")
}
fn default_refresh_secs() -> u64 {
    1800
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            documents_dir: default_documents_dir(),
            website_dir: default_website_dir(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS on /api/* routes
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Maximum characters accepted per chat message
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    5000
}
fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5500".into(),
        "http://127.0.0.1:5500".into(),
        "http://localhost:3000".into(),
        "http://127.0.0.1:3000".into(),
        "https://iestpjva.edu.pe".into(),
    ]
}
fn default_max_message_chars() -> usize {
    2000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a file, falling back to defaults when it is
    /// absent, then apply environment overrides.
    ///
    /// Environment variables override file-provided keys:
    /// - `OPENROUTER_API_KEY`
    /// - `GEMINI_API_KEY`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;

        if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            config.openrouter.api_key = key;
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.gemini.api_key = key;
        }

        Ok(config)
    }

    /// Load configuration from a file without consulting the environment.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Self::default()
        };

        // A section that only sets an api_key keeps the stock model chain
        if config.openrouter.models.is_empty() {
            config.openrouter.models = default_openrouter_models();
        }
        if config.gemini.models.is_empty() {
            config.gemini.models = default_gemini_models();
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.temperature < 0.0 || self.generation.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.openrouter.models.is_empty() && self.gemini.models.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one provider must configure a model chain".into(),
            ));
        }

        if self.backoff.base_secs == 0 || self.backoff.max_secs < self.backoff.base_secs {
            return Err(ConfigError::ValidationError(
                "backoff.base_secs must be > 0 and <= backoff.max_secs".into(),
            ));
        }

        if self.context.primary_document_budget == 0 {
            return Err(ConfigError::ValidationError(
                "context.primary_document_budget must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for first-run setup).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            institute: InstituteConfig::default(),
            openrouter: openrouter_defaults(),
            gemini: gemini_defaults(),
            generation: GenerationConfig::default(),
            context: ContextConfig::default(),
            backoff: BackoffConfig::default(),
            knowledge: KnowledgeConfig::default(),
            gateway: GatewayConfig::default(),
        }
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
