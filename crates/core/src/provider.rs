//! Provider trait — the abstraction over LLM backends.
//!
//! A Provider knows how to send a fully assembled prompt to one of its
//! models and return the generated text.
//!
//! Implementations: OpenRouter (OpenAI-compatible), Google Gemini.

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Configuration for a single completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "meta-llama/llama-3.3-70b-instruct:free")
    pub model: String,

    /// The fully assembled prompt (preamble + context + history + query)
    pub prompt: String,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    2000
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated text
    pub text: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// The core Provider trait.
///
/// The chain runner calls `complete()` without knowing which backend is
/// being used. Errors carry enough structure for the caller to distinguish
/// throttling from generic transient failures.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openrouter", "gemini").
    fn name(&self) -> &str;

    /// Whether this provider holds a credential and may be attempted.
    ///
    /// A provider without an API key fails closed: it reports unconfigured
    /// instead of erroring per call.
    fn is_configured(&self) -> bool;

    /// Send a prompt to one model and get the generated text.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError>;
}
