//! OpenRouter provider — the fast/cheap first line.
//!
//! Talks to the OpenAI-compatible `/chat/completions` endpoint. The whole
//! assembled prompt travels as a single user message; the preamble lives in
//! the prompt itself so both providers see identical instructions.

use async_trait::async_trait;
use aula_core::error::ProviderError;
use aula_core::provider::{CompletionRequest, CompletionResponse, Provider};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// The OpenRouter chat-completions client.
pub struct OpenRouterProvider {
    base_url: String,
    api_key: String,
    referer: String,
    title: String,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://openrouter.ai/api/v1";

    /// Create a provider with the default endpoint and a 45s call timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_timeout(api_key, Duration::from_secs(45))
    }

    /// Create a provider with a custom call timeout.
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: Self::DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            referer: String::new(),
            title: String::new(),
            client,
        }
    }

    /// Override the endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the `HTTP-Referer` / `X-Title` attribution headers OpenRouter
    /// uses for ranking.
    pub fn with_attribution(
        mut self,
        referer: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        self.referer = referer.into();
        self.title = title.into();
        self
    }
}

#[async_trait]
impl Provider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured(
                "OPENROUTER_API_KEY is not set".into(),
            ));
        }

        let url = format!("{}/chat/completions", self.base_url);

        let body = ApiRequest {
            model: &request.model,
            messages: vec![ApiMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(model = %request.model, prompt_chars = request.prompt.len(), "Sending completion request");

        let mut req = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");

        if !self.referer.is_empty() {
            req = req
                .header("HTTP-Referer", &self.referer)
                .header("X-Title", &self.title);
        }

        let response = req.json(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(format!("{} timed out: {e}", request.model))
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited { retry_after_secs: 5 });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "OpenRouter returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let choice =
            api_response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| ProviderError::ApiError {
                    status_code: 200,
                    message: "No choices in response".into(),
                })?;

        Ok(CompletionResponse {
            text: choice.message.content.unwrap_or_default(),
            model: api_response.model,
        })
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    content: Option<String>,
}
