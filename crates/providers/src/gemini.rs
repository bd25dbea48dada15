//! Google Gemini provider — the massive-context fallback.
//!
//! Talks to the Generative Language REST API. Gemini accepts the full,
//! untruncated document corpus, so it only runs when the cheap chain came
//! up empty. Throttling (HTTP 429 / RESOURCE_EXHAUSTED) maps to the typed
//! `RateLimited` variant that feeds the cooldown gate.

use async_trait::async_trait;
use aula_core::error::ProviderError;
use aula_core::provider::{CompletionRequest, CompletionResponse, Provider};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The Gemini generateContent client.
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub const DEFAULT_BASE_URL: &'static str =
        "https://generativelanguage.googleapis.com/v1beta";

    /// Create a provider with the default endpoint.
    ///
    /// No explicit call timeout: Gemini chews through hundreds of thousands
    /// of context characters and the reqwest default is left in charge.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the endpoint (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
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
                "GEMINI_API_KEY is not set".into(),
            ));
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, request.model, self.api_key
        );

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        debug!(model = %request.model, prompt_chars = request.prompt.len(), "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(format!("{} timed out: {e}", request.model))
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status, &request.model, &error_body));
        }

        let api_response: GenerateResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 200,
                message: "No candidates in response".into(),
            })?;

        // A candidate can split its text across several parts
        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        Ok(CompletionResponse {
            text,
            model: request.model,
        })
    }
}

/// Map a non-200 Gemini status + error payload to a typed error.
///
/// The API reports quota exhaustion either as HTTP 429 or with a
/// `RESOURCE_EXHAUSTED` status in the JSON error body.
fn classify_api_error(status: u16, model: &str, body: &str) -> ProviderError {
    let api_status = serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .map(|e| e.error.status)
        .unwrap_or_default();

    if status == 429 || api_status == "RESOURCE_EXHAUSTED" {
        return ProviderError::RateLimited { retry_after_secs: 60 };
    }

    if status == 404 {
        return ProviderError::ModelNotFound(model.to_string());
    }

    if status == 401 || status == 403 || api_status == "UNAUTHENTICATED" {
        return ProviderError::AuthenticationFailed("Invalid or missing API key".into());
    }

    warn!(status, %api_status, "Gemini returned error");
    ProviderError::ApiError {
        status_code: status,
        message: body.to_string(),
    }
}

// --- Generative Language API types (internal) ---

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_only_with_key() {
        assert!(GeminiProvider::new("AIza-test").is_configured());
        assert!(!GeminiProvider::new("").is_configured());
    }

    #[test]
    fn request_serialization_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: "hola" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.5,
                max_output_tokens: 2000,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hola");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2000);
    }

    #[test]
    fn parse_multi_part_candidate() {
        let data = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "El costo "}, {"text": "es S/. 450.00"}], "role": "model"}
            }]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(data).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        assert_eq!(text, "El costo es S/. 450.00");
    }

    #[test]
    fn parse_empty_candidates() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }

    #[test]
    fn http_429_is_rate_limited() {
        let err = classify_api_error(429, "gemini-2.0-flash", "");
        assert!(err.is_throttle());
    }

    #[test]
    fn resource_exhausted_body_is_rate_limited() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = classify_api_error(400, "gemini-2.0-flash", body);
        assert!(err.is_throttle());
    }

    #[test]
    fn http_404_is_model_not_found() {
        let err = classify_api_error(404, "gemini-0.5-nano", "");
        match err {
            ProviderError::ModelNotFound(m) => assert_eq!(m, "gemini-0.5-nano"),
            other => panic!("Expected ModelNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn http_500_is_api_error() {
        let err = classify_api_error(500, "gemini-2.0-flash", "internal");
        match err {
            ProviderError::ApiError { status_code, .. } => assert_eq!(status_code, 500),
            other => panic!("Expected ApiError, got: {other:?}"),
        }
    }
}
