//! Fallback orchestration across the two provider chains.
//!
//! Policy: OpenRouter first with the document context bounded to a budget,
//! Gemini second with the *full* corpus (the pricing table a student asked
//! about may sit past the cheap provider's cutoff). A useful cheap answer
//! means Gemini is never consulted; a throttled Gemini sits out its
//! cooldown before it becomes eligible again.

use crate::chain::ModelChain;
use crate::classify::classify;
use crate::prompt::{PromptBuilder, truncate_chars};
use aula_config::AppConfig;
use aula_core::Turn;
use aula_providers::{CooldownGate, GeminiProvider, OpenRouterProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The single entry point request handlers talk to.
///
/// Constructed once at startup and shared by handle; holds the only
/// mutable state in the pipeline (the cooldown gate).
pub struct ResponseOrchestrator {
    primary: ModelChain,
    fallback: ModelChain,
    gate: CooldownGate,
    prompt: PromptBuilder,
    primary_document_budget: usize,
}

impl ResponseOrchestrator {
    /// Create an orchestrator with production default budgets and backoff.
    pub fn new(primary: ModelChain, fallback: ModelChain) -> Self {
        Self {
            primary,
            fallback,
            gate: CooldownGate::new(Duration::from_secs(60), Duration::from_secs(600)),
            prompt: PromptBuilder::new("Instituto"),
            primary_document_budget: 200_000,
        }
    }

    /// Replace the cooldown gate.
    pub fn with_gate(mut self, gate: CooldownGate) -> Self {
        self.gate = gate;
        self
    }

    /// Replace the prompt builder.
    pub fn with_prompt_builder(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    /// Override the primary chain's document-context character budget.
    pub fn with_primary_document_budget(mut self, budget: usize) -> Self {
        self.primary_document_budget = budget;
        self
    }

    /// Wire real providers from configuration.
    pub fn build_from_config(config: &AppConfig) -> Self {
        let openrouter = OpenRouterProvider::with_timeout(
            config.openrouter.api_key.clone(),
            Duration::from_secs(config.generation.request_timeout_secs),
        )
        .with_attribution(&config.institute.website, &config.institute.name);

        let gemini = GeminiProvider::new(config.gemini.api_key.clone());

        let primary = ModelChain::new(Arc::new(openrouter), config.openrouter.models.clone())
            .with_generation(config.generation.temperature, config.generation.max_tokens);
        let fallback = ModelChain::new(Arc::new(gemini), config.gemini.models.clone())
            .with_generation(config.generation.temperature, config.generation.max_tokens);

        let gate = CooldownGate::new(
            Duration::from_secs(config.backoff.base_secs),
            Duration::from_secs(config.backoff.max_secs),
        )
        .with_reset_on_success(config.backoff.reset_on_success);

        let prompt = PromptBuilder::new(&config.institute.name)
            .with_web_budget(config.context.web_budget)
            .with_history_turns(config.context.history_turns);

        Self::new(primary, fallback)
            .with_gate(gate)
            .with_prompt_builder(prompt)
            .with_primary_document_budget(config.context.primary_document_budget)
    }

    /// Generate a response, or `None` when every eligible model failed to
    /// produce a useful one.
    ///
    /// Expected provider failures never surface as errors here; the caller
    /// only has to handle the absent case (and must not persist it).
    pub async fn generate_response(
        &self,
        user_message: &str,
        document_context: &str,
        web_context: &str,
        history: &[Turn],
    ) -> Option<String> {
        let topic = classify(user_message);
        info!(%topic, "Query classified");

        let bounded_docs = truncate_chars(document_context, self.primary_document_budget);
        let primary_prompt = self
            .prompt
            .build(user_message, bounded_docs, web_context, history);

        info!(
            provider = %self.primary.provider_name(),
            document_chars = bounded_docs.len(),
            "Trying primary chain"
        );
        let primary_response = self.primary.run(&primary_prompt, topic, None).await;

        if primary_response.is_some() {
            info!("Primary chain answered; fallback provider not consulted");
            return primary_response;
        }

        if self.fallback.is_configured() && self.gate.can_call() {
            info!(
                provider = %self.fallback.provider_name(),
                document_chars = document_context.len(),
                "Primary chain empty; trying fallback chain with full context"
            );
            let fallback_prompt =
                self.prompt
                    .build(user_message, document_context, web_context, history);

            if let Some(text) = self.fallback.run(&fallback_prompt, topic, Some(&self.gate)).await
            {
                info!("Fallback chain answered");
                return Some(text);
            }
        }

        // Both chains exhausted, or the fallback was ineligible. The
        // primary result is absent at this point.
        primary_response
    }

    /// Remaining fallback-provider cooldown, if any (for diagnostics).
    pub fn fallback_cooldown(&self) -> Option<Duration> {
        self.gate.cooldown_remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedProvider;
    use aula_core::error::ProviderError;

    const USEFUL: &str =
        "La matrícula regular cuesta S/. 200.00 y se paga en el Banco de la Nación.";
    const USEFUL_FALLBACK: &str =
        "Según el tarifario vigente, el derecho de titulación cuesta S/. 350.00 en total.";
    const USELESS: &str =
        "Lo siento, no encuentro información sobre ese trámite en los documentos disponibles.";

    fn chain(provider: &Arc<ScriptedProvider>, n: usize) -> ModelChain {
        let models = (0..n).map(|i| format!("model-{i}")).collect();
        ModelChain::new(provider.clone(), models)
    }

    #[tokio::test]
    async fn useful_primary_answer_skips_fallback() {
        let primary = Arc::new(ScriptedProvider::new(
            "openrouter",
            vec![Ok(USELESS.into()), Ok(USEFUL.into())],
        ));
        let fallback = Arc::new(ScriptedProvider::new("gemini", vec![]));

        let orchestrator =
            ResponseOrchestrator::new(chain(&primary, 2), chain(&fallback, 3));

        let result = orchestrator
            .generate_response("¿Cuánto cuesta la matrícula?", "docs", "web", &[])
            .await;

        assert_eq!(result.as_deref(), Some(USEFUL));
        assert_eq!(primary.calls(), 2);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn exhausted_primary_falls_back_to_gemini() {
        let primary = Arc::new(ScriptedProvider::new(
            "openrouter",
            vec![
                Ok(USELESS.into()),
                Err(ProviderError::Network("conn refused".into())),
            ],
        ));
        let fallback = Arc::new(ScriptedProvider::new(
            "gemini",
            vec![Ok(USEFUL_FALLBACK.into())],
        ));

        let orchestrator =
            ResponseOrchestrator::new(chain(&primary, 2), chain(&fallback, 3));

        let result = orchestrator
            .generate_response("costo de titulación", "docs", "web", &[])
            .await;

        assert_eq!(result.as_deref(), Some(USEFUL_FALLBACK));
        assert_eq!(primary.calls(), 2);
        // Gemini's first model answered; the rest of its chain never runs
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn both_chains_exhausted_yields_none() {
        let primary = Arc::new(ScriptedProvider::new("openrouter", vec![Ok(USELESS.into())]));
        let fallback = Arc::new(ScriptedProvider::new(
            "gemini",
            vec![
                Ok(USELESS.into()),
                Err(ProviderError::ApiError {
                    status_code: 500,
                    message: "boom".into(),
                }),
            ],
        ));

        let orchestrator =
            ResponseOrchestrator::new(chain(&primary, 1), chain(&fallback, 2));

        let result = orchestrator
            .generate_response("hola, una consulta", "docs", "web", &[])
            .await;

        assert!(result.is_none());
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 2);
    }

    #[tokio::test]
    async fn cooling_fallback_is_never_invoked() {
        let primary = Arc::new(ScriptedProvider::new("openrouter", vec![Ok(USELESS.into())]));
        let fallback = Arc::new(ScriptedProvider::new("gemini", vec![]));

        let gate = CooldownGate::new(Duration::from_secs(60), Duration::from_secs(600));
        gate.on_error(&ProviderError::RateLimited { retry_after_secs: 60 });

        let orchestrator = ResponseOrchestrator::new(chain(&primary, 1), chain(&fallback, 3))
            .with_gate(gate);

        let result = orchestrator
            .generate_response("consulta cualquiera", "docs", "web", &[])
            .await;

        assert!(result.is_none());
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn unconfigured_fallback_is_never_invoked() {
        let primary = Arc::new(ScriptedProvider::new("openrouter", vec![Ok(USELESS.into())]));
        let fallback = Arc::new(ScriptedProvider::unconfigured("gemini"));

        let orchestrator =
            ResponseOrchestrator::new(chain(&primary, 1), chain(&fallback, 3));

        let result = orchestrator
            .generate_response("consulta cualquiera", "docs", "web", &[])
            .await;

        assert!(result.is_none());
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn primary_sees_bounded_context_fallback_sees_full() {
        let primary = Arc::new(ScriptedProvider::new("openrouter", vec![Ok(USELESS.into())]));
        let fallback = Arc::new(ScriptedProvider::new(
            "gemini",
            vec![Ok(USEFUL_FALLBACK.into())],
        ));

        let orchestrator = ResponseOrchestrator::new(chain(&primary, 1), chain(&fallback, 1))
            .with_primary_document_budget(1_000);

        let big_docs = "Ω".repeat(5_000);
        let result = orchestrator
            .generate_response("precio del curso", &big_docs, "", &[])
            .await;

        assert_eq!(result.as_deref(), Some(USEFUL_FALLBACK));
        // The primary prompt carries at most the budgeted slice of the
        // corpus; the fallback prompt carries all of it.
        assert!(primary.prompt_chars(0) < 2_500);
        assert!(fallback.prompt_chars(0) > 5_000);
    }

    #[tokio::test]
    async fn gemini_throttling_starts_cooldown_for_next_request() {
        let primary = Arc::new(ScriptedProvider::new(
            "openrouter",
            vec![Ok(USELESS.into()), Ok(USELESS.into())],
        ));
        let fallback = Arc::new(ScriptedProvider::new(
            "gemini",
            vec![Err(ProviderError::RateLimited { retry_after_secs: 60 })],
        ));

        let orchestrator =
            ResponseOrchestrator::new(chain(&primary, 1), chain(&fallback, 1));

        // First request: primary exhausts, gemini throttles
        let first = orchestrator
            .generate_response("consulta", "docs", "web", &[])
            .await;
        assert!(first.is_none());
        assert_eq!(fallback.calls(), 1);
        assert!(orchestrator.fallback_cooldown().is_some());

        // Second request: gemini is cooling down and must not be called
        let second = orchestrator
            .generate_response("consulta", "docs", "web", &[])
            .await;
        assert!(second.is_none());
        assert_eq!(fallback.calls(), 1);
    }

    #[test]
    fn build_from_config_respects_chain_order() {
        let config = AppConfig::default();
        let orchestrator = ResponseOrchestrator::build_from_config(&config);
        assert_eq!(orchestrator.primary.provider_name(), "openrouter");
        assert_eq!(orchestrator.fallback.provider_name(), "gemini");
        assert_eq!(orchestrator.primary.len(), 3);
        assert_eq!(orchestrator.fallback.len(), 3);
        assert_eq!(orchestrator.primary_document_budget, 200_000);
        // No keys in the default config: the fallback gate fails closed
        assert!(!orchestrator.fallback.is_configured());
    }
}
