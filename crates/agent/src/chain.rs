//! Model chain — ordered attempts within one provider.
//!
//! Tries the configured models in priority order and returns the first
//! response that survives the usefulness judge. Call failures are logged
//! and swallowed; a chain can only "fail" by exhausting its list.

use crate::judge::is_useful;
use aula_core::Topic;
use aula_core::provider::{CompletionRequest, Provider};
use aula_providers::CooldownGate;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An ordered list of models behind a single provider.
pub struct ModelChain {
    provider: Arc<dyn Provider>,
    models: Vec<String>,
    temperature: f32,
    max_tokens: u32,
}

impl ModelChain {
    /// Create a chain with default generation parameters.
    pub fn new(provider: Arc<dyn Provider>, models: Vec<String>) -> Self {
        Self {
            provider,
            models,
            temperature: 0.5,
            max_tokens: 2000,
        }
    }

    /// Set the generation parameters for every model in the chain.
    pub fn with_generation(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Whether the underlying provider holds a credential.
    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// The provider's name, for logs.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Number of models in the chain.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the chain has no models.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Run the chain: first useful response wins, exhaust all on failure.
    ///
    /// Every error is recoverable at this level — logged, reported to the
    /// gate when one is attached, and the chain moves on. Returns `None`
    /// when no model produced a useful response.
    pub async fn run(&self, prompt: &str, topic: Topic, gate: Option<&CooldownGate>) -> Option<String> {
        for (attempt, model) in self.models.iter().enumerate() {
            info!(
                provider = %self.provider.name(),
                %model,
                attempt = attempt + 1,
                total = self.models.len(),
                "Chain: trying model"
            );

            let request = CompletionRequest {
                model: model.clone(),
                prompt: prompt.to_string(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            };

            match self.provider.complete(request).await {
                Ok(response) => {
                    if let Some(g) = gate {
                        g.on_success();
                    }
                    if is_useful(Some(response.text.as_str()), topic) {
                        info!(
                            provider = %self.provider.name(),
                            %model,
                            chars = response.text.len(),
                            "Chain: useful response"
                        );
                        return Some(response.text);
                    }
                    debug!(
                        provider = %self.provider.name(),
                        %model,
                        "Chain: response judged not useful, trying next"
                    );
                }
                Err(e) => {
                    warn!(
                        provider = %self.provider.name(),
                        %model,
                        error = %e,
                        "Chain: model call failed, trying next"
                    );
                    if let Some(g) = gate {
                        g.on_error(&e);
                    }
                }
            }
        }

        self.log_exhausted();
        None
    }

    fn log_exhausted(&self) {
        warn!(
            provider = %self.provider.name(),
            models = self.models.len(),
            "Chain: exhausted without a useful response"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedProvider;
    use aula_core::error::ProviderError;
    use std::time::Duration;

    const USEFUL: &str =
        "La matrícula regular cuesta S/. 200.00 y se paga en el Banco de la Nación.";
    const USELESS: &str =
        "Lo siento, no encuentro información sobre ese trámite en los documentos disponibles.";

    fn models(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("model-{i}")).collect()
    }

    #[tokio::test]
    async fn first_useful_response_stops_the_chain() {
        let provider = Arc::new(ScriptedProvider::new(
            "mock",
            vec![Ok(USELESS.into()), Ok(USEFUL.into()), Ok(USEFUL.into())],
        ));
        let chain = ModelChain::new(provider.clone(), models(3));

        let result = chain.run("prompt", Topic::Matricula, None).await;
        assert_eq!(result.as_deref(), Some(USEFUL));
        // Second model answered usefully; the third is never invoked
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn errors_advance_to_next_model() {
        let provider = Arc::new(ScriptedProvider::new(
            "mock",
            vec![
                Err(ProviderError::Network("conn refused".into())),
                Ok(USEFUL.into()),
            ],
        ));
        let chain = ModelChain::new(provider.clone(), models(2));

        let result = chain.run("prompt", Topic::General, None).await;
        assert_eq!(result.as_deref(), Some(USEFUL));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn exhausted_chain_returns_none() {
        let provider = Arc::new(ScriptedProvider::new(
            "mock",
            vec![
                Ok(USELESS.into()),
                Err(ProviderError::ApiError {
                    status_code: 500,
                    message: "boom".into(),
                }),
                Ok("corto".into()),
            ],
        ));
        let chain = ModelChain::new(provider.clone(), models(3));

        let result = chain.run("prompt", Topic::General, None).await;
        assert!(result.is_none());
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn throttle_errors_feed_the_gate() {
        let provider = Arc::new(ScriptedProvider::new(
            "mock",
            vec![
                Err(ProviderError::RateLimited { retry_after_secs: 60 }),
                Err(ProviderError::Network("conn refused".into())),
            ],
        ));
        let chain = ModelChain::new(provider, models(2));
        let gate = CooldownGate::new(Duration::from_secs(60), Duration::from_secs(600));

        let result = chain.run("prompt", Topic::General, Some(&gate)).await;
        assert!(result.is_none());
        // Only the RateLimited error counts as a throttle
        assert_eq!(gate.consecutive_throttles(), 1);
        assert!(!gate.can_call());
    }

    #[tokio::test]
    async fn success_resets_gate_when_configured() {
        let provider = Arc::new(ScriptedProvider::new(
            "mock",
            vec![Err(ProviderError::RateLimited { retry_after_secs: 60 }), Ok(USEFUL.into())],
        ));
        let chain = ModelChain::new(provider, models(2));
        let gate = CooldownGate::new(Duration::from_millis(1), Duration::from_millis(1))
            .with_reset_on_success(true);

        // First model throttles, cooldown expires, second model succeeds
        let first = chain.run("prompt", Topic::General, Some(&gate)).await;
        assert_eq!(first.as_deref(), Some(USEFUL));
        assert_eq!(gate.consecutive_throttles(), 0);
    }

    #[tokio::test]
    async fn empty_chain_returns_none_without_calls() {
        let provider = Arc::new(ScriptedProvider::new("mock", vec![]));
        let chain = ModelChain::new(provider.clone(), vec![]);
        assert!(chain.is_empty());
        assert!(chain.run("prompt", Topic::General, None).await.is_none());
        assert_eq!(provider.calls(), 0);
    }
}
