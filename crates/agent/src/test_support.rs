//! Shared test helpers for chain and orchestrator tests.

use async_trait::async_trait;
use aula_core::error::ProviderError;
use aula_core::provider::{CompletionRequest, CompletionResponse, Provider};
use std::sync::Mutex;

/// A mock provider that returns a scripted sequence of results.
///
/// Each call to `complete` consumes the next entry. Panics if more calls
/// are made than entries provided. Records every prompt it receives so
/// tests can assert on context truncation.
pub struct ScriptedProvider {
    name: String,
    configured: bool,
    script: Mutex<Vec<Result<String, ProviderError>>>,
    call_count: Mutex<usize>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(name: &str, script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            name: name.into(),
            configured: true,
            script: Mutex::new(script),
            call_count: Mutex::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A provider that reports no credential; calls panic if attempted.
    pub fn unconfigured(name: &str) -> Self {
        let mut provider = Self::new(name, vec![]);
        provider.configured = false;
        provider
    }

    pub fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Character length of the prompt received on call `index`.
    pub fn prompt_chars(&self, index: usize) -> usize {
        self.prompts.lock().unwrap()[index].chars().count()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let mut count = self.call_count.lock().unwrap();
        let script = self.script.lock().unwrap();

        if *count >= script.len() {
            panic!(
                "ScriptedProvider '{}': no more scripted results (call #{}, have {})",
                self.name,
                *count + 1,
                script.len()
            );
        }

        let result = script[*count].clone();
        *count += 1;
        self.prompts.lock().unwrap().push(request.prompt);

        result.map(|text| CompletionResponse {
            text,
            model: request.model,
        })
    }
}
