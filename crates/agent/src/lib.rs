//! The response-selection core of Aula.
//!
//! A request flows through here as follows:
//!
//! 1. **Classify** the query into a topic (keyword table)
//! 2. **Build** one prompt shared by both providers (only context size differs)
//! 3. **Run** the fast/cheap chain (OpenRouter) with bounded document context
//! 4. **Judge** every candidate answer; the first useful one wins
//! 5. **Fall back** to the massive-context chain (Gemini, full documents)
//!    when the cheap chain came up empty and the cooldown gate allows it
//!
//! Models are tried strictly in priority order, never in parallel: the
//! design favors cost predictability over latency.

pub mod chain;
pub mod classify;
pub mod judge;
pub mod orchestrator;
pub mod prompt;

pub use chain::ModelChain;
pub use classify::classify;
pub use judge::is_useful;
pub use orchestrator::ResponseOrchestrator;
pub use prompt::PromptBuilder;

#[cfg(test)]
pub(crate) mod test_support;
