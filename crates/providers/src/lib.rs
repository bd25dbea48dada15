//! LLM provider implementations for Aula.
//!
//! All providers implement the `aula_core::Provider` trait. The cooldown
//! gate guards the massive-context provider against repeated throttling.

pub mod cooldown;
pub mod gemini;
pub mod openrouter;

pub use cooldown::CooldownGate;
pub use gemini::GeminiProvider;
pub use openrouter::OpenRouterProvider;
