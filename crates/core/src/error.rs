//! Error types for the Aula domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Aula operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Knowledge source errors ---
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    // --- Consultation log errors ---
    #[error("Log error: {0}")]
    Log(#[from] LogError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors from an LLM provider call.
///
/// Throttling is a dedicated variant so callers can branch on structured
/// data instead of sniffing "429" out of a stringified error.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Whether this error signals a throttling/quota condition.
    pub fn is_throttle(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Knowledge source unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Row not found: {0}")]
    RowNotFound(u64),

    #[error("Invalid feedback: {0}")]
    InvalidFeedback(String),
}
