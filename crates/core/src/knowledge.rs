//! Knowledge source contracts.
//!
//! The orchestrator consumes two opaque text blobs per request: the
//! concatenated institutional documents and the concatenated website pages.
//! How those blobs are produced (PDF extraction, scraping) is someone
//! else's problem — this trait only promises a string.

use crate::error::ContextError;
use async_trait::async_trait;

/// A source of opaque context text.
#[async_trait]
pub trait ContextSource: Send + Sync {
    /// A short name for logs (e.g., "documents", "website").
    fn name(&self) -> &str;

    /// The current full text blob. May serve a cached copy.
    async fn snapshot(&self) -> std::result::Result<String, ContextError>;

    /// Force the next `snapshot` to rebuild from the underlying storage.
    ///
    /// Default implementation is a no-op for sources with nothing to rebuild.
    async fn refresh(&self) -> std::result::Result<(), ContextError> {
        Ok(())
    }
}
