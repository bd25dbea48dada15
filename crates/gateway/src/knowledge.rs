//! Knowledge source implementations.
//!
//! The orchestrator only ever sees opaque text blobs. These sources
//! produce them from pre-extracted `*.txt` files — the PDF extraction and
//! page scraping that fill those directories run elsewhere.

use async_trait::async_trait;
use aula_core::error::ContextError;
use aula_core::knowledge::ContextSource;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// A fixed in-memory blob. Used in tests and single-file deployments.
pub struct StaticSource {
    name: String,
    text: String,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[async_trait]
impl ContextSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn snapshot(&self) -> Result<String, ContextError> {
        Ok(self.text.clone())
    }
}

/// Concatenates every `*.txt` file under a directory, with an age-based
/// cache so a busy chat session doesn't hit the disk per request.
pub struct DirectorySource {
    name: String,
    dir: PathBuf,
    refresh_after: Duration,
    cache: RwLock<Option<CachedBlob>>,
}

struct CachedBlob {
    text: String,
    loaded_at: Instant,
}

impl DirectorySource {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>, refresh_after: Duration) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            refresh_after,
            cache: RwLock::new(None),
        }
    }

    /// Read and concatenate the directory contents.
    ///
    /// Files are visited in name order so the blob is deterministic. A
    /// missing directory yields an empty blob (the deployment may simply
    /// not have that source); an unreadable one is an error.
    async fn load(&self) -> Result<String, ContextError> {
        if !self.dir.exists() {
            warn!(source = %self.name, dir = %self.dir.display(), "Knowledge directory missing, serving empty context");
            return Ok(String::new());
        }

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            ContextError::ReadFailed {
                path: self.dir.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| ContextError::ReadFailed {
            path: self.dir.display().to_string(),
            reason: e.to_string(),
        })? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "txt") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut blob = String::new();
        for path in &paths {
            match tokio::fs::read_to_string(path).await {
                Ok(content) => {
                    let stem = path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    blob.push_str(&format!("--- {stem} ---\n{content}\n\n"));
                }
                Err(e) => {
                    warn!(source = %self.name, path = %path.display(), error = %e, "Skipping unreadable file");
                }
            }
        }

        info!(
            source = %self.name,
            files = paths.len(),
            chars = blob.len(),
            "Knowledge blob rebuilt"
        );
        Ok(blob)
    }
}

#[async_trait]
impl ContextSource for DirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn snapshot(&self) -> Result<String, ContextError> {
        {
            let cache = self.cache.read().await;
            if let Some(blob) = cache.as_ref() {
                if blob.loaded_at.elapsed() < self.refresh_after {
                    debug!(source = %self.name, "Serving cached knowledge blob");
                    return Ok(blob.text.clone());
                }
            }
        }

        let text = self.load().await?;
        let mut cache = self.cache.write().await;
        *cache = Some(CachedBlob {
            text: text.clone(),
            loaded_at: Instant::now(),
        });
        Ok(text)
    }

    async fn refresh(&self) -> Result<(), ContextError> {
        let text = self.load().await?;
        let mut cache = self.cache.write().await;
        *cache = Some(CachedBlob {
            text,
            loaded_at: Instant::now(),
        });
        Ok(())
    }
}
