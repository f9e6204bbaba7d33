//! Embeddings served by a local Ollama model through `/api/embed`.
//!
//! The default model is `all-minilm` (sentence-transformers/all-MiniLM-L6-v2,
//! 384 dimensions). The dimension is learned from the first reply.
use async_trait::async_trait;
use docgen_core::{DocGenError, EmbeddingConfig, Result};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::{info, trace, warn};

use crate::ollama::{OllamaHttp, DEFAULT_OLLAMA_URL};
use crate::providers::EmbeddingProvider;

#[derive(Debug, Clone)]
pub struct OllamaEmbeddingConfig {
    pub model_name: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Texts sent per `/api/embed` call
    pub batch_size: usize,
}

impl Default for OllamaEmbeddingConfig {
    fn default() -> Self {
        Self {
            model_name: "all-minilm".to_string(),
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            timeout: Duration::from_secs(60),
            batch_size: 32,
        }
    }
}

impl From<&EmbeddingConfig> for OllamaEmbeddingConfig {
    fn from(config: &EmbeddingConfig) -> Self {
        Self {
            model_name: config.model.clone(),
            base_url: config.ollama_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            batch_size: config.batch_size,
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    truncate: bool,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct OllamaEmbeddingProvider {
    http: OllamaHttp,
    config: OllamaEmbeddingConfig,
    dimension: OnceLock<usize>,
}

impl OllamaEmbeddingProvider {
    pub fn new(config: OllamaEmbeddingConfig) -> Result<Self> {
        Ok(Self {
            http: OllamaHttp::new(&config.base_url)?,
            config,
            dimension: OnceLock::new(),
        })
    }

    pub fn max_batch_size(&self) -> usize {
        self.config.batch_size.max(1)
    }

    /// One `/api/embed` round-trip; inputs longer than the model context are truncated server side.
    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let reply: EmbedResponse = self
            .http
            .post_json(
                "/api/embed",
                &EmbedRequest {
                    model: &self.config.model_name,
                    input: batch,
                    truncate: true,
                },
                self.config.timeout,
            )
            .await?;

        if reply.embeddings.len() != batch.len() {
            return Err(DocGenError::Embedding(format!(
                "Ollama returned {} embeddings for {} inputs",
                reply.embeddings.len(),
                batch.len()
            )));
        }

        if let Some(width) = reply.embeddings.first().map(Vec::len) {
            let _ = self.dimension.set(width);
        }

        Ok(reply.embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let mut vectors = Vec::with_capacity(texts.len());

        for (n, batch) in texts.chunks(self.max_batch_size()).enumerate() {
            trace!("embed batch #{} with {} texts", n, batch.len());
            vectors.extend(self.embed_batch(batch).await?);
        }

        info!(
            "{} embedded {} chunks in {:.2}s",
            self.config.model_name,
            vectors.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(vectors)
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension.get().copied()
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }

    async fn is_available(&self) -> bool {
        self.http
            .has_model(&self.config.model_name)
            .await
            .unwrap_or_else(|e| {
                warn!("Embedding model check failed: {}", e);
                false
            })
    }
}
