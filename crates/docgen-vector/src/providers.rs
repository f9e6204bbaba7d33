use async_trait::async_trait;
use docgen_core::{DocGenError, EmbeddingConfig, Result};
use std::sync::Arc;

use crate::ollama_embedding_provider::{OllamaEmbeddingConfig, OllamaEmbeddingProvider};

/// Unified trait for embedding providers
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed corpus texts, one vector per input, in input order
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a search query
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_documents(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| DocGenError::Embedding("Provider returned no embedding".to_string()))
    }

    /// Embedding dimension, once known
    fn dimension(&self) -> Option<usize>;

    /// Get provider name for identification
    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;

    /// Check if provider is available (e.g., API accessible, model pulled)
    async fn is_available(&self) -> bool;
}

/// Factory for creating embedding providers from configuration
pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {
    pub fn create(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
        match config.provider.to_lowercase().as_str() {
            "ollama" => {
                let mut ollama_config = OllamaEmbeddingConfig::from(config);
                ollama_config.batch_size = ollama_config.batch_size.clamp(1, 256);
                Ok(Arc::new(OllamaEmbeddingProvider::new(ollama_config)?))
            }
            other => Err(DocGenError::Embedding(format!(
                "Unsupported embedding provider: {}. Available providers: ollama",
                other
            ))),
        }
    }
}
