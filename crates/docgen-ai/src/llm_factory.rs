use crate::llm_provider::LLMProvider;
use crate::ollama_provider::{OllamaClient, OllamaConfig};
use docgen_core::{DocGenError, LLMConfig, Result};
use std::sync::Arc;

/// Factory for creating LLM providers based on configuration
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    pub fn create(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        match config.provider.to_lowercase().as_str() {
            "ollama" => Ok(Arc::new(OllamaClient::new(OllamaConfig::from(config))?)),
            other => Err(DocGenError::Llm(format!(
                "Unsupported LLM provider: {}. Available providers: ollama",
                other
            ))),
        }
    }
}
