use async_trait::async_trait;
use docgen_core::{LLMConfig, Result};
use docgen_vector::{OllamaHttp, DEFAULT_OLLAMA_URL};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::llm_provider::{LLMProvider, LLMResponse};

/// Settings for a completion model served by Ollama
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub model_name: String,
    pub base_url: String,
    /// Sampling temperature; the model default when unset
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model_name: "llama3".to_string(),
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            temperature: None,
            timeout: Duration::from_secs(300),
        }
    }
}

impl From<&LLMConfig> for OllamaConfig {
    fn from(config: &LLMConfig) -> Self {
        Self {
            model_name: config.model.clone(),
            base_url: config.ollama_url.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<SamplingOptions>,
}

#[derive(Serialize)]
struct SamplingOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateReply {
    #[serde(default)]
    model: Option<String>,
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<usize>,
    #[serde(default)]
    eval_count: Option<usize>,
}

/// Non-streaming completions through Ollama's `/api/generate`.
pub struct OllamaClient {
    http: OllamaHttp,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        Ok(Self {
            http: OllamaHttp::new(&config.base_url)?,
            config,
        })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<LLMResponse> {
        let started = Instant::now();
        debug!(
            "Prompting {} with {} characters",
            self.config.model_name,
            prompt.len()
        );

        let request = GenerateRequest {
            model: &self.config.model_name,
            prompt,
            stream: false,
            options: self
                .config
                .temperature
                .map(|temperature| SamplingOptions { temperature }),
        };
        let reply: GenerateReply = self
            .http
            .post_json("/api/generate", &request, self.config.timeout)
            .await?;

        let duration = started.elapsed();
        info!(
            "{} answered in {}ms ({} prompt / {} completion tokens)",
            self.config.model_name,
            duration.as_millis(),
            reply.prompt_eval_count.unwrap_or(0),
            reply.eval_count.unwrap_or(0)
        );

        Ok(LLMResponse {
            content: reply.response,
            model: reply
                .model
                .unwrap_or_else(|| self.config.model_name.clone()),
            prompt_tokens: reply.prompt_eval_count,
            completion_tokens: reply.eval_count,
            duration,
        })
    }

    async fn is_available(&self) -> bool {
        match self.http.has_model(&self.config.model_name).await {
            Ok(found) => found,
            Err(e) => {
                warn!("LLM availability check failed: {}", e);
                false
            }
        }
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}
