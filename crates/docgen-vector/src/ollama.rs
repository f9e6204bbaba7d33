//! Shared HTTP plumbing for a local Ollama server.
use docgen_core::{DocGenError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

const TAGS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// JSON-over-HTTP client bound to one Ollama base URL.
#[derive(Debug, Clone)]
pub struct OllamaHttp {
    client: Client,
    base_url: String,
}

impl OllamaHttp {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| DocGenError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `path` and decode the JSON reply.
    ///
    /// Elapsed `limit` maps to `Timeout`, transport failures to `Network`,
    /// non-2xx replies to `External` carrying the response body, and
    /// undecodable replies to `Parse`.
    pub async fn post_json<B, R>(&self, path: &str, body: &B, limit: Duration) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = timeout(limit, self.client.post(&url).json(body).send())
            .await
            .map_err(|_| DocGenError::Timeout(format!("Ollama {} timed out after {:?}", path, limit)))?
            .map_err(|e| DocGenError::Network(format!("Ollama {} request failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DocGenError::External(format!(
                "Ollama {} returned {}: {}",
                path, status, detail
            )));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| DocGenError::Parse(format!("Unreadable Ollama {} response: {}", path, e)))
    }

    /// Whether `model` has been pulled, according to `/api/tags`.
    pub async fn has_model(&self, model: &str) -> Result<bool> {
        debug!("Looking for {} at {}", model, self.base_url);

        let response = timeout(
            TAGS_TIMEOUT,
            self.client
                .get(format!("{}/api/tags", self.base_url))
                .send(),
        )
        .await
        .map_err(|_| DocGenError::Timeout("Ollama /api/tags timed out".to_string()))?
        .map_err(|e| DocGenError::Network(format!("Ollama /api/tags request failed: {}", e)))?;

        if !response.status().is_success() {
            return Ok(false);
        }

        let tags: TagList = response
            .json()
            .await
            .map_err(|e| DocGenError::Parse(format!("Unreadable Ollama tag list: {}", e)))?;

        Ok(model_listed(tags.models.iter().map(|m| m.name.as_str()), model))
    }
}

/// Matches `desired` against pulled model names, case-insensitively.
/// An untagged name also matches any of its tags (`llama3` ~ `llama3:latest`).
pub fn model_listed<'a>(names: impl IntoIterator<Item = &'a str>, desired: &str) -> bool {
    let desired = desired.to_lowercase();
    let tagged = format!("{}:", desired);
    names.into_iter().any(|name| {
        let name = name.to_lowercase();
        name == desired || name.starts_with(&tagged)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_listing_accepts_tagged_names() {
        let names = ["llama3:latest", "all-minilm:latest"];
        assert!(model_listed(names, "all-minilm"));
        assert!(model_listed(names, "All-MiniLM:latest"));
        assert!(model_listed(names, "LLAMA3"));
        assert!(!model_listed(names, "nomic-embed-text"));
        assert!(!model_listed(names, "llama"));
        assert!(!model_listed(std::iter::empty(), "all-minilm"));
    }

    #[test]
    fn base_url_is_normalised() {
        let http = OllamaHttp::new("http://localhost:11434/").unwrap();
        assert_eq!(http.base_url(), DEFAULT_OLLAMA_URL);
    }
}
