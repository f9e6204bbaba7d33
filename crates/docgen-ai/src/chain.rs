use chrono::{DateTime, Utc};
use docgen_core::{DocGenError, DocumentType, Result, ScoredChunk};
use docgen_vector::{join_context, Retriever};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::llm_provider::LLMProvider;
use crate::prompt::{document_prompt, PromptTemplate};

pub const EMPTY_DESCRIPTION_MESSAGE: &str = "Please provide a project description.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRequest {
    #[serde(default)]
    pub doc_type: DocumentType,
    pub project_description: String,
}

/// Where a retrieved context chunk came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReference {
    pub source: String,
    pub page: u32,
    pub distance: f32,
}

impl From<&ScoredChunk> for SourceReference {
    fn from(scored: &ScoredChunk) -> Self {
        Self {
            source: scored.chunk.source.display().to_string(),
            page: scored.chunk.page,
            distance: scored.distance,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub id: Uuid,
    pub doc_type: DocumentType,
    pub content: String,
    pub sources: Vec<SourceReference>,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl GeneratedDocument {
    /// Title used for the exported document
    pub fn title(&self) -> &'static str {
        self.doc_type.label()
    }
}

/// Retrieval, prompt formatting and a single LLM call.
#[derive(Clone)]
pub struct GenerationChain {
    retriever: Retriever,
    prompt: PromptTemplate,
    llm: Arc<dyn LLMProvider>,
}

impl GenerationChain {
    pub fn new(retriever: Retriever, prompt: PromptTemplate, llm: Arc<dyn LLMProvider>) -> Self {
        Self {
            retriever,
            prompt,
            llm,
        }
    }

    /// Chain over the standard document prompt.
    pub fn with_document_prompt(retriever: Retriever, llm: Arc<dyn LLMProvider>) -> Result<Self> {
        Ok(Self::new(retriever, document_prompt()?, llm))
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn llm(&self) -> &Arc<dyn LLMProvider> {
        &self.llm
    }

    #[instrument(skip(self, request), fields(doc_type = %request.doc_type))]
    pub async fn generate(&self, request: &DocumentRequest) -> Result<GeneratedDocument> {
        let description = request.project_description.trim();
        if description.is_empty() {
            return Err(DocGenError::invalid_input(EMPTY_DESCRIPTION_MESSAGE));
        }

        let start = Instant::now();

        let relevant = self
            .retriever
            .get_relevant_documents(&request.project_description)
            .await?;
        let context = join_context(&relevant);

        let values = HashMap::from([
            ("project_description", request.project_description.as_str()),
            ("context", context.as_str()),
            ("doc_type", request.doc_type.label()),
        ]);
        let prompt = self.prompt.format(&values)?;

        let response = self.llm.generate(&prompt).await?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        info!(
            "Generated {} ({} chars, {} context chunks) in {}ms",
            request.doc_type,
            response.content.len(),
            relevant.len(),
            elapsed_ms
        );

        Ok(GeneratedDocument {
            id: Uuid::new_v4(),
            doc_type: request.doc_type,
            content: response.content,
            sources: relevant.iter().map(SourceReference::from).collect(),
            model: response.model,
            created_at: Utc::now(),
            elapsed_ms,
        })
    }
}
