use async_trait::async_trait;
use docgen_ai::{DocumentRequest, GenerationChain, LLMProvider, LLMResponse};
use docgen_core::{DocGenError, DocumentType, Result, TextChunk};
use docgen_vector::{EmbeddingProvider, Retriever, VectorStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Embeds text as a single value: its character count.
struct LengthEmbedder;

#[async_trait]
impl EmbeddingProvider for LengthEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| vec![t.chars().count() as f32])
            .collect())
    }

    fn dimension(&self) -> Option<usize> {
        Some(1)
    }

    fn provider_name(&self) -> &str {
        "length"
    }

    fn model_name(&self) -> &str {
        "length"
    }

    async fn is_available(&self) -> bool {
        true
    }
}

/// Records every prompt and answers with a fixed document.
#[derive(Default)]
struct RecordingLlm {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LLMProvider for RecordingLlm {
    async fn generate(&self, prompt: &str) -> Result<LLMResponse> {
        self.prompts.lock().await.push(prompt.to_string());
        Ok(LLMResponse {
            content: "1. Overview\nA generated design.".to_string(),
            model: "recording".to_string(),
            prompt_tokens: None,
            completion_tokens: None,
            duration: Duration::from_millis(1),
        })
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &str {
        "recording"
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

fn chain_over(texts: &[&str], k: usize) -> (GenerationChain, Arc<RecordingLlm>) {
    let mut store = VectorStore::new();
    let chunks: Vec<TextChunk> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| TextChunk::new(text.to_string(), PathBuf::from("past/design.pdf"), i as u32, 0))
        .collect();
    let embeddings = texts
        .iter()
        .map(|t| vec![t.chars().count() as f32])
        .collect();
    store.add(chunks, embeddings).unwrap();

    let retriever = Retriever::new(Arc::new(RwLock::new(store)), Arc::new(LengthEmbedder), k);
    let llm = Arc::new(RecordingLlm::default());
    let chain = GenerationChain::with_document_prompt(retriever, llm.clone()).unwrap();
    (chain, llm)
}

#[tokio::test]
async fn blank_description_is_rejected_before_any_call() {
    let (chain, llm) = chain_over(&["context"], 5);
    let request = DocumentRequest {
        doc_type: DocumentType::Frs,
        project_description: "   \n\t".to_string(),
    };

    match chain.generate(&request).await {
        Err(DocGenError::InvalidInput(msg)) => {
            assert_eq!(msg, "Please provide a project description.")
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(llm.prompts.lock().await.is_empty());
}

#[tokio::test]
async fn prompt_carries_label_description_and_nearest_context() {
    // query length 8 -> nearest are "eight ch" (8) and "nine char" (9)
    let (chain, llm) = chain_over(&["far away context text", "eight ch", "nine char"], 2);
    let request = DocumentRequest {
        doc_type: DocumentType::DesignDocument,
        project_description: "payrolls".to_string(),
    };

    let document = chain.generate(&request).await.unwrap();
    assert_eq!(document.content, "1. Overview\nA generated design.");
    assert_eq!(document.model, "recording");
    assert_eq!(document.doc_type, DocumentType::DesignDocument);
    assert_eq!(document.title(), "Design Document");
    assert_eq!(document.sources.len(), 2);
    assert_eq!(document.sources[0].page, 1);
    assert_eq!(document.sources[1].page, 2);

    let prompts = llm.prompts.lock().await;
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("structured Design Document document"));
    assert!(prompt.contains("\"payrolls\""));
    assert!(prompt.contains("\"eight ch\n\nnine char\""));
    assert!(!prompt.contains("far away"));
}

#[tokio::test]
async fn empty_index_generates_with_empty_context() {
    let retriever = Retriever::new(
        Arc::new(RwLock::new(VectorStore::new())),
        Arc::new(LengthEmbedder),
        5,
    );
    let llm = Arc::new(RecordingLlm::default());
    let chain = GenerationChain::with_document_prompt(retriever, llm.clone()).unwrap();

    let document = chain
        .generate(&DocumentRequest {
            doc_type: DocumentType::Frs,
            project_description: "An inventory tracker".to_string(),
        })
        .await
        .unwrap();

    assert!(document.sources.is_empty());
    let prompts = llm.prompts.lock().await;
    assert!(prompts[0].contains("similar documents:\n\"\""));
    assert!(prompts[0].contains("Functional Requirement Specification (FRS) document"));
}
