use docgen_core::{Result, ScoredChunk};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::providers::EmbeddingProvider;
use crate::store::VectorStore;

/// Returns the corpus chunks most similar to a query.
#[derive(Clone)]
pub struct Retriever {
    store: Arc<RwLock<VectorStore>>,
    embedder: Arc<dyn EmbeddingProvider>,
    k: usize,
}

impl Retriever {
    pub fn new(
        store: Arc<RwLock<VectorStore>>,
        embedder: Arc<dyn EmbeddingProvider>,
        k: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            k: k.max(1),
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn store(&self) -> &Arc<RwLock<VectorStore>> {
        &self.store
    }

    #[instrument(skip(self), fields(k = self.k))]
    pub async fn get_relevant_documents(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        // Nothing to rank against; skip the embedding round-trip.
        if self.store.read().await.is_empty() {
            debug!("Index is empty, returning no context");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_query(query).await?;
        let results = self.store.read().await.search(&query_embedding, self.k)?;

        debug!("Retrieved {} chunks", results.len());
        Ok(results)
    }
}

/// Join retrieved chunk texts into one prompt context block.
pub fn join_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|scored| scored.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docgen_core::TextChunk;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Embeds text as (length, count of 'x')
    struct ShapeEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for ShapeEmbedder {
        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| vec![t.len() as f32, t.matches('x').count() as f32])
                .collect())
        }

        fn dimension(&self) -> Option<usize> {
            Some(2)
        }

        fn provider_name(&self) -> &str {
            "shape"
        }

        fn model_name(&self) -> &str {
            "shape"
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    fn scored(content: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: TextChunk::new(content.to_string(), PathBuf::from("a.pdf"), 0, 0),
            distance: 0.0,
        }
    }

    #[tokio::test]
    async fn returns_k_nearest_chunks() {
        let embedder = Arc::new(ShapeEmbedder {
            calls: AtomicUsize::new(0),
        });
        let texts: Vec<String> = ["xx", "abcdefgh", "xy", "zzzzzzzzzzzzzzzz"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let embeddings = embedder.embed_documents(&texts).await.unwrap();

        let mut store = VectorStore::new();
        store
            .add(
                texts
                    .iter()
                    .map(|t| TextChunk::new(t.clone(), PathBuf::from("a.pdf"), 0, 0))
                    .collect(),
                embeddings,
            )
            .unwrap();

        let retriever = Retriever::new(Arc::new(RwLock::new(store)), embedder, 2);
        let results = retriever.get_relevant_documents("xx").await.unwrap();

        let contents: Vec<&str> = results.iter().map(|r| r.chunk.content.as_str()).collect();
        assert_eq!(contents, vec!["xx", "xy"]);
    }

    #[test]
    fn empty_index_skips_embedding() {
        let embedder = Arc::new(ShapeEmbedder {
            calls: AtomicUsize::new(0),
        });
        let retriever = Retriever::new(
            Arc::new(RwLock::new(VectorStore::new())),
            embedder.clone(),
            5,
        );

        let results = tokio_test::block_on(retriever.get_relevant_documents("anything")).unwrap();
        assert!(results.is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn context_is_blank_line_separated() {
        let context = join_context(&[scored("first"), scored("second")]);
        assert_eq!(context, "first\n\nsecond");
        assert_eq!(join_context(&[]), "");
    }
}
