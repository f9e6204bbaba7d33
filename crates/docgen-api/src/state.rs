use docgen_ai::{GenerationChain, LLMProvider, LLMProviderFactory};
use docgen_core::{DocGenConfig, Result};
use docgen_vector::{EmbeddingProvider, EmbeddingProviderFactory, IndexStats, Indexer, Retriever, VectorStore};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::documents::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DocGenConfig>,
    pub chain: GenerationChain,
    pub indexer: Arc<Indexer>,
    pub vector_store: Arc<RwLock<VectorStore>>,
    pub index_stats: Arc<RwLock<IndexStats>>,
    pub documents: Arc<DocumentStore>,
    /// Serializes index rebuilds.
    pub rebuild_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Create providers from configuration and load or build the index.
    pub async fn new(config: DocGenConfig) -> Result<Self> {
        let embedder = EmbeddingProviderFactory::create(&config.embedding)?;
        let llm = LLMProviderFactory::create(&config.llm)?;

        if !embedder.is_available().await {
            warn!(
                "Embedding model '{}' is not available at {}",
                embedder.model_name(),
                config.embedding.ollama_url
            );
        }
        if !llm.is_available().await {
            warn!(
                "LLM '{}' is not available at {}",
                llm.model_name(),
                config.llm.ollama_url
            );
        }

        let indexer = Arc::new(Indexer::new(config.clone(), embedder));
        let (store, stats) = indexer.load_or_build().await?;
        info!(
            "Index ready: {} chunks from {} files",
            stats.chunks, stats.files
        );

        Self::assemble(config, indexer, llm, store, stats)
    }

    /// Assemble state around an already built index.
    pub fn from_parts(
        config: DocGenConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LLMProvider>,
        store: VectorStore,
        stats: IndexStats,
    ) -> Result<Self> {
        let indexer = Arc::new(Indexer::new(config.clone(), embedder));
        Self::assemble(config, indexer, llm, store, stats)
    }

    fn assemble(
        config: DocGenConfig,
        indexer: Arc<Indexer>,
        llm: Arc<dyn LLMProvider>,
        store: VectorStore,
        stats: IndexStats,
    ) -> Result<Self> {
        let vector_store = Arc::new(RwLock::new(store));
        let retriever = Retriever::new(
            vector_store.clone(),
            indexer.embedder().clone(),
            config.retrieval.top_k,
        );
        let chain = GenerationChain::with_document_prompt(retriever, llm)?;
        let documents = Arc::new(DocumentStore::new(config.export.retain_documents));

        Ok(Self {
            config: Arc::new(config),
            chain,
            indexer,
            vector_store,
            index_stats: Arc::new(RwLock::new(stats)),
            documents,
            rebuild_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn embedding_model(&self) -> &str {
        self.indexer.embedder().model_name()
    }

    pub fn llm_model(&self) -> &str {
        self.chain.llm().model_name()
    }

    /// Rebuild the index from the corpus and swap it in.
    pub async fn rebuild_index(&self) -> Result<IndexStats> {
        let _guard = self.rebuild_lock.lock().await;

        let (store, stats) = self.indexer.rebuild().await?;
        *self.vector_store.write().await = store;
        *self.index_stats.write().await = stats.clone();

        info!("Index rebuilt: {} chunks", stats.chunks);
        Ok(stats)
    }
}
