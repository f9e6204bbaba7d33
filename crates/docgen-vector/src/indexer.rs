use docgen_core::{DocGenConfig, DocGenError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::loader::DirectoryLoader;
use crate::providers::EmbeddingProvider;
use crate::snapshot::{corpus_fingerprint, IndexSnapshot};
use crate::splitter::CharacterTextSplitter;
use crate::store::VectorStore;

/// Summary of an index build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub files: usize,
    pub files_skipped: usize,
    pub pages: usize,
    pub chunks: usize,
    pub dimension: Option<usize>,
    pub elapsed_ms: u64,
    pub from_snapshot: bool,
}

/// Builds the vector index from the PDF corpus: load, split, embed, store.
pub struct Indexer {
    config: DocGenConfig,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Indexer {
    pub fn new(config: DocGenConfig, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { config, embedder }
    }

    pub fn config(&self) -> &DocGenConfig {
        &self.config
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    #[instrument(skip(self), fields(pdf_dir = %self.config.corpus.pdf_dir.display()))]
    pub async fn build(&self) -> Result<(VectorStore, IndexStats)> {
        let start = Instant::now();
        info!("Indexing FRS/Design docs...");

        let loader = DirectoryLoader::from_config(&self.config.corpus)?;
        let (documents, report) = tokio::task::spawn_blocking(move || loader.load())
            .await
            .map_err(|e| DocGenError::External(format!("PDF loading task failed: {}", e)))??;

        let splitter = CharacterTextSplitter::from_config(&self.config.chunking)?;
        let chunks = splitter.split_documents(&documents);

        let mut store = VectorStore::new();
        if chunks.is_empty() {
            warn!(
                "No text chunks found under {}; documents will be generated without reference context",
                self.config.corpus.pdf_dir.display()
            );
        } else {
            let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embedder.embed_documents(&texts).await?;
            store.add(chunks, embeddings)?;
        }

        let stats = IndexStats {
            files: report.files_loaded,
            files_skipped: report.files_skipped,
            pages: report.pages,
            chunks: store.len(),
            dimension: store.dimension(),
            elapsed_ms: start.elapsed().as_millis() as u64,
            from_snapshot: false,
        };

        info!(
            "Indexed {} chunks from {} files ({} pages) in {}ms",
            stats.chunks, stats.files, stats.pages, stats.elapsed_ms
        );

        Ok((store, stats))
    }

    /// Reuse the snapshot at `index.cache_path` when it matches the current
    /// corpus and settings; otherwise build and refresh it.
    pub async fn load_or_build(&self) -> Result<(VectorStore, IndexStats)> {
        let Some(cache_path) = self.config.index.cache_path.clone() else {
            return self.build().await;
        };

        let fingerprint = self.fingerprint()?;
        if let Some(snapshot) = IndexSnapshot::load_matching(&cache_path, &fingerprint) {
            info!(
                "Using index snapshot {} ({} chunks)",
                cache_path.display(),
                snapshot.store.len()
            );
            let stats = IndexStats {
                from_snapshot: true,
                ..snapshot.stats
            };
            return Ok((snapshot.store, stats));
        }

        let (store, stats) = self.build().await?;
        Ok(persist(&cache_path, fingerprint, store, stats))
    }

    /// Build from the corpus ignoring any snapshot, then refresh the snapshot.
    pub async fn rebuild(&self) -> Result<(VectorStore, IndexStats)> {
        let (store, stats) = self.build().await?;
        match self.config.index.cache_path.clone() {
            Some(cache_path) => {
                let fingerprint = self.fingerprint()?;
                Ok(persist(&cache_path, fingerprint, store, stats))
            }
            None => Ok((store, stats)),
        }
    }

    fn fingerprint(&self) -> Result<String> {
        let loader = DirectoryLoader::from_config(&self.config.corpus)?;
        let paths = loader.discover()?;
        corpus_fingerprint(&paths, &self.config.chunking, &self.config.embedding.model)
    }
}

// Snapshot write failures are logged, not returned.
fn persist(
    cache_path: &Path,
    fingerprint: String,
    store: VectorStore,
    stats: IndexStats,
) -> (VectorStore, IndexStats) {
    let snapshot = IndexSnapshot::new(fingerprint, stats, store);
    if let Err(e) = snapshot.save(cache_path) {
        warn!(
            "Failed to write index snapshot {}: {}",
            cache_path.display(),
            e
        );
    }
    (snapshot.store, snapshot.stats)
}
