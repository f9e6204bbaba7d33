use docgen_core::{ChunkingConfig, DocGenError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, info};

use crate::indexer::IndexStats;
use crate::store::VectorStore;

const SNAPSHOT_VERSION: u32 = 1;

/// Persisted index together with the corpus fingerprint it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub version: u32,
    pub fingerprint: String,
    pub stats: IndexStats,
    pub store: VectorStore,
}

impl IndexSnapshot {
    pub fn new(fingerprint: String, stats: IndexStats, store: VectorStore) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            fingerprint,
            stats,
            store,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| DocGenError::Vector(format!("Failed to encode index snapshot: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &bytes)?;

        info!(
            "Saved index snapshot ({} chunks, {} bytes) to {}",
            self.store.len(),
            bytes.len(),
            path.display()
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let (snapshot, _): (Self, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).map_err(
                |e| DocGenError::Vector(format!("Failed to decode index snapshot: {}", e)),
            )?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(DocGenError::Vector(format!(
                "Unsupported index snapshot version {}",
                snapshot.version
            )));
        }

        debug!("Loaded index snapshot from {}", path.display());
        Ok(snapshot)
    }

    /// Load the snapshot only when it was built from the same inputs.
    pub fn load_matching(path: &Path, fingerprint: &str) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match Self::load(path) {
            Ok(snapshot) if snapshot.fingerprint == fingerprint => Some(snapshot),
            Ok(_) => {
                info!("Index snapshot at {} is stale, rebuilding", path.display());
                None
            }
            Err(e) => {
                info!("Ignoring unreadable index snapshot {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Hash of everything that determines the index contents: corpus files (path,
/// size, mtime), chunking settings and the embedding model.
pub fn corpus_fingerprint(
    paths: &[PathBuf],
    chunking: &ChunkingConfig,
    embedding_model: &str,
) -> Result<String> {
    let mut hasher = Sha256::new();

    for path in paths {
        let metadata = std::fs::metadata(path)?;
        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or(0);

        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update([0u8]);
        hasher.update(metadata.len().to_le_bytes());
        hasher.update(modified.to_le_bytes());
    }

    hasher.update(chunking.chunk_size.to_le_bytes());
    hasher.update(chunking.chunk_overlap.to_le_bytes());
    hasher.update(chunking.separator.as_bytes());
    hasher.update([0u8]);
    hasher.update(embedding_model.as_bytes());

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgen_core::TextChunk;

    fn sample_store() -> VectorStore {
        let mut store = VectorStore::new();
        store
            .add(
                vec![TextChunk::new(
                    "Scope of the billing module".into(),
                    PathBuf::from("pdfs/billing.pdf"),
                    3,
                    1,
                )],
                vec![vec![0.25, -0.5, 1.0]],
            )
            .unwrap();
        store
    }

    #[test]
    fn save_then_load_preserves_search_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache/index.bin");
        let stats = IndexStats {
            chunks: 1,
            ..IndexStats::default()
        };

        IndexSnapshot::new("abc".into(), stats, sample_store())
            .save(&path)
            .unwrap();
        let loaded = IndexSnapshot::load(&path).unwrap();

        assert_eq!(loaded.fingerprint, "abc");
        assert_eq!(loaded.stats.chunks, 1);
        let hits = loaded.store.search(&[0.25, -0.5, 1.0], 1).unwrap();
        assert_eq!(hits[0].chunk.content, "Scope of the billing module");
        assert_eq!(hits[0].chunk.page, 3);
    }

    #[test]
    fn stale_or_corrupt_snapshots_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.bin");
        assert!(IndexSnapshot::load_matching(&path, "abc").is_none());

        IndexSnapshot::new("abc".into(), IndexStats::default(), sample_store())
            .save(&path)
            .unwrap();
        assert!(IndexSnapshot::load_matching(&path, "abc").is_some());
        assert!(IndexSnapshot::load_matching(&path, "def").is_none());

        std::fs::write(&path, b"garbage").unwrap();
        assert!(IndexSnapshot::load_matching(&path, "abc").is_none());
    }

    #[test]
    fn fingerprint_tracks_files_and_settings() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("a.pdf");
        std::fs::write(&pdf, b"one").unwrap();
        let paths = vec![pdf.clone()];
        let chunking = ChunkingConfig::default();

        let base = corpus_fingerprint(&paths, &chunking, "all-minilm").unwrap();
        assert_eq!(
            base,
            corpus_fingerprint(&paths, &chunking, "all-minilm").unwrap()
        );
        assert_ne!(
            base,
            corpus_fingerprint(&paths, &chunking, "nomic-embed-text").unwrap()
        );

        let mut wider = chunking.clone();
        wider.chunk_size = 1000;
        assert_ne!(base, corpus_fingerprint(&paths, &wider, "all-minilm").unwrap());

        std::fs::write(&pdf, b"one more").unwrap();
        assert_ne!(
            base,
            corpus_fingerprint(&paths, &chunking, "all-minilm").unwrap()
        );
    }
}
