use docgen_core::{DocGenError, Result, ScoredChunk, TextChunk};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct IndexedChunk {
    pub(crate) chunk: TextChunk,
    pub(crate) embedding: Vec<f32>,
}

/// Exact nearest-neighbour index over chunk embeddings, ranked by squared L2
/// distance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorStore {
    entries: Vec<IndexedChunk>,
    dimension: Option<usize>,
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add chunks with their embeddings. All vectors must share one dimension.
    pub fn add(&mut self, chunks: Vec<TextChunk>, embeddings: Vec<Vec<f32>>) -> Result<()> {
        if chunks.len() != embeddings.len() {
            return Err(DocGenError::Vector(format!(
                "Got {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let mut dimension = self.dimension;
        for embedding in &embeddings {
            if embedding.is_empty() {
                return Err(DocGenError::Vector("Empty embedding vector".to_string()));
            }
            match dimension {
                Some(dim) if dim != embedding.len() => {
                    return Err(DocGenError::Vector(format!(
                        "Embedding dimension mismatch: index has {}, got {}",
                        dim,
                        embedding.len()
                    )));
                }
                Some(_) => {}
                None => dimension = Some(embedding.len()),
            }
        }

        self.dimension = dimension;
        self.entries.extend(
            chunks
                .into_iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| IndexedChunk { chunk, embedding }),
        );
        Ok(())
    }

    /// The `k` chunks closest to `query`, nearest first. Equal distances keep
    /// insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let Some(dimension) = self.dimension else {
            return Ok(Vec::new());
        };
        if query.len() != dimension {
            return Err(DocGenError::Vector(format!(
                "Query dimension {} does not match index dimension {}",
                query.len(),
                dimension
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .par_iter()
            .enumerate()
            .map(|(idx, entry)| (idx, squared_l2(query, &entry.embedding)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        debug!(
            "Vector search over {} chunks returned {}",
            self.entries.len(),
            scored.len()
        );

        Ok(scored
            .into_iter()
            .map(|(idx, distance)| ScoredChunk {
                chunk: self.entries[idx].chunk.clone(),
                distance,
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Distinct source files represented in the index
    pub fn sources(&self) -> BTreeSet<PathBuf> {
        self.entries
            .iter()
            .map(|entry| entry.chunk.source.clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.dimension = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str) -> TextChunk {
        TextChunk::new(content.to_string(), PathBuf::from("a.pdf"), 0, 0)
    }

    fn store() -> VectorStore {
        let mut store = VectorStore::new();
        store
            .add(
                vec![chunk("east"), chunk("north"), chunk("mostly east")],
                vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.9, 0.1]],
            )
            .unwrap();
        store
    }

    #[test]
    fn ranks_by_l2_distance() {
        let results = store().search(&[1.0, 0.0], 3).unwrap();
        let order: Vec<&str> = results.iter().map(|r| r.chunk.content.as_str()).collect();
        assert_eq!(order, vec!["east", "mostly east", "north"]);
        assert_eq!(results[0].distance, 0.0);
        assert!((results[2].distance - 2.0).abs() < 1e-6);
    }

    #[test]
    fn k_limits_and_exceeds_gracefully() {
        assert_eq!(store().search(&[0.0, 1.0], 1).unwrap()[0].chunk.content, "north");
        assert_eq!(store().search(&[0.0, 1.0], 50).unwrap().len(), 3);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut store = VectorStore::new();
        store
            .add(
                vec![chunk("first"), chunk("second")],
                vec![vec![1.0, 1.0], vec![1.0, 1.0]],
            )
            .unwrap();
        let results = store.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(results[0].chunk.content, "first");
        assert_eq!(results[1].chunk.content, "second");
    }

    #[test]
    fn empty_store_returns_nothing() {
        let store = VectorStore::new();
        assert!(store.search(&[1.0, 2.0, 3.0], 5).unwrap().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn rejects_mismatched_dimensions() {
        let mut store = store();
        assert!(store.search(&[1.0, 0.0, 0.0], 1).is_err());
        assert!(store.add(vec![chunk("x")], vec![vec![1.0]]).is_err());
        assert!(store.add(vec![chunk("x")], vec![]).is_err());
        // failed adds leave the store untouched
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn reports_sources_and_clears() {
        let mut store = store();
        store
            .add(
                vec![TextChunk::new("b".into(), PathBuf::from("b.pdf"), 2, 0)],
                vec![vec![0.5, 0.5]],
            )
            .unwrap();
        assert_eq!(store.sources().len(), 2);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.dimension(), None);
    }
}
