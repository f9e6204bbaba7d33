use docgen_ai::GeneratedDocument;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use uuid::Uuid;

/// A generated document and its rendered `.docx` bytes.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub document: GeneratedDocument,
    pub docx: Arc<Vec<u8>>,
}

/// Keeps the most recently generated documents available for download.
pub struct DocumentStore {
    inner: Mutex<LruCache<Uuid, StoredDocument>>,
}

impl DocumentStore {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn insert(&self, document: GeneratedDocument, docx: Vec<u8>) -> Uuid {
        let id = document.id;
        self.inner.lock().put(
            id,
            StoredDocument {
                document,
                docx: Arc::new(docx),
            },
        );
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<StoredDocument> {
        self.inner.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use docgen_core::DocumentType;

    fn document() -> GeneratedDocument {
        GeneratedDocument {
            id: Uuid::new_v4(),
            doc_type: DocumentType::Frs,
            content: "1. Introduction\nText".to_string(),
            sources: Vec::new(),
            model: "llama3".to_string(),
            created_at: Utc::now(),
            elapsed_ms: 1,
        }
    }

    #[test]
    fn evicts_least_recently_used() {
        let store = DocumentStore::new(2);
        let a = store.insert(document(), b"a".to_vec());
        let b = store.insert(document(), b"b".to_vec());

        // touch a so b becomes the eviction candidate
        assert!(store.get(&a).is_some());
        let c = store.insert(document(), b"c".to_vec());

        assert_eq!(store.len(), 2);
        assert!(store.get(&b).is_none());
        assert_eq!(store.get(&a).unwrap().docx.as_slice(), b"a");
        assert_eq!(store.get(&c).unwrap().docx.as_slice(), b"c");
    }

    #[test]
    fn zero_capacity_keeps_latest() {
        let store = DocumentStore::new(0);
        store.insert(document(), Vec::new());
        let latest = store.insert(document(), Vec::new());
        assert_eq!(store.len(), 1);
        assert!(store.get(&latest).is_some());
    }
}
