use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;

use super::store::{ChunkSearchResult, IndexMeta, StoreError, StoredChunk, VectorStore};
use crate::llm::{Embedder, LlmError};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("No document has been processed yet. Upload a file or URL first.")]
    NotBuilt,
    #[error("No text could be extracted from the document")]
    EmptyInput,
    #[error("embedding failed: {0}")]
    Embedding(#[from] LlmError),
    #[error("index storage failed: {0}")]
    Store(#[from] StoreError),
    #[error("embedder returned {got} vectors for {expected} chunks")]
    VectorCountMismatch { expected: usize, got: usize },
    #[error("query embedding has {got} dimensions, index has {expected}; rebuild the index")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Read view of a built index.
#[derive(Debug, Clone)]
pub struct IndexHandle {
    meta: IndexMeta,
}

impl IndexHandle {
    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }
}

/// Summary reported by `/health`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IndexStatus {
    pub built: bool,
    pub chunks: usize,
    pub source: Option<String>,
}

/// Owns the single corpus index: builds replace it wholesale, queries
/// read whatever corpus was last committed.
pub struct IndexManager {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    build_lock: Mutex<()>,
}

impl IndexManager {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            build_lock: Mutex::new(()),
        }
    }

    /// Embeds `chunks` and replaces the stored index with them.
    ///
    /// Concurrent builds are serialized; the last one to commit wins. The
    /// previous index stays readable until the new one is committed.
    pub async fn build(&self, source: &str, chunks: Vec<String>) -> Result<IndexHandle, IndexError> {
        if chunks.is_empty() {
            return Err(IndexError::EmptyInput);
        }

        let started = Instant::now();
        let vectors = self.embedder.embed(&chunks).await?;
        if vectors.len() != chunks.len() {
            return Err(IndexError::VectorCountMismatch {
                expected: chunks.len(),
                got: vectors.len(),
            });
        }

        let meta = IndexMeta {
            source: source.to_string(),
            embedding_model: self.embedder.model().to_string(),
            dimensions: vectors.first().map(Vec::len).unwrap_or(0),
            chunk_count: chunks.len(),
            built_at: Utc::now(),
        };

        let items = chunks
            .into_iter()
            .enumerate()
            .map(|(position, content)| StoredChunk { position, content })
            .zip(vectors)
            .collect();

        let _guard = self.build_lock.lock().await;
        self.store.replace_all(&meta, items).await?;

        tracing::info!(
            source = %meta.source,
            chunks = meta.chunk_count,
            dimensions = meta.dimensions,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Vector index rebuilt"
        );

        Ok(IndexHandle { meta })
    }

    pub async fn load(&self) -> Result<IndexHandle, IndexError> {
        match self.store.meta().await? {
            Some(meta) => Ok(IndexHandle { meta }),
            None => Err(IndexError::NotBuilt),
        }
    }

    /// Top `k` chunks for `query`, most similar first.
    ///
    /// The query embedding must match the dimensionality recorded in
    /// `handle` when the index was built.
    pub async fn search(
        &self,
        handle: &IndexHandle,
        query: &str,
        k: usize,
    ) -> Result<Vec<ChunkSearchResult>, IndexError> {
        let query_vector = self.embedder.embed_query(query).await?;
        if query_vector.len() != handle.meta.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: handle.meta.dimensions,
                got: query_vector.len(),
            });
        }

        let results = self.store.search(&query_vector, k).await?;

        tracing::debug!(
            source = %handle.meta.source,
            requested = k,
            returned = results.len(),
            "Similarity search completed"
        );
        Ok(results)
    }

    pub async fn status(&self) -> Result<IndexStatus, IndexError> {
        let meta = self.store.meta().await?;
        let chunks = self.store.count().await?;
        Ok(IndexStatus {
            built: meta.is_some(),
            chunks,
            source: meta.map(|m| m.source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::sqlite::SqliteVectorStore;
    use crate::rag::testing::{FailingEmbedder, HashEmbedder};

    async fn manager_with(embedder: Arc<dyn Embedder>) -> (tempfile::TempDir, IndexManager) {
        let tmp = tempfile::tempdir().unwrap();
        let store = SqliteVectorStore::open(tmp.path().join("index.db"))
            .await
            .unwrap();
        (tmp, IndexManager::new(Arc::new(store), embedder))
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn load_before_build_is_not_built() {
        let (_tmp, manager) = manager_with(Arc::new(HashEmbedder::default())).await;
        assert!(matches!(manager.load().await, Err(IndexError::NotBuilt)));

        let status = manager.status().await.unwrap();
        assert!(!status.built);
        assert_eq!(status.chunks, 0);
    }

    #[tokio::test]
    async fn search_ranks_matching_chunk_first() {
        let (_tmp, manager) = manager_with(Arc::new(HashEmbedder::default())).await;
        let chunks = strings(&[
            "The warranty covers parts and labour for two years.",
            "Shipping takes five business days within the country.",
            "Returns are accepted within thirty days of purchase.",
        ]);
        manager.build("policy.txt", chunks).await.unwrap();

        let handle = manager.load().await.unwrap();
        assert_eq!(handle.meta().chunk_count, 3);

        let results = manager
            .search(&handle, "shipping business days", 4)
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0].chunk.content.starts_with("Shipping"));
    }

    #[tokio::test]
    async fn search_returns_at_most_k() {
        let (_tmp, manager) = manager_with(Arc::new(HashEmbedder::default())).await;
        let chunks: Vec<String> = (0..10).map(|i| format!("chunk number {}", i)).collect();
        manager.build("many.txt", chunks).await.unwrap();

        let handle = manager.load().await.unwrap();
        assert_eq!(manager.search(&handle, "chunk", 4).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn second_build_replaces_first() {
        let (_tmp, manager) = manager_with(Arc::new(HashEmbedder::default())).await;
        manager
            .build("a.txt", strings(&["alpha one", "alpha two"]))
            .await
            .unwrap();
        manager.build("b.txt", strings(&["bravo only"])).await.unwrap();

        let handle = manager.load().await.unwrap();
        assert_eq!(handle.meta().source, "b.txt");
        let results = manager.search(&handle, "alpha one", 4).await.unwrap();
        let contents: Vec<&str> = results.iter().map(|r| r.chunk.content.as_str()).collect();
        assert_eq!(contents, vec!["bravo only"]);

        let status = manager.status().await.unwrap();
        assert!(status.built);
        assert_eq!(status.chunks, 1);
        assert_eq!(status.source.as_deref(), Some("b.txt"));
    }

    #[tokio::test]
    async fn query_from_a_different_embedding_size_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store: Arc<dyn VectorStore> = Arc::new(
            SqliteVectorStore::open(tmp.path().join("index.db"))
                .await
                .unwrap(),
        );

        let builder = IndexManager::new(store.clone(), Arc::new(HashEmbedder::default()));
        builder
            .build("a.txt", strings(&["shipping takes five days"]))
            .await
            .unwrap();

        let narrower = IndexManager::new(store, Arc::new(HashEmbedder::with_dimensions(64)));
        let handle = narrower.load().await.unwrap();
        assert_eq!(handle.meta().dimensions, 256);

        let err = narrower.search(&handle, "shipping", 4).await.unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch {
                expected: 256,
                got: 64
            }
        ));
    }

    #[tokio::test]
    async fn empty_chunk_list_is_rejected() {
        let (_tmp, manager) = manager_with(Arc::new(HashEmbedder::default())).await;
        assert!(matches!(
            manager.build("empty.txt", Vec::new()).await,
            Err(IndexError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn failed_build_keeps_previous_index() {
        let tmp = tempfile::tempdir().unwrap();
        let store: Arc<dyn VectorStore> = Arc::new(
            SqliteVectorStore::open(tmp.path().join("index.db"))
                .await
                .unwrap(),
        );

        let good = IndexManager::new(store.clone(), Arc::new(HashEmbedder::default()));
        good.build("a.txt", strings(&["kept content"])).await.unwrap();

        let failing = IndexManager::new(store.clone(), Arc::new(FailingEmbedder));
        assert!(matches!(
            failing.build("b.txt", strings(&["new content"])).await,
            Err(IndexError::Embedding(_))
        ));

        let handle = good.load().await.unwrap();
        assert_eq!(handle.meta().source, "a.txt");
        assert_eq!(store.chunks().await.unwrap()[0].content, "kept content");
    }
}
