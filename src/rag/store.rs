//! VectorStore trait: abstract interface for the persisted chunk index.
//!
//! The store holds exactly one corpus at a time. `replace_all` swaps the
//! whole corpus atomically; there is no incremental insert or delete.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt index: {0}")]
    Corrupt(String),
}

/// A chunk of the indexed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Position of the chunk in the source document, starting at 0.
    pub position: usize,
    pub content: String,
}

/// Result of a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSearchResult {
    pub chunk: StoredChunk,
    /// Cosine similarity (higher = better).
    pub score: f32,
}

/// Describes the corpus currently held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    /// Uploaded file name or URL the chunks came from.
    pub source: String,
    pub embedding_model: String,
    pub dimensions: usize,
    pub chunk_count: usize,
    pub built_at: DateTime<Utc>,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Replace the stored corpus with `items` in one transaction.
    async fn replace_all(
        &self,
        meta: &IndexMeta,
        items: Vec<(StoredChunk, Vec<f32>)>,
    ) -> Result<(), StoreError>;

    /// Top `limit` chunks by cosine similarity to `query_embedding`.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ChunkSearchResult>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    /// All chunks in document order.
    async fn chunks(&self) -> Result<Vec<StoredChunk>, StoreError>;

    /// `None` until the first successful `replace_all`.
    async fn meta(&self) -> Result<Option<IndexMeta>, StoreError>;
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}
