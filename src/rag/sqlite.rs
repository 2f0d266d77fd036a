//! SQLite-backed vector store.
//!
//! In-process index using SQLite for chunk text and metadata and
//! brute-force cosine similarity for search.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::store::{
    cosine_similarity, ChunkSearchResult, IndexMeta, StoreError, StoredChunk, VectorStore,
};

const META_KEY: &str = "index";

pub struct SqliteVectorStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteVectorStore {
    pub async fn open(db_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let db_path = db_path.into();
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await?;

        let store = Self { pool, db_path };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rag_chunks (
                position INTEGER PRIMARY KEY,
                content TEXT NOT NULL,
                embedding BLOB NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rag_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Result<Vec<f32>, StoreError> {
        if bytes.len() % 4 != 0 {
            return Err(StoreError::Corrupt(format!(
                "embedding blob of {} bytes",
                bytes.len()
            )));
        }
        Ok(bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }

    fn row_to_chunk(row: &sqlx::sqlite::SqliteRow) -> StoredChunk {
        let position: i64 = row.get("position");
        StoredChunk {
            position: position as usize,
            content: row.get("content"),
        }
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn replace_all(
        &self,
        meta: &IndexMeta,
        items: Vec<(StoredChunk, Vec<f32>)>,
    ) -> Result<(), StoreError> {
        let meta_json =
            serde_json::to_string(meta).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM rag_chunks").execute(&mut *tx).await?;

        for (chunk, embedding) in &items {
            let blob = Self::serialize_embedding(embedding);
            sqlx::query("INSERT INTO rag_chunks (position, content, embedding) VALUES (?1, ?2, ?3)")
                .bind(chunk.position as i64)
                .bind(&chunk.content)
                .bind(&blob)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            "INSERT OR REPLACE INTO rag_meta (key, value, updated_at)
             VALUES (?1, ?2, STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))",
        )
        .bind(META_KEY)
        .bind(&meta_json)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ChunkSearchResult>, StoreError> {
        let rows = sqlx::query("SELECT position, content, embedding FROM rag_chunks")
            .fetch_all(&self.pool)
            .await?;

        let mut scored = Vec::with_capacity(rows.len());
        for row in &rows {
            let embedding_bytes: Vec<u8> = row.get("embedding");
            let stored = Self::deserialize_embedding(&embedding_bytes)?;
            scored.push(ChunkSearchResult {
                chunk: Self::row_to_chunk(row),
                score: cosine_similarity(query_embedding, &stored),
            });
        }

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.chunk.position.cmp(&b.chunk.position))
        });
        scored.truncate(limit);

        Ok(scored)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rag_chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn chunks(&self) -> Result<Vec<StoredChunk>, StoreError> {
        let rows = sqlx::query("SELECT position, content FROM rag_chunks ORDER BY position")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(Self::row_to_chunk).collect())
    }

    async fn meta(&self) -> Result<Option<IndexMeta>, StoreError> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM rag_meta WHERE key = ?1")
            .bind(META_KEY)
            .fetch_optional(&self.pool)
            .await?;

        value
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| StoreError::Corrupt(e.to_string()))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    async fn test_store() -> (tempfile::TempDir, SqliteVectorStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = SqliteVectorStore::open(tmp.path().join("index.db"))
            .await
            .unwrap();
        (tmp, store)
    }

    fn meta(source: &str, chunk_count: usize) -> IndexMeta {
        IndexMeta {
            source: source.to_string(),
            embedding_model: "fake".to_string(),
            dimensions: 3,
            chunk_count,
            built_at: Utc::now(),
        }
    }

    fn item(position: usize, content: &str, embedding: [f32; 3]) -> (StoredChunk, Vec<f32>) {
        (
            StoredChunk {
                position,
                content: content.to_string(),
            },
            embedding.to_vec(),
        )
    }

    #[tokio::test]
    async fn fresh_store_has_no_meta() {
        let (_tmp, store) = test_store().await;
        assert!(store.meta().await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.search(&[1.0, 0.0, 0.0], 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_and_search() {
        let (_tmp, store) = test_store().await;
        let items = vec![
            item(0, "about rust", [1.0, 0.0, 0.0]),
            item(1, "about python", [0.0, 1.0, 0.0]),
            item(2, "mostly rust", [0.9, 0.1, 0.0]),
        ];
        store.replace_all(&meta("doc.txt", 3), items).await.unwrap();

        let results = store.search(&[1.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "about rust");
        assert!(results[0].score > 0.99);
        assert_eq!(results[1].chunk.content, "mostly rust");

        let stored = store.meta().await.unwrap().unwrap();
        assert_eq!(stored.source, "doc.txt");
        assert_eq!(stored.chunk_count, 3);
    }

    #[tokio::test]
    async fn replace_discards_previous_corpus() {
        let (_tmp, store) = test_store().await;
        store
            .replace_all(
                &meta("a.txt", 2),
                vec![item(0, "A0", [1.0, 0.0, 0.0]), item(1, "A1", [0.0, 1.0, 0.0])],
            )
            .await
            .unwrap();
        store
            .replace_all(&meta("b.txt", 1), vec![item(0, "B0", [0.0, 0.0, 1.0])])
            .await
            .unwrap();

        let contents: Vec<String> = store
            .chunks()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(contents, vec!["B0"]);
        assert_eq!(store.meta().await.unwrap().unwrap().source, "b.txt");
    }

    #[tokio::test]
    async fn index_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("index.db");
        {
            let store = SqliteVectorStore::open(&path).await.unwrap();
            store
                .replace_all(&meta("doc.txt", 1), vec![item(0, "kept", [1.0, 0.0, 0.0])])
                .await
                .unwrap();
        }

        let reopened = SqliteVectorStore::open(&path).await.unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
        assert_eq!(reopened.chunks().await.unwrap()[0].content, "kept");
    }

    #[test]
    fn embedding_blob_round_trips_exactly() {
        let embedding = vec![0.25_f32, -1.5, 3.0e-8];
        let bytes = SqliteVectorStore::serialize_embedding(&embedding);
        assert_eq!(bytes.len(), 12);
        assert_eq!(
            SqliteVectorStore::deserialize_embedding(&bytes).unwrap(),
            embedding
        );
        assert!(SqliteVectorStore::deserialize_embedding(&bytes[..5]).is_err());
    }
}
