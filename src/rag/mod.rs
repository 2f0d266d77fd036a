//! Retrieval-augmented generation pipeline.
//!
//! - `RecursiveTextSplitter`: splits extracted text into overlapping chunks
//! - `IndexManager`: embeds chunks and owns the persisted vector index
//! - `AnswerGenerator`: answers a question from retrieved chunks

mod answer;
mod chunker;
mod index;
pub mod sqlite;
pub mod store;
#[doc(hidden)]
pub mod testing;

pub use answer::{build_prompt, AnswerGenerator, NOT_IN_CONTEXT};
pub use chunker::RecursiveTextSplitter;
pub use index::{IndexError, IndexHandle, IndexManager, IndexStatus};
pub use sqlite::SqliteVectorStore;
pub use store::{ChunkSearchResult, IndexMeta, StoreError, StoredChunk, VectorStore};
