//! Chunk store provider trait for storing and searching embeddings

use async_trait::async_trait;

use crate::error::Result;
use crate::types::chunk::{CollectionStats, KnowledgeChunk, ScoredChunk};

/// Trait for chunk storage and filtered similarity search
///
/// Implementations:
/// - `MemoryChunkStore`: in-process cosine-similarity scan
#[async_trait]
pub trait ChunkStoreProvider: Send + Sync {
    /// Insert a chunk with its embedding
    async fn insert(&self, chunk: &KnowledgeChunk) -> Result<()>;

    /// Insert multiple chunks (batch)
    async fn insert_batch(&self, chunks: &[KnowledgeChunk]) -> Result<()> {
        for chunk in chunks {
            self.insert(chunk).await?;
        }
        Ok(())
    }

    /// Search for chunks similar to the query embedding, constrained to the
    /// given collections, returning up to `candidates` results ranked by
    /// descending similarity
    async fn search(
        &self,
        query_embedding: &[f32],
        candidates: usize,
        collections: &[String],
    ) -> Result<Vec<ScoredChunk>>;

    /// Delete all chunks belonging to a source document
    async fn delete_by_doc_id(&self, doc_id: &str) -> Result<usize>;

    /// Aggregate statistics for one collection
    async fn collection_stats(&self, collection: &str) -> Result<CollectionStats>;

    /// Total number of chunks stored
    async fn len(&self) -> Result<usize>;

    /// Check if store is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
