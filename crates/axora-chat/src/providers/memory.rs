//! In-memory provider implementations
//!
//! A linear cosine-similarity scan is enough for the collection sizes this
//! core sees in local development and tests; production deployments swap in a
//! real vector database behind the same trait.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::chat::StoredMessage;
use crate::types::chunk::{CollectionStats, KnowledgeChunk, ScoredChunk};

use super::chunk_store::ChunkStoreProvider;
use super::message_store::MessageStoreProvider;

/// Cosine similarity between two vectors, 0.0 for degenerate input
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// In-memory chunk store keyed by chunk ID
#[derive(Default)]
pub struct MemoryChunkStore {
    chunks: DashMap<Uuid, KnowledgeChunk>,
}

impl MemoryChunkStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChunkStoreProvider for MemoryChunkStore {
    async fn insert(&self, chunk: &KnowledgeChunk) -> Result<()> {
        if chunk.embedding.is_empty() {
            return Err(Error::ChunkStore("Chunk has no embedding".to_string()));
        }
        self.chunks.insert(chunk.id, chunk.clone());
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        candidates: usize,
        collections: &[String],
    ) -> Result<Vec<ScoredChunk>> {
        let mut results: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .filter(|entry| collections.contains(&entry.collection))
            .map(|entry| ScoredChunk {
                score: cosine_similarity(query_embedding, &entry.embedding),
                chunk: entry.clone(),
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(candidates);

        Ok(results)
    }

    async fn delete_by_doc_id(&self, doc_id: &str) -> Result<usize> {
        let ids: Vec<Uuid> = self
            .chunks
            .iter()
            .filter(|entry| entry.doc_id == doc_id)
            .map(|entry| entry.id)
            .collect();

        let mut deleted = 0;
        for id in ids {
            if self.chunks.remove(&id).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn collection_stats(&self, collection: &str) -> Result<CollectionStats> {
        let mut total_chunks = 0usize;
        let mut total_length = 0usize;
        let mut doc_ids = std::collections::HashSet::new();

        for entry in self.chunks.iter() {
            if entry.collection == collection {
                total_chunks += 1;
                total_length += entry.text.chars().count();
                doc_ids.insert(entry.doc_id.clone());
            }
        }

        let avg_chunk_length = if total_chunks > 0 {
            (total_length as f64 / total_chunks as f64 * 100.0).round() / 100.0
        } else {
            0.0
        };

        Ok(CollectionStats {
            total_chunks,
            total_documents: doc_ids.len(),
            avg_chunk_length,
        })
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.chunks.len())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// In-memory append-only message store
#[derive(Default)]
pub struct MemoryMessageStore {
    messages: RwLock<Vec<(String, StoredMessage)>>,
}

impl MemoryMessageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a stored message by ID (inspection helper, not part of the
    /// provider contract)
    pub fn get(&self, message_id: &str) -> Option<StoredMessage> {
        self.messages
            .read()
            .iter()
            .find(|(id, _)| id == message_id)
            .map(|(_, msg)| msg.clone())
    }

    /// All messages for a conversation, in append order
    pub fn conversation(&self, conversation_id: &str) -> Vec<StoredMessage> {
        self.messages
            .read()
            .iter()
            .filter(|(_, msg)| msg.conversation_id == conversation_id)
            .map(|(_, msg)| msg.clone())
            .collect()
    }
}

#[async_trait]
impl MessageStoreProvider for MemoryMessageStore {
    async fn append(&self, message: &StoredMessage) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.messages.write().push((id.clone(), message.clone()));
        Ok(id)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::chat::{Citation, MessageRole};

    fn chunk(collection: &str, doc_id: &str, text: &str, embedding: Vec<f32>) -> KnowledgeChunk {
        let mut c = KnowledgeChunk::new(collection, doc_id, text);
        c.embedding = embedding;
        c
    }

    #[test]
    fn cosine_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn search_filters_by_collection_and_ranks() {
        let store = MemoryChunkStore::new();
        store
            .insert(&chunk("a", "d1", "close", vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .insert(&chunk("a", "d2", "far", vec![0.0, 1.0]))
            .await
            .unwrap();
        store
            .insert(&chunk("b", "d3", "other collection", vec![1.0, 0.0]))
            .await
            .unwrap();

        let results = store
            .search(&[1.0, 0.0], 10, &["a".to_string()])
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "close");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn insert_requires_embedding() {
        let store = MemoryChunkStore::new();
        let result = store.insert(&KnowledgeChunk::new("a", "d1", "text")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn delete_by_doc_id_and_stats() {
        let store = MemoryChunkStore::new();
        store
            .insert(&chunk("a", "d1", "first chunk", vec![1.0]))
            .await
            .unwrap();
        store
            .insert(&chunk("a", "d1", "second chunk", vec![1.0]))
            .await
            .unwrap();
        store
            .insert(&chunk("a", "d2", "third", vec![1.0]))
            .await
            .unwrap();

        let stats = store.collection_stats("a").await.unwrap();
        assert_eq!(stats.total_chunks, 3);
        assert_eq!(stats.total_documents, 2);
        assert!(stats.avg_chunk_length > 0.0);

        let deleted = store.delete_by_doc_id("d1").await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.len().await.unwrap(), 1);

        // Unknown collection yields zeroed stats, not an error
        let empty = store.collection_stats("missing").await.unwrap();
        assert_eq!(empty.total_chunks, 0);
    }

    #[tokio::test]
    async fn message_store_appends_and_reads_back() {
        let store = MemoryMessageStore::new();
        let message = StoredMessage::assistant(
            "conv-1",
            "hello",
            vec![Citation {
                source_id: "doc-1".to_string(),
                title: None,
                url: None,
            }],
        );
        let id = store.append(&message).await.unwrap();

        let stored = store.get(&id).unwrap();
        assert_eq!(stored.role, MessageRole::Assistant);
        assert_eq!(stored.text, "hello");
        assert_eq!(store.conversation("conv-1").len(), 1);
    }
}
