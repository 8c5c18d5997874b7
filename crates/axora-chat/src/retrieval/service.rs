//! Retrieval service: query-time search plus chunk ingestion

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{ChatConfig, RetrievalConfig};
use crate::error::Result;
use crate::providers::{ChunkStoreProvider, EmbeddingProvider};
use crate::types::chunk::{ChunkPosition, CollectionStats, KnowledgeChunk, RetrievalResult};

/// Ingestion input: a chunk before embedding
#[derive(Debug, Clone)]
pub struct NewChunk {
    pub collection: String,
    pub doc_id: String,
    pub text: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub metadata: HashMap<String, serde_json::Value>,
    pub position: Option<ChunkPosition>,
}

impl NewChunk {
    pub fn new(
        collection: impl Into<String>,
        doc_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            doc_id: doc_id.into(),
            text: text.into(),
            title: None,
            url: None,
            metadata: HashMap::new(),
            position: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Carry the chunker's position metadata into the stored chunk
    pub fn with_position(mut self, position: ChunkPosition) -> Self {
        self.position = Some(position);
        self
    }

    fn into_chunk(self, embedding: Vec<f32>) -> KnowledgeChunk {
        let mut chunk = KnowledgeChunk::new(self.collection, self.doc_id, self.text);
        chunk.title = self.title;
        chunk.url = self.url;
        chunk.metadata = self.metadata;
        if let Some(position) = self.position {
            chunk = chunk.with_position(position);
        }
        chunk.embedding = embedding;
        chunk
    }
}

/// Embeds queries and searches the chunk store, and embeds and persists new
/// chunks during ingestion
pub struct RetrievalService {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn ChunkStoreProvider>,
    config: RetrievalConfig,
    batch_size: usize,
}

impl RetrievalService {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn ChunkStoreProvider>,
        config: &ChatConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config: config.retrieval.clone(),
            batch_size: config.embeddings.batch_size.max(1),
        }
    }

    /// Search the given collections for chunks similar to `query`, ranked by
    /// descending similarity and truncated to `top_k`.
    ///
    /// An empty result is normal, not an error. Provider failures propagate;
    /// the orchestrator treats them as non-fatal.
    pub async fn search(
        &self,
        query: &str,
        collections: &[String],
        top_k: usize,
    ) -> Result<Vec<RetrievalResult>> {
        let embedding = self.embedder.embed(query).await?;

        // Over-fetch to compensate for recall loss under collection filters,
        // then re-filter and truncate.
        let candidates = self.config.candidate_floor.max(top_k * 10);
        let scored = self.store.search(&embedding, candidates, collections).await?;

        let results: Vec<RetrievalResult> = scored
            .into_iter()
            .filter(|s| collections.contains(&s.chunk.collection))
            .filter(|s| s.score >= self.config.min_score)
            .take(top_k)
            .map(RetrievalResult::from_scored)
            .collect();

        debug!(
            query_len = query.len(),
            collections = ?collections,
            results = results.len(),
            "retrieval search complete"
        );
        Ok(results)
    }

    /// Embed and persist a single chunk, returning its generated id
    pub async fn add_chunk(&self, chunk: NewChunk) -> Result<Uuid> {
        let embedding = self.embedder.embed(&chunk.text).await?;
        let chunk = chunk.into_chunk(embedding);
        let id = chunk.id;
        self.store.insert(&chunk).await?;
        Ok(id)
    }

    /// Embed and persist a batch of chunks.
    ///
    /// Embedding calls are grouped to bound concurrent provider requests;
    /// groups run sequentially. A failing group stops the batch: earlier
    /// groups stay persisted, the failing group inserts nothing.
    pub async fn add_chunks(&self, chunks: Vec<NewChunk>) -> Result<Vec<Uuid>> {
        let total = chunks.len();
        let mut ids = Vec::with_capacity(total);

        for group in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = group.iter().map(|c| c.text.clone()).collect();
            let embeddings = match self.embedder.embed_batch(&texts).await {
                Ok(embeddings) => embeddings,
                Err(err) => {
                    warn!(
                        inserted = ids.len(),
                        total,
                        error = %err,
                        "batch ingestion stopped at failing group"
                    );
                    return Err(err);
                }
            };

            let batch: Vec<KnowledgeChunk> = group
                .iter()
                .cloned()
                .zip(embeddings)
                .map(|(chunk, embedding)| chunk.into_chunk(embedding))
                .collect();
            self.store.insert_batch(&batch).await?;
            ids.extend(batch.iter().map(|c| c.id));
        }

        info!(total, "batch ingestion complete");
        Ok(ids)
    }

    /// Delete every chunk belonging to a source document
    pub async fn delete_chunks_by_doc_id(&self, doc_id: &str) -> Result<usize> {
        let deleted = self.store.delete_by_doc_id(doc_id).await?;
        info!(doc_id, deleted, "deleted chunks by document id");
        Ok(deleted)
    }

    /// Aggregate statistics for one collection
    pub async fn collection_stats(&self, collection: &str) -> Result<CollectionStats> {
        self.store.collection_stats(collection).await
    }
}
