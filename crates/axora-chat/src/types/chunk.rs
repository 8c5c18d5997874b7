//! Knowledge chunk and retrieval result types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A unit of retrievable text with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// Chunk ID
    pub id: Uuid,
    /// Owning collection name
    pub collection: String,
    /// Source document identifier
    pub doc_id: String,
    /// Optional document title
    pub title: Option<String>,
    /// Optional source URL
    pub url: Option<String>,
    /// Chunk text
    pub text: String,
    /// Embedding vector (fixed dimension per store)
    pub embedding: Vec<f32>,
    /// Free-form metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Position within the source document
    pub position: ChunkPosition,
}

impl KnowledgeChunk {
    /// Create a chunk without an embedding; the retrieval service fills it in
    pub fn new(
        collection: impl Into<String>,
        doc_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            collection: collection.into(),
            doc_id: doc_id.into(),
            title: None,
            url: None,
            text: text.into(),
            embedding: Vec::new(),
            metadata: HashMap::new(),
            position: ChunkPosition::default(),
        }
    }

    /// Set the document title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the source URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the position within the source document
    pub fn with_position(mut self, position: ChunkPosition) -> Self {
        self.position = position;
        self
    }
}

/// Where a chunk sits within its source document
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ChunkPosition {
    /// Index of this chunk in the document
    pub chunk_index: u32,
    /// Total chunks produced from the document
    pub total_chunks: u32,
    /// Character offset of the chunk start
    pub char_start: usize,
    /// Character offset of the chunk end
    pub char_end: usize,
}

/// A chunk paired with its similarity score, as returned by the chunk store
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The matched chunk
    pub chunk: KnowledgeChunk,
    /// Similarity score (0.0-1.0, higher is more similar)
    pub score: f32,
}

/// Per-request retrieval result consumed by the orchestrator and the gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Chunk text
    pub text: String,
    /// Source document identifier
    pub doc_id: String,
    /// Optional document title
    pub title: Option<String>,
    /// Optional source URL
    pub url: Option<String>,
    /// Similarity score (0.0-1.0)
    pub score: f32,
    /// Free-form metadata carried from the chunk
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl RetrievalResult {
    /// Build a retrieval result from a scored chunk
    pub fn from_scored(scored: ScoredChunk) -> Self {
        Self {
            text: scored.chunk.text,
            doc_id: scored.chunk.doc_id,
            title: scored.chunk.title,
            url: scored.chunk.url,
            score: scored.score,
            metadata: scored.chunk.metadata,
        }
    }
}

/// Aggregate statistics for one collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Number of chunks in the collection
    pub total_chunks: usize,
    /// Number of distinct source documents
    pub total_documents: usize,
    /// Average chunk length in characters
    pub avg_chunk_length: f64,
}
