//! Configuration for the chat pipeline

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// LLM provider configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl ChatConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }
}

/// LLM (Gemini) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// API key
    #[serde(default)]
    pub api_key: String,
    /// Generation model name
    pub model: String,
    /// Default temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Deadline for one full streamed generation in seconds
    pub stream_deadline_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.4,
            timeout_secs: 120,
            stream_deadline_secs: 90,
            max_retries: 2,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions (768 for text-embedding-004)
    pub dimensions: usize,
    /// Batch size for embedding calls during ingestion
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-004".to_string(),
            dimensions: 768,
            batch_size: 10,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub max_chunk_size: usize,
    /// Overlap between chunks in characters
    pub overlap: usize,
    /// Minimum chunk size (smaller chunks are dropped)
    pub min_chunk_size: usize,
    /// Respect sentence boundaries
    pub preserve_sentences: bool,
    /// Respect paragraph boundaries
    pub preserve_paragraphs: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            overlap: 100,
            min_chunk_size: 50,
            preserve_sentences: true,
            preserve_paragraphs: true,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Minimum similarity score a result must reach to be used as context
    pub min_score: f32,
    /// Floor on the candidate count fetched before collection filtering
    pub candidate_floor: usize,
    /// Deadline for one retrieval pass in seconds
    pub timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            min_score: 0.7,
            candidate_floor: 200,
            timeout_secs: 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ChatConfig::default();
        assert_eq!(config.chunking.max_chunk_size, 1000);
        assert_eq!(config.chunking.overlap, 100);
        assert_eq!(config.chunking.min_chunk_size, 50);
        assert_eq!(config.embeddings.batch_size, 10);
        assert!((config.retrieval.min_score - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn parses_partial_toml() {
        let config: ChatConfig = toml::from_str(
            r#"
            [llm]
            base_url = "http://localhost:9999"
            model = "test-model"
            temperature = 0.2
            timeout_secs = 30
            stream_deadline_secs = 20
            max_retries = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.model, "test-model");
        // Unspecified sections fall back to defaults
        assert_eq!(config.embeddings.dimensions, 768);
    }
}
